use crate::error::CliError;
use async_trait::async_trait;
use connectors::{executor::QueryExecutor, transport::Transport};
use std::str::FromStr;
use tracing::{error, info};

/// What kind of connection to check
#[derive(Debug, PartialEq, Eq)]
pub enum ConnectionKind {
    Trino,
    Kafka,
}

impl FromStr for ConnectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trino" => Ok(ConnectionKind::Trino),
            "kafka" => Ok(ConnectionKind::Kafka),
            other => Err(format!("Unknown connection kind: {other}")),
        }
    }
}

/// Trait for "pinging" a data source
#[async_trait]
pub trait ConnectionPinger {
    /// Attempts to ping; returns Err if unreachable
    async fn ping(&self) -> Result<(), CliError>;
}

pub struct TrinoConnectionPinger<'a> {
    pub executor: &'a dyn QueryExecutor,
}

pub struct KafkaConnectionPinger<'a> {
    pub transport: &'a Transport,
    pub brokers: String,
}

#[async_trait]
impl ConnectionPinger for TrinoConnectionPinger<'_> {
    async fn ping(&self) -> Result<(), CliError> {
        let target = self.executor.target();
        info!("Pinging Trino at '{}'", target);

        self.executor.ping().await.map_err(|e| {
            error!("Trino ping to '{}' failed: {}", target, e);
            CliError::Query(e)
        })?;

        info!("Trino ping to '{}' succeeded", target);
        Ok(())
    }
}

#[async_trait]
impl ConnectionPinger for KafkaConnectionPinger<'_> {
    async fn ping(&self) -> Result<(), CliError> {
        info!("Pinging Kafka at '{}'", self.brokers);

        self.transport.probe().await.map_err(|e| {
            error!("Kafka metadata request to '{}' failed: {}", self.brokers, e);
            CliError::Transport(e)
        })?;

        info!("Kafka ping to '{}' succeeded", self.brokers);
        Ok(())
    }
}
