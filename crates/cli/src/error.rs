use connectors::error::{QueryError, TransportError};
use engine_runtime::{config::ConfigError, error::IngestionError};
use model::error::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid ingestion settings: {0}")]
    InvalidSettings(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Query engine error: {0}")]
    Query(#[from] QueryError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Ingestion error: {0}")]
    Ingestion(#[from] IngestionError),

    #[error("Invalid value: {0}")]
    InvalidValue(#[from] ModelError),

    #[error("Invalid timestamp '{0}', expected ISO-8601")]
    InvalidTimestamp(String),

    #[error("Invalid connection kind provided: {0}")]
    InvalidConnectionKind(String),
}
