use crate::{error::TransportError, transport::Delivery};
use rdkafka::{
    ClientConfig,
    config::RDKafkaLogLevel,
    producer::{FutureProducer, FutureRecord, Producer},
};
use std::time::Duration;
use tracing::{debug, error};

const CLIENT_ID: &str = "icestream-publisher";
const MESSAGE_TIMEOUT_MS: &str = "5000";
const QUEUE_TIMEOUT: Duration = Duration::from_secs(1);
const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
}

impl KafkaConfig {
    pub fn from_bootstrap(servers: &str) -> Self {
        Self {
            brokers: servers
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }
}

pub struct KafkaTransport {
    producer: FutureProducer,
    brokers: String,
}

impl KafkaTransport {
    pub fn new(config: &KafkaConfig) -> Result<Self, TransportError> {
        let brokers = config.bootstrap_servers();
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &brokers)
            .set("message.timeout.ms", MESSAGE_TIMEOUT_MS)
            .set("client.id", CLIENT_ID)
            .set_log_level(RDKafkaLogLevel::Warning);

        let producer: FutureProducer = client_config
            .create()
            .map_err(|e| TransportError::Kafka(format!("Failed to create producer: {e}")))?;

        Ok(Self { producer, brokers })
    }

    pub async fn send(
        &self,
        topic: &str,
        key: &str,
        payload: &str,
    ) -> Result<Delivery, TransportError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);
        match self.producer.send(record, QUEUE_TIMEOUT).await {
            Ok((partition, offset)) => {
                debug!(topic, partition, offset, "Message delivered");
                Ok(Delivery {
                    topic: topic.to_string(),
                    partition: Some(partition),
                    offset: Some(offset),
                })
            }
            Err((e, _)) => {
                error!(brokers = %self.brokers, topic, error = %e, "Sending payload to Kafka topic");
                Err(TransportError::Kafka(format!(
                    "Sending payload to {topic}: {e}"
                )))
            }
        }
    }

    /// Fetches cluster metadata; blocks inside librdkafka, hence the
    /// blocking task.
    pub async fn probe(&self) -> Result<(), TransportError> {
        let producer = self.producer.clone();
        tokio::task::spawn_blocking(move || {
            producer
                .client()
                .fetch_metadata(None, METADATA_TIMEOUT)
                .map(|_| ())
                .map_err(|e| TransportError::Kafka(format!("Failed to fetch metadata: {e}")))
        })
        .await?
    }
}
