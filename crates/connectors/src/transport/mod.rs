//! Publishing events onto the source topic.

pub mod live;
pub mod null;

use crate::error::TransportError;
use live::KafkaTransport;
use model::records::message::SourceMessage;
use null::NullTransport;
use serde::Serialize;

/// Where a published message landed. The null transport leaves both unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub topic: String,
    pub partition: Option<i32>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Live,
    Null,
}

/// Chosen once at startup; callers only ever call `publish`.
pub enum Transport {
    Live(KafkaTransport),
    Null(NullTransport),
}

impl Transport {
    pub fn kind(&self) -> TransportKind {
        match self {
            Transport::Live(_) => TransportKind::Live,
            Transport::Null(_) => TransportKind::Null,
        }
    }

    /// Publishes one message keyed by its id.
    ///
    /// The payload is re-read with the ingestion coercion rules first, so
    /// nothing published here can become a poison message downstream.
    pub async fn publish(
        &self,
        topic: &str,
        message: &SourceMessage,
    ) -> Result<Delivery, TransportError> {
        let payload = message.to_payload()?;
        SourceMessage::parse(&payload)?;
        let key = message.id.to_string();

        match self {
            Transport::Live(t) => t.send(topic, &key, &payload).await,
            Transport::Null(t) => Ok(t.send(topic, &key, &payload)),
        }
    }

    /// Checks the broker answers a metadata request.
    pub async fn probe(&self) -> Result<(), TransportError> {
        match self {
            Transport::Live(t) => t.probe().await,
            Transport::Null(_) => Ok(()),
        }
    }
}
