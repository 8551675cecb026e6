use crate::retry::RetryDisposition;
use reqwest::StatusCode;
use thiserror::Error;

pub const TABLE_NOT_FOUND: &str = "TABLE_NOT_FOUND";
pub const TABLE_ALREADY_EXISTS: &str = "TABLE_ALREADY_EXISTS";
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";

/// All errors coming from the query engine.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The engine could not be reached at all.
    #[error("Connection to {target} failed: {source}")]
    Connection {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    /// Any other HTTP-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The coordinator is temporarily not accepting requests (502/503/504).
    #[error("Engine unavailable: HTTP {0}")]
    Unavailable(StatusCode),

    /// Unexpected HTTP status.
    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The engine accepted the statement and reported a failure.
    #[error("Query failed [{name}/{error_type}]: {message}")]
    Query {
        name: String,
        error_type: String,
        message: String,
    },

    /// The response did not follow the client protocol.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl QueryError {
    pub fn query(name: impl Into<String>, error_type: impl Into<String>, message: impl Into<String>) -> Self {
        QueryError::Query {
            name: name.into(),
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// True when the engine itself could not be reached.
    pub fn is_connection(&self) -> bool {
        match self {
            QueryError::Connection { .. } | QueryError::Unavailable(_) => true,
            QueryError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    pub fn error_name(&self) -> Option<&str> {
        match self {
            QueryError::Query { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_already_exists(&self) -> bool {
        self.error_name() == Some(TABLE_ALREADY_EXISTS)
    }

    pub fn is_permission_denied(&self) -> bool {
        self.error_name() == Some(PERMISSION_DENIED)
    }

    /// Only a coordinator that refused the request is retried in place; every
    /// other failure is left to the caller's cycle-level handling.
    pub fn retry_disposition(&self) -> RetryDisposition {
        match self {
            QueryError::Unavailable(_) => RetryDisposition::Retry,
            _ => RetryDisposition::Stop,
        }
    }
}

/// Errors raised while publishing to the message broker.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Kafka error: {0}")]
    Kafka(String),

    #[error("Message rejected: {0}")]
    Invalid(#[from] model::error::ModelError),

    #[error("Failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Transport task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
