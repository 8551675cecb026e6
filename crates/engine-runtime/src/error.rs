use connectors::error::QueryError;
use thiserror::Error;

/// Errors raised by the ingestion components.
///
/// Only `Provision` and `SchemaMismatch` stop a run; everything else is
/// absorbed at the cycle boundary and retried on the next cycle.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The query engine could not be reached.
    #[error("Cannot reach query engine at {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: QueryError,
    },

    /// The destination table could not be created.
    #[error("Failed to provision table {table}: {source}")]
    Provision {
        table: String,
        #[source]
        source: QueryError,
    },

    /// The destination exists with a different column layout.
    #[error("Table {table} has columns {found:?}, expected {expected:?}")]
    SchemaMismatch {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// The committed position could not be read from the destination.
    #[error("Failed to read watermarks of {table}: {source}")]
    OffsetRead {
        table: String,
        #[source]
        source: QueryError,
    },

    /// The extract-and-append statement failed.
    #[error("Failed to ingest {topic} into {table} after offset {after}: {source}")]
    Ingest {
        topic: String,
        table: String,
        after: String,
        #[source]
        source: QueryError,
    },
}

impl IngestionError {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IngestionError::Provision { .. } | IngestionError::SchemaMismatch { .. }
        )
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, IngestionError::Connection { .. })
    }

    pub fn query_error(&self) -> Option<&QueryError> {
        match self {
            IngestionError::Connection { source, .. }
            | IngestionError::Provision { source, .. }
            | IngestionError::OffsetRead { source, .. }
            | IngestionError::Ingest { source, .. } => Some(source),
            IngestionError::SchemaMismatch { .. } => None,
        }
    }
}
