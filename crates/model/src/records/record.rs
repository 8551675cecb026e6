use crate::records::message::SourceMessage;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of the destination table.
///
/// `(partition_id, source_offset)` identifies the source message and is the
/// de-duplication key: it appears at most once in the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i32,
    pub name: String,
    pub timestamp: NaiveDateTime,
    pub source_offset: i64,
    pub partition_id: i64,
    pub ingest_time: NaiveDateTime,
}

impl Record {
    pub fn from_message(
        message: SourceMessage,
        partition_id: i64,
        source_offset: i64,
        ingest_time: NaiveDateTime,
    ) -> Self {
        Self {
            id: message.id,
            name: message.name,
            timestamp: message.timestamp,
            source_offset,
            partition_id,
            ingest_time,
        }
    }

    pub fn key(&self) -> (i64, i64) {
        (self.partition_id, self.source_offset)
    }
}
