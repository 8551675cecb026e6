//! Defines the single extract-and-append statement used for a batch.

use model::core::{identifiers::QualifiedName, offset::Watermarks};

/// Hidden columns exposed by the Trino Kafka connector.
pub const SRC_MESSAGE: &str = "_message";
pub const SRC_PARTITION_ID: &str = "_partition_id";
pub const SRC_PARTITION_OFFSET: &str = "_partition_offset";

pub const SOURCE_ALIAS: &str = "s";
pub const BATCH_ALIAS: &str = "src";
pub const DEST_ALIAS: &str = "d";

/// `INSERT INTO destination SELECT ..` reading at most `limit` messages from
/// `source` after `after`, ordered by partition then offset, skipping any
/// `(partition, offset)` already present in the destination.
#[derive(Debug, Clone)]
pub struct AppendBatch<'a> {
    pub source: QualifiedName,
    pub destination: QualifiedName,
    pub after: &'a Watermarks,
    pub limit: usize,
}
