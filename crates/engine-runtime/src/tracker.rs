use crate::{error::IngestionError, metrics::Metrics};
use connectors::{
    error::QueryError,
    executor::{QueryExecutor, as_i64},
};
use model::core::{
    identifiers::QualifiedName,
    offset::{NO_OFFSET, Watermark, Watermarks},
};
use planner::query::{
    ast::watermark::{MaxOffset, PartitionWatermarks},
    dialect::Trino,
    to_sql,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Reads the committed ingestion position back from the destination table.
///
/// Nothing is cached between calls: the destination is the only record of
/// progress, so a restart resumes exactly where the table says it stopped.
#[derive(Clone)]
pub struct OffsetTracker {
    executor: Arc<dyn QueryExecutor>,
    metrics: Metrics,
}

impl OffsetTracker {
    pub fn new(executor: Arc<dyn QueryExecutor>, metrics: Metrics) -> Self {
        Self { executor, metrics }
    }

    /// Highest committed offset over all partitions, `-1` when the table is
    /// empty or cannot be read.
    pub async fn last_offset(&self, table: &QualifiedName) -> i64 {
        match self.try_last_offset(table).await {
            Ok(offset) => {
                info!(table = %table, offset, "Last processed offset");
                offset
            }
            Err(e) => {
                self.fallback(&e);
                NO_OFFSET
            }
        }
    }

    pub async fn try_last_offset(&self, table: &QualifiedName) -> Result<i64, IngestionError> {
        let sql = to_sql(
            &MaxOffset {
                table: table.clone(),
            },
            &Trino,
        );
        let result = self
            .executor
            .query(&sql)
            .await
            .map_err(|e| offset_read(table, e))?;
        let offset = result.scalar_i64().map_err(|e| offset_read(table, e))?;
        Ok(offset.unwrap_or(NO_OFFSET))
    }

    /// Per-partition watermarks; empty when the table is empty or cannot be
    /// read, so every partition restarts from its beginning.
    pub async fn watermarks(&self, table: &QualifiedName) -> Watermarks {
        match self.try_watermarks(table).await {
            Ok(marks) => {
                info!(table = %table, watermarks = %marks, "Committed watermarks");
                marks
            }
            Err(e) => {
                self.fallback(&e);
                Watermarks::empty()
            }
        }
    }

    pub async fn try_watermarks(&self, table: &QualifiedName) -> Result<Watermarks, IngestionError> {
        let sql = to_sql(
            &PartitionWatermarks {
                table: table.clone(),
            },
            &Trino,
        );
        let result = self
            .executor
            .query(&sql)
            .await
            .map_err(|e| offset_read(table, e))?;

        let marks = result
            .rows
            .iter()
            .map(|row| match row.as_slice() {
                [partition_id, offset, ..] => Ok(Watermark {
                    partition_id: as_i64(partition_id)?,
                    offset: as_i64(offset)?,
                }),
                _ => Err(QueryError::Protocol(format!(
                    "expected (partition_id, offset), got {row:?}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| offset_read(table, e))?;

        Ok(Watermarks::from_watermarks(marks))
    }

    fn fallback(&self, err: &IngestionError) {
        self.metrics.increment_fallbacks();
        warn!(error = %err, "Could not read committed offsets, starting from {NO_OFFSET}");
    }
}

fn offset_read(table: &QualifiedName, source: QueryError) -> IngestionError {
    IngestionError::OffsetRead {
        table: table.to_string(),
        source,
    }
}
