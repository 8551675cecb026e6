use crate::error::IngestionError;
use connectors::{error::QueryError, executor::QueryExecutor};
use model::core::{
    identifiers::QualifiedName,
    offset::Watermarks,
    schema::{COL_OFFSET, COL_PARTITION_ID},
};
use planner::query::{
    ast::{
        append::{AppendBatch, DEST_ALIAS},
        common::ColumnRef,
        predicate::AfterWatermarks,
        watermark::CountAfter,
    },
    dialect::Trino,
    to_sql,
};
use std::{num::NonZeroUsize, sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowCountSource {
    /// The engine reported the affected-row count of the insert.
    UpdateCount,
    /// Rows past the starting watermarks, counted after the insert. Includes
    /// rows other writers added in the meantime.
    CountAfter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub rows_inserted: u64,
    pub counted_by: RowCountSource,
    pub elapsed: Duration,
}

/// Moves one bounded batch from the topic into the destination with a single
/// extract-and-append statement.
#[derive(Clone)]
pub struct BatchIngestor {
    executor: Arc<dyn QueryExecutor>,
}

impl BatchIngestor {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Appends at most `max_rows` messages positioned after `after`.
    ///
    /// The statement is atomic: a payload that fails to cast fails the whole
    /// batch and nothing is appended. Messages already present in the
    /// destination are skipped, so an understated watermark never duplicates.
    pub async fn ingest_batch(
        &self,
        source: &QualifiedName,
        destination: &QualifiedName,
        after: &Watermarks,
        max_rows: NonZeroUsize,
    ) -> Result<BatchOutcome, IngestionError> {
        let started = Instant::now();
        let append = AppendBatch {
            source: source.clone(),
            destination: destination.clone(),
            after,
            limit: max_rows.get(),
        };
        let sql = to_sql(&append, &Trino);
        debug!(sql = %sql, "Executing query");

        let update_count = self
            .executor
            .execute(&sql)
            .await
            .map_err(|e| self.classify(source, destination, after, e))?;

        let (rows_inserted, counted_by) = match update_count {
            Some(count) => (count, RowCountSource::UpdateCount),
            None => (
                self.count_after(destination, after).await,
                RowCountSource::CountAfter,
            ),
        };

        let elapsed = started.elapsed();
        info!(
            topic = %source,
            table = %destination,
            after = %after,
            rows = rows_inserted,
            elapsed_ms = elapsed.as_millis() as u64,
            "Inserted {rows_inserted} new records into {destination}"
        );

        Ok(BatchOutcome {
            rows_inserted,
            counted_by,
            elapsed,
        })
    }

    async fn count_after(&self, destination: &QualifiedName, after: &Watermarks) -> u64 {
        let count = CountAfter {
            table: destination.clone(),
            predicate: AfterWatermarks {
                partition: ColumnRef::qualified(DEST_ALIAS, COL_PARTITION_ID),
                offset: ColumnRef::qualified(DEST_ALIAS, COL_OFFSET),
                after,
            },
        };

        let counted = self
            .executor
            .query(&to_sql(&count, &Trino))
            .await
            .and_then(|result| result.scalar_i64());
        match counted {
            Ok(n) => n.map_or(0, |n| u64::try_from(n).unwrap_or(0)),
            Err(e) => {
                warn!(table = %destination, error = %e, "Could not count inserted rows");
                0
            }
        }
    }

    fn classify(
        &self,
        source: &QualifiedName,
        destination: &QualifiedName,
        after: &Watermarks,
        err: QueryError,
    ) -> IngestionError {
        if err.is_connection() {
            IngestionError::Connection {
                target: self.executor.target(),
                source: err,
            }
        } else {
            IngestionError::Ingest {
                topic: source.to_string(),
                table: destination.to_string(),
                after: after.to_string(),
                source: err,
            }
        }
    }
}
