use crate::error::IngestionError;
use connectors::{error::QueryError, executor::QueryExecutor};
use model::core::{
    identifiers::QualifiedName,
    schema::{DESTINATION_COLUMNS, destination_column_names},
};
use planner::query::{
    ast::{create_table::CreateTable, show_columns::ShowColumns},
    dialect::Trino,
    to_sql,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, info};

/// Creates the destination table when it is missing and checks its layout.
#[derive(Clone)]
pub struct TableProvisioner {
    executor: Arc<dyn QueryExecutor>,
}

impl TableProvisioner {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Idempotent; an existing table with the expected columns is left as is.
    pub async fn ensure_table(&self, table: &QualifiedName) -> Result<(), IngestionError> {
        let create = CreateTable {
            table: table.clone(),
            columns: DESTINATION_COLUMNS.to_vec(),
            if_not_exists: true,
        };

        match self.executor.execute(&to_sql(&create, &Trino)).await {
            Ok(_) => {}
            Err(e) if e.is_already_exists() => {
                debug!(table = %table, "Table already exists");
            }
            Err(e) => return Err(self.classify(table, e)),
        }

        self.verify_columns(table).await?;
        info!(table = %table, "Ensured target table exists");
        Ok(())
    }

    /// The append statement writes by position, so names and order must match.
    async fn verify_columns(&self, table: &QualifiedName) -> Result<(), IngestionError> {
        let show = ShowColumns {
            table: table.clone(),
        };
        let result = self
            .executor
            .query(&to_sql(&show, &Trino))
            .await
            .map_err(|e| self.classify(table, e))?;

        let found: Vec<String> = result
            .rows
            .iter()
            .filter_map(|row| row.first())
            .map(|v| match v {
                JsonValue::String(s) => s.to_lowercase(),
                other => other.to_string(),
            })
            .collect();
        let expected: Vec<String> = destination_column_names()
            .into_iter()
            .map(String::from)
            .collect();

        if found != expected {
            return Err(IngestionError::SchemaMismatch {
                table: table.to_string(),
                expected,
                found,
            });
        }
        Ok(())
    }

    fn classify(&self, table: &QualifiedName, source: QueryError) -> IngestionError {
        if source.is_connection() {
            IngestionError::Connection {
                target: self.executor.target(),
                source,
            }
        } else {
            IngestionError::Provision {
                table: table.to_string(),
                source,
            }
        }
    }
}
