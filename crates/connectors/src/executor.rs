use crate::error::QueryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const PING_SQL: &str = "SELECT 1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Everything a statement returned, with rows in engine JSON encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<JsonValue>>,
    /// Rows affected, when the engine reports one for the statement.
    pub update_count: Option<u64>,
}

impl QueryResult {
    pub fn with_rows(rows: Vec<Vec<JsonValue>>) -> Self {
        Self {
            columns: Vec::new(),
            rows,
            update_count: None,
        }
    }

    pub fn with_update_count(count: u64) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            update_count: Some(count),
        }
    }

    pub fn first_value(&self) -> Option<&JsonValue> {
        self.rows.first().and_then(|row| row.first())
    }

    /// The first column of the first row as an integer.
    pub fn scalar_i64(&self) -> Result<Option<i64>, QueryError> {
        match self.first_value() {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => as_i64(value).map(Some),
        }
    }
}

/// Reads an integer cell; BIGINT values may arrive as numbers or strings.
pub fn as_i64(value: &JsonValue) -> Result<i64, QueryError> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| QueryError::Protocol(format!("expected an integer, got {n}"))),
        JsonValue::String(s) => s
            .parse()
            .map_err(|_| QueryError::Protocol(format!("expected an integer, got '{s}'"))),
        other => Err(QueryError::Protocol(format!(
            "expected an integer, got {other}"
        ))),
    }
}

/// Executes statements against the table store / streaming source.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Runs a statement and returns its rows.
    async fn query(&self, sql: &str) -> Result<QueryResult, QueryError>;

    /// Runs a statement and returns the affected-row count when one is reported.
    async fn execute(&self, sql: &str) -> Result<Option<u64>, QueryError> {
        Ok(self.query(sql).await?.update_count)
    }

    /// Endpoint description used in log and error context.
    fn target(&self) -> String;

    /// Round-trips a trivial statement to prove the engine answers.
    async fn ping(&self) -> Result<(), QueryError> {
        match self.query(PING_SQL).await?.scalar_i64()? {
            Some(1) => Ok(()),
            other => Err(QueryError::Protocol(format!(
                "{PING_SQL} returned {other:?}"
            ))),
        }
    }
}
