//! Response documents of the Trino client REST protocol.

use crate::executor::ColumnInfo;
use serde::Deserialize;
use serde_json::Value as JsonValue;

pub const HEADER_USER: &str = "X-Trino-User";
pub const HEADER_CATALOG: &str = "X-Trino-Catalog";
pub const HEADER_SCHEMA: &str = "X-Trino-Schema";
pub const HEADER_SOURCE: &str = "X-Trino-Source";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    pub id: String,
    #[serde(default)]
    pub next_uri: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<ColumnInfo>>,
    #[serde(default)]
    pub data: Option<Vec<Vec<JsonValue>>>,
    #[serde(default)]
    pub stats: Option<StatementStats>,
    #[serde(default)]
    pub error: Option<QueryErrorInfo>,
    #[serde(default)]
    pub update_type: Option<String>,
    #[serde(default)]
    pub update_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementStats {
    pub state: String,
    #[serde(default)]
    pub processed_rows: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryErrorInfo {
    pub message: String,
    #[serde(default)]
    pub error_code: i64,
    pub error_name: String,
    pub error_type: String,
}
