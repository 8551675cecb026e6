use crate::{
    error::QueryError,
    executor::{ColumnInfo, QueryExecutor, QueryResult},
    retry::RetryPolicy,
    trino::{
        config::TrinoConfig,
        protocol::{HEADER_CATALOG, HEADER_SCHEMA, HEADER_SOURCE, HEADER_USER, QueryResults},
    },
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

/// HTTP client for the Trino statement protocol.
///
/// A statement is submitted with one POST and then followed page by page
/// through `nextUri` until the coordinator stops returning one. No overall
/// request timeout is applied: appends over large batches can run for a
/// long time.
#[derive(Debug, Clone)]
pub struct TrinoClient {
    http: Client,
    config: TrinoConfig,
    retry: RetryPolicy,
}

impl TrinoClient {
    pub fn new(config: TrinoConfig) -> Result<Self, QueryError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            config,
            retry: RetryPolicy::for_coordinator(),
        })
    }

    pub fn config(&self) -> &TrinoConfig {
        &self.config
    }

    async fn submit(&self, sql: &str) -> Result<QueryResults, QueryError> {
        let url = self.config.statement_url();
        self.retry
            .run(
                || {
                    let request = self
                        .http
                        .post(&url)
                        .header(HEADER_USER, &self.config.user)
                        .header(HEADER_CATALOG, &self.config.catalog)
                        .header(HEADER_SCHEMA, &self.config.schema)
                        .header(HEADER_SOURCE, &self.config.source)
                        .body(sql.to_string());
                    self.send(request)
                },
                QueryError::retry_disposition,
            )
            .await
            .map_err(|e| e.into_inner())
    }

    async fn advance(&self, next_uri: &str) -> Result<QueryResults, QueryError> {
        self.retry
            .run(
                || {
                    let request = self
                        .http
                        .get(next_uri)
                        .header(HEADER_USER, &self.config.user);
                    self.send(request)
                },
                QueryError::retry_disposition,
            )
            .await
            .map_err(|e| e.into_inner())
    }

    async fn send(&self, request: RequestBuilder) -> Result<QueryResults, QueryError> {
        let response = request.send().await.map_err(|e| self.classify_send(e))?;
        let status = response.status();

        if is_unavailable(status) {
            warn!(host = %self.config.target(), %status, "Coordinator unavailable");
            return Err(QueryError::Unavailable(status));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Status { status, body });
        }

        response
            .json::<QueryResults>()
            .await
            .map_err(|e| QueryError::Protocol(format!("Invalid statement response: {e}")))
    }

    fn classify_send(&self, err: reqwest::Error) -> QueryError {
        if err.is_connect() {
            QueryError::Connection {
                target: self.config.target(),
                source: err,
            }
        } else {
            QueryError::Http(err)
        }
    }
}

#[async_trait]
impl QueryExecutor for TrinoClient {
    async fn query(&self, sql: &str) -> Result<QueryResult, QueryError> {
        let statement = normalize_statement(sql);
        debug!(sql = %statement, "Submitting statement");

        let mut collector = ResultCollector::default();
        let mut next = collector.absorb(self.submit(statement).await?)?;
        while let Some(uri) = next {
            next = collector.absorb(self.advance(&uri).await?)?;
        }

        let result = collector.finish();
        debug!(
            rows = result.rows.len(),
            update_count = ?result.update_count,
            "Statement finished"
        );
        Ok(result)
    }

    fn target(&self) -> String {
        self.config.target()
    }
}

fn is_unavailable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

/// The statement endpoint rejects a trailing `;`.
fn normalize_statement(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

/// Folds the pages of one statement into a single result.
#[derive(Debug, Default)]
struct ResultCollector {
    columns: Option<Vec<ColumnInfo>>,
    rows: Vec<Vec<JsonValue>>,
    update_count: Option<u64>,
}

impl ResultCollector {
    /// Takes one page; returns the URI to follow, if any.
    fn absorb(&mut self, page: QueryResults) -> Result<Option<String>, QueryError> {
        if let Some(stats) = &page.stats {
            debug!(
                query_id = %page.id,
                state = %stats.state,
                processed_rows = stats.processed_rows,
                "Statement progress"
            );
        }
        if let Some(err) = page.error {
            return Err(QueryError::query(err.error_name, err.error_type, err.message));
        }
        if self.columns.is_none() {
            self.columns = page.columns;
        }
        if let Some(data) = page.data {
            self.rows.extend(data);
        }
        if page.update_count.is_some() {
            self.update_count = page.update_count;
        }
        Ok(page.next_uri)
    }

    fn finish(self) -> QueryResult {
        QueryResult {
            columns: self.columns.unwrap_or_default(),
            rows: self.rows,
            update_count: self.update_count,
        }
    }
}
