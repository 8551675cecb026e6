/// Connection settings for a Trino coordinator.
///
/// Built once at startup; a different target means a new client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrinoConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub catalog: String,
    pub schema: String,
    /// Reported to the coordinator as `X-Trino-Source`.
    pub source: String,
}

impl Default for TrinoConfig {
    fn default() -> Self {
        Self {
            scheme: "http".into(),
            host: "localhost".into(),
            port: 8080,
            user: "trino".into(),
            catalog: "iceberg".into(),
            schema: "default".into(),
            source: "icestream".into(),
        }
    }
}

impl TrinoConfig {
    pub fn statement_url(&self) -> String {
        format!("{}://{}:{}/v1/statement", self.scheme, self.host, self.port)
    }

    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
