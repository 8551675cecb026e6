use crate::{
    env::{
        EnvManager, KAFKA_BOOTSTRAP_SERVERS, KAFKA_TOPIC, TRINO_CATALOG, TRINO_HOST, TRINO_PORT,
        TRINO_SCHEMA, TRINO_USER,
    },
    error::CliError,
};
use clap::{Args, Subcommand};
use connectors::trino::config::TrinoConfig;
use engine_runtime::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_DESTINATION, DEFAULT_KAFKA_CATALOG, DEFAULT_KAFKA_SCHEMA,
    DEFAULT_TOPIC,
};

pub const DEFAULT_BROKERS: &str = "localhost:9092";

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest new messages from a Kafka topic into an Iceberg table
    Ingest {
        #[command(flatten)]
        trino: TrinoArgs,

        #[arg(long, default_value = DEFAULT_KAFKA_CATALOG, help = "Trino catalog of the Kafka connector")]
        kafka_catalog: String,

        #[arg(long, default_value = DEFAULT_KAFKA_SCHEMA, help = "Trino schema holding the topic tables")]
        kafka_schema: String,

        #[arg(long, help = "Source topic [env: KAFKA_TOPIC, default: events_topic]")]
        kafka_topic: Option<String>,

        #[arg(long, default_value = DEFAULT_DESTINATION, help = "Destination table")]
        target_table: String,

        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, help = "Maximum rows per cycle")]
        batch_size: usize,

        #[arg(long, help = "Keep ingesting on a fixed interval until interrupted")]
        continuous: bool,

        #[arg(long, default_value_t = 5.0, help = "Seconds between cycle starts in continuous mode")]
        interval: f64,

        #[arg(
            long,
            help = "If specified, writes the JSON run summary to this file instead of stdout"
        )]
        report: Option<String>,
    },
    /// Publish one event onto the source topic
    Publish {
        #[arg(long)]
        name: String,

        #[arg(long)]
        id: i32,

        #[arg(long, help = "ISO-8601 event time; defaults to now")]
        timestamp: Option<String>,

        #[arg(long, help = "Topic [env: KAFKA_TOPIC, default: events_topic]")]
        topic: Option<String>,

        #[arg(long, help = "Bootstrap servers [env: KAFKA_BOOTSTRAP_SERVERS]")]
        brokers: Option<String>,

        #[arg(long, help = "Log the message instead of sending it to a broker")]
        null_transport: bool,
    },
    /// Show the committed watermark of each partition
    Watermark {
        #[command(flatten)]
        trino: TrinoArgs,

        #[arg(long, default_value = DEFAULT_DESTINATION)]
        target_table: String,

        #[arg(long, help = "If set, prints the watermarks as JSON instead of a table")]
        json: bool,
    },
    /// Test connectivity to Trino or Kafka
    TestConn {
        /// "trino" or "kafka"
        #[arg(long)]
        target: String,

        #[command(flatten)]
        trino: TrinoArgs,

        #[arg(long, help = "Bootstrap servers [env: KAFKA_BOOTSTRAP_SERVERS]")]
        brokers: Option<String>,
    },
}

/// Trino connection flags; unset ones fall back to the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct TrinoArgs {
    #[arg(long, help = "Trino host [env: TRINO_HOST, default: localhost]")]
    pub host: Option<String>,

    #[arg(long, help = "Trino port [env: TRINO_PORT, default: 8080]")]
    pub port: Option<u16>,

    #[arg(long, help = "Trino user [env: TRINO_USER, default: trino]")]
    pub user: Option<String>,

    #[arg(long, help = "Session catalog [env: TRINO_CATALOG, default: iceberg]")]
    pub catalog: Option<String>,

    #[arg(long, help = "Session schema [env: TRINO_SCHEMA, default: default]")]
    pub schema: Option<String>,
}

impl TrinoArgs {
    pub fn resolve(&self, env: &EnvManager) -> Result<TrinoConfig, CliError> {
        let defaults = TrinoConfig::default();

        let port = match (self.port, env.get(TRINO_PORT)) {
            (Some(port), _) => port,
            (None, Some(raw)) => raw
                .parse()
                .map_err(|_| CliError::Config(format!("{TRINO_PORT} is not a port: '{raw}'")))?,
            (None, None) => defaults.port,
        };

        Ok(TrinoConfig {
            host: env.resolve(self.host.as_deref(), TRINO_HOST, &defaults.host),
            port,
            user: env.resolve(self.user.as_deref(), TRINO_USER, &defaults.user),
            catalog: env.resolve(self.catalog.as_deref(), TRINO_CATALOG, &defaults.catalog),
            schema: env.resolve(self.schema.as_deref(), TRINO_SCHEMA, &defaults.schema),
            ..defaults
        })
    }
}

pub fn resolve_topic(flag: Option<&str>, env: &EnvManager) -> String {
    env.resolve(flag, KAFKA_TOPIC, DEFAULT_TOPIC)
}

pub fn resolve_brokers(flag: Option<&str>, env: &EnvManager) -> String {
    env.resolve(flag, KAFKA_BOOTSTRAP_SERVERS, DEFAULT_BROKERS)
}
