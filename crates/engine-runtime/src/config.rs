use model::{core::identifiers::QualifiedName, error::ModelError};
use std::{num::NonZeroUsize, time::Duration};
use thiserror::Error;

pub const DEFAULT_KAFKA_CATALOG: &str = "kafka";
pub const DEFAULT_KAFKA_SCHEMA: &str = "default";
pub const DEFAULT_TOPIC: &str = "events_topic";
pub const DEFAULT_DESTINATION: &str = "iceberg.default.events_streaming";
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_INTERVAL_SECS: f64 = 5.0;
pub const DEFAULT_SLEEP_FLOOR: Duration = Duration::from_millis(100);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid table name: {0}")]
    InvalidName(#[from] ModelError),

    #[error("Batch size must be at least 1")]
    ZeroBatchSize,

    #[error("Interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),

    #[error("Sleep floor must be non-zero")]
    ZeroSleepFloor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    OneShot,
    Continuous { interval: Duration },
}

impl RunMode {
    pub fn name(&self) -> &'static str {
        match self {
            RunMode::OneShot => "one-shot",
            RunMode::Continuous { .. } => "continuous",
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        match self {
            RunMode::OneShot => None,
            RunMode::Continuous { interval } => Some(*interval),
        }
    }
}

/// Everything one ingestion run needs. Fixed once built; a different
/// configuration means a new scheduler.
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    source: QualifiedName,
    destination: QualifiedName,
    batch_size: NonZeroUsize,
    mode: RunMode,
    sleep_floor: Duration,
    target: String,
}

impl IngestionConfig {
    pub fn builder() -> IngestionConfigBuilder {
        IngestionConfigBuilder::default()
    }

    /// The topic as a Kafka connector table, `<catalog>.<schema>.<topic>`.
    pub fn source(&self) -> &QualifiedName {
        &self.source
    }

    pub fn topic(&self) -> &str {
        self.source.object()
    }

    pub fn destination(&self) -> &QualifiedName {
        &self.destination
    }

    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn sleep_floor(&self) -> Duration {
        self.sleep_floor
    }

    /// Query engine endpoint, for log context.
    pub fn target(&self) -> &str {
        &self.target
    }
}

#[derive(Debug, Clone)]
pub struct IngestionConfigBuilder {
    kafka_catalog: String,
    kafka_schema: String,
    topic: String,
    destination: String,
    batch_size: usize,
    continuous: bool,
    interval_secs: f64,
    sleep_floor: Duration,
    target: String,
}

impl Default for IngestionConfigBuilder {
    fn default() -> Self {
        Self {
            kafka_catalog: DEFAULT_KAFKA_CATALOG.into(),
            kafka_schema: DEFAULT_KAFKA_SCHEMA.into(),
            topic: DEFAULT_TOPIC.into(),
            destination: DEFAULT_DESTINATION.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            continuous: false,
            interval_secs: DEFAULT_INTERVAL_SECS,
            sleep_floor: DEFAULT_SLEEP_FLOOR,
            target: String::new(),
        }
    }
}

impl IngestionConfigBuilder {
    pub fn kafka_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.kafka_catalog = catalog.into();
        self
    }

    pub fn kafka_schema(mut self, schema: impl Into<String>) -> Self {
        self.kafka_schema = schema.into();
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn destination(mut self, table: impl Into<String>) -> Self {
        self.destination = table.into();
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }

    pub fn interval_secs(mut self, secs: f64) -> Self {
        self.interval_secs = secs;
        self
    }

    pub fn sleep_floor(mut self, floor: Duration) -> Self {
        self.sleep_floor = floor;
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn build(self) -> Result<IngestionConfig, ConfigError> {
        let source =
            QualifiedName::from_parts([&self.kafka_catalog, &self.kafka_schema, &self.topic])?;
        let destination = QualifiedName::new(&self.destination)?;
        let batch_size = NonZeroUsize::new(self.batch_size).ok_or(ConfigError::ZeroBatchSize)?;

        let mode = if self.continuous {
            let interval = Duration::try_from_secs_f64(self.interval_secs)
                .ok()
                .filter(|d| !d.is_zero())
                .ok_or(ConfigError::InvalidInterval(self.interval_secs))?;
            RunMode::Continuous { interval }
        } else {
            RunMode::OneShot
        };

        if self.sleep_floor.is_zero() {
            return Err(ConfigError::ZeroSleepFloor);
        }

        Ok(IngestionConfig {
            source,
            destination,
            batch_size,
            mode,
            sleep_floor: self.sleep_floor,
            target: self.target,
        })
    }
}
