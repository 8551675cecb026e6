use crate::{
    config::{IngestionConfig, RunMode},
    error::IngestionError,
    ingestor::BatchIngestor,
    metrics::{Metrics, MetricsSnapshot},
    provisioner::TableProvisioner,
    tracker::OffsetTracker,
};
use connectors::executor::QueryExecutor;
use model::core::offset::Watermarks;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// `Idle -> Provisioning -> {OneShot | ContinuousLoop} -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    Idle,
    Provisioning,
    OneShot,
    ContinuousLoop,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: &'static str,
    pub interval_secs: Option<f64>,
    pub source: String,
    pub destination: String,
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
    pub stop_reason: StopReason,
    /// Watermarks read at the start of the last cycle.
    pub watermarks: Option<Watermarks>,
}

/// Time to wait before the next cycle: whatever is left of the interval,
/// but never less than `floor`.
pub fn next_sleep(interval: Duration, elapsed: Duration, floor: Duration) -> Duration {
    interval.saturating_sub(elapsed).max(floor)
}

/// Drives provisioning and the ingestion cycles for one destination.
///
/// Strictly sequential: the watermark read, the append and the sleep of one
/// cycle never overlap. Cancellation is observed only between cycles and
/// during the sleep, so an in-flight append always completes.
pub struct IngestionScheduler {
    config: IngestionConfig,
    tracker: OffsetTracker,
    provisioner: TableProvisioner,
    ingestor: BatchIngestor,
    metrics: Metrics,
    state: watch::Sender<SchedulerState>,
}

impl IngestionScheduler {
    pub fn new(config: IngestionConfig, executor: Arc<dyn QueryExecutor>) -> Self {
        let metrics = Metrics::new();
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            tracker: OffsetTracker::new(executor.clone(), metrics.clone()),
            provisioner: TableProvisioner::new(executor.clone()),
            ingestor: BatchIngestor::new(executor),
            config,
            metrics,
            state,
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Runs to completion (one-shot) or until `cancel` fires (continuous).
    ///
    /// Returns an error only when provisioning fails; failed cycles are
    /// counted in the summary.
    pub async fn run(&self, cancel: CancellationToken) -> Result<RunSummary, IngestionError> {
        let config = &self.config;
        info!(
            host = %config.target(),
            source = %config.source(),
            table = %config.destination(),
            batch_size = config.batch_size().get(),
            mode = config.mode().name(),
            "Starting Kafka to Iceberg ingestion job"
        );

        self.transition(SchedulerState::Provisioning);
        if let Err(e) = self.provisioner.ensure_table(config.destination()).await {
            error!(
                host = %config.target(),
                table = %config.destination(),
                error = %e,
                "Provisioning failed"
            );
            self.transition(SchedulerState::Stopped);
            return Err(e);
        }

        let mut last_observed = None;
        let stop_reason = match config.mode() {
            RunMode::OneShot => {
                self.transition(SchedulerState::OneShot);
                if cancel.is_cancelled() {
                    StopReason::Cancelled
                } else {
                    let (watermarks, rows) = self.cycle().await;
                    last_observed = Some(watermarks);
                    info!(rows, "Ingested {rows} new records in one-time execution mode");
                    StopReason::Completed
                }
            }
            RunMode::Continuous { interval } => {
                self.transition(SchedulerState::ContinuousLoop);
                info!(
                    interval_secs = interval.as_secs_f64(),
                    "Running in continuous mode"
                );
                self.run_loop(interval, &cancel, &mut last_observed).await
            }
        };

        self.transition(SchedulerState::Stopped);
        let summary = self.summary(stop_reason, last_observed);
        info!(
            cycles = summary.metrics.cycles,
            rows = summary.metrics.records_inserted,
            failed_cycles = summary.metrics.failed_cycles,
            stop_reason = ?summary.stop_reason,
            "Ingestion stopped"
        );
        Ok(summary)
    }

    async fn run_loop(
        &self,
        interval: Duration,
        cancel: &CancellationToken,
        last_observed: &mut Option<Watermarks>,
    ) -> StopReason {
        loop {
            if cancel.is_cancelled() {
                return StopReason::Cancelled;
            }

            let started = Instant::now();
            let (watermarks, rows) = self.cycle().await;
            *last_observed = Some(watermarks);
            if rows > 0 {
                info!(rows, "Ingested {rows} new records");
            }

            let pause = next_sleep(interval, started.elapsed(), self.config.sleep_floor());
            debug!(sleep_ms = pause.as_millis() as u64, "Waiting for next cycle");

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutdown requested, stopping after completed cycle");
                    return StopReason::Cancelled;
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }

    /// One watermark read plus one append. Failures are logged and counted,
    /// never propagated: the next cycle retries from the same position.
    async fn cycle(&self) -> (Watermarks, u64) {
        let config = &self.config;
        self.metrics.increment_cycles();

        let after = self.tracker.watermarks(config.destination()).await;
        let outcome = self
            .ingestor
            .ingest_batch(
                config.source(),
                config.destination(),
                &after,
                config.batch_size(),
            )
            .await;

        match outcome {
            Ok(outcome) => {
                self.metrics.increment_records(outcome.rows_inserted);
                (after, outcome.rows_inserted)
            }
            Err(e) => {
                self.metrics.increment_failures();
                error!(
                    host = %config.target(),
                    topic = %config.source(),
                    table = %config.destination(),
                    after = %after,
                    error = %e,
                    "Error ingesting data"
                );
                (after, 0)
            }
        }
    }

    fn transition(&self, next: SchedulerState) {
        let previous = self.state.send_replace(next);
        debug!(from = ?previous, to = ?next, "Scheduler state changed");
    }

    fn summary(&self, stop_reason: StopReason, watermarks: Option<Watermarks>) -> RunSummary {
        let mode = self.config.mode();
        RunSummary {
            mode: mode.name(),
            interval_secs: mode.interval().map(|d| d.as_secs_f64()),
            source: self.config.source().to_string(),
            destination: self.config.destination().to_string(),
            metrics: self.metrics.snapshot(),
            stop_reason,
            watermarks,
        }
    }
}
