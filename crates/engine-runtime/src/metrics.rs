use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    cycles: AtomicU64,
    records_inserted: AtomicU64,
    failed_cycles: AtomicU64,
    tracker_fallbacks: AtomicU64,
}

/// Counters shared by every component of one scheduler.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub records_inserted: u64,
    pub failed_cycles: u64,
    pub tracker_fallbacks: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_cycles(&self) {
        self.inner.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_records(&self, count: u64) {
        self.inner
            .records_inserted
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_failures(&self) {
        self.inner.failed_cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fallbacks(&self) {
        self.inner.tracker_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles: self.inner.cycles.load(Ordering::Relaxed),
            records_inserted: self.inner.records_inserted.load(Ordering::Relaxed),
            failed_cycles: self.inner.failed_cycles.load(Ordering::Relaxed),
            tracker_fallbacks: self.inner.tracker_fallbacks.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
