#[cfg(test)]
mod tests {
    use crate::{metrics::Metrics, tests::simulated::SimulatedTrino, tracker::OffsetTracker};
    use model::core::identifiers::QualifiedName;
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn table() -> QualifiedName {
        "iceberg.default.events_streaming".parse().unwrap()
    }

    #[tokio::test]
    async fn test_empty_table_reports_no_offset() {
        let sim = Arc::new(SimulatedTrino::new());
        sim.create_table_with_columns(&[]);
        let tracker = OffsetTracker::new(sim, Metrics::new());

        assert_eq!(tracker.try_last_offset(&table()).await.unwrap(), -1);
        assert!(tracker.try_watermarks(&table()).await.unwrap().is_uniform());
    }

    #[traced_test]
    #[tokio::test]
    async fn test_missing_table_falls_back_with_warning() {
        let sim = Arc::new(SimulatedTrino::new());
        let metrics = Metrics::new();
        let tracker = OffsetTracker::new(sim, metrics.clone());

        assert_eq!(tracker.last_offset(&table()).await, -1);
        assert!(tracker.watermarks(&table()).await.is_uniform());
        assert_eq!(metrics.snapshot().tracker_fallbacks, 2);
        assert!(logs_contain("Could not read committed offsets"));
        assert!(logs_contain("TABLE_NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_read_failure_is_reported_by_try_variant() {
        let sim = Arc::new(SimulatedTrino::new());
        sim.create_table_with_columns(&[]);
        sim.set_fail_reads(true);
        let tracker = OffsetTracker::new(sim, Metrics::new());

        let err = tracker.try_watermarks(&table()).await.unwrap_err();
        assert!(err.to_string().contains("iceberg.default.events_streaming"));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_watermarks_per_partition() {
        let sim = Arc::new(SimulatedTrino::new());
        sim.create_table_with_columns(&[]);
        for p in [0, 0, 0, 1, 2, 2] {
            sim.publish_event(p, 1, "e");
        }
        let ingestor = crate::ingestor::BatchIngestor::new(sim.clone());
        ingestor
            .ingest_batch(
                &"kafka.default.events_topic".parse().unwrap(),
                &table(),
                &model::core::offset::Watermarks::empty(),
                std::num::NonZeroUsize::new(100).unwrap(),
            )
            .await
            .unwrap();

        let tracker = OffsetTracker::new(sim, Metrics::new());
        let marks = tracker.try_watermarks(&table()).await.unwrap();
        assert_eq!(marks.after(0), 2);
        assert_eq!(marks.after(1), 0);
        assert_eq!(marks.after(2), 1);
        assert_eq!(marks.after(9), -1);
        assert_eq!(tracker.try_last_offset(&table()).await.unwrap(), 2);
    }
}
