#[cfg(test)]
mod tests {
    use crate::{
        error::IngestionError,
        ingestor::{BatchIngestor, RowCountSource},
        metrics::Metrics,
        tests::simulated::SimulatedTrino,
        tracker::OffsetTracker,
    };
    use chrono::NaiveDate;
    use model::core::{identifiers::QualifiedName, offset::Watermarks};
    use std::{num::NonZeroUsize, sync::Arc};

    fn source() -> QualifiedName {
        "kafka.default.events_topic".parse().unwrap()
    }

    fn destination() -> QualifiedName {
        "iceberg.default.events_streaming".parse().unwrap()
    }

    fn rows(k: usize) -> NonZeroUsize {
        NonZeroUsize::new(k).unwrap()
    }

    fn setup(messages: usize) -> (Arc<SimulatedTrino>, BatchIngestor, OffsetTracker) {
        let sim = Arc::new(SimulatedTrino::new());
        sim.create_table_with_columns(&[
            "id",
            "name",
            "timestamp",
            "offset",
            "partition_id",
            "ingest_time",
        ]);
        for i in 0..messages {
            sim.publish_event(0, i as i32, "event");
        }
        let ingestor = BatchIngestor::new(sim.clone());
        let tracker = OffsetTracker::new(sim.clone(), Metrics::new());
        (sim, ingestor, tracker)
    }

    async fn ingest(ingestor: &BatchIngestor, after: &Watermarks, k: usize) -> u64 {
        ingestor
            .ingest_batch(&source(), &destination(), after, rows(k))
            .await
            .unwrap()
            .rows_inserted
    }

    // Scenario: destination empty, offsets 0..4 on the topic, batch size 3.
    // Expected Outcome: offsets 0,1,2 first (watermark 2), then 3,4 (watermark 4).
    #[tokio::test]
    async fn test_scenario_a_two_batches_drain_the_topic() {
        let (sim, ingestor, tracker) = setup(5);

        let after = tracker.watermarks(&destination()).await;
        assert_eq!(ingest(&ingestor, &after, 3).await, 3);
        assert_eq!(sim.offsets(), vec![(0, 0), (0, 1), (0, 2)]);
        assert_eq!(tracker.last_offset(&destination()).await, 2);

        let after = tracker.watermarks(&destination()).await;
        assert_eq!(ingest(&ingestor, &after, 3).await, 2);
        assert_eq!(sim.offsets().len(), 5);
        assert_eq!(tracker.last_offset(&destination()).await, 4);
    }

    // Scenario: an event carries a timestamp with microseconds.
    // Expected Outcome: the destination row keeps all six fractional digits.
    #[tokio::test]
    async fn test_event_timestamp_keeps_microseconds() {
        let (sim, ingestor, _) = setup(0);
        sim.publish(
            0,
            r#"{"id": 1, "name": "signup", "timestamp": "2024-03-01T10:15:30.123456"}"#,
        );

        assert_eq!(ingest(&ingestor, &Watermarks::empty(), 10).await, 1);

        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_micro_opt(10, 15, 30, 123_456)
            .unwrap();
        assert_eq!(sim.rows()[0].timestamp, expected);
    }

    // Scenario: the same starting position is used twice with no new messages.
    // Expected Outcome: the second call inserts nothing.
    #[tokio::test]
    async fn test_repeated_batch_is_idempotent() {
        let (sim, ingestor, _) = setup(4);
        let after = Watermarks::empty();

        assert_eq!(ingest(&ingestor, &after, 10).await, 4);
        assert_eq!(ingest(&ingestor, &after, 10).await, 0);
        assert_eq!(sim.rows().len(), 4);
    }

    #[tokio::test]
    async fn test_batch_never_exceeds_max_rows() {
        for k in 1..=6 {
            let (sim, ingestor, _) = setup(5);
            let inserted = ingest(&ingestor, &Watermarks::empty(), k).await;
            assert_eq!(inserted, k.min(5) as u64);
            assert!(sim.rows().len() <= k);
        }
    }

    #[tokio::test]
    async fn test_empty_source_is_a_noop() {
        let (sim, ingestor, _) = setup(0);
        assert_eq!(ingest(&ingestor, &Watermarks::empty(), 100).await, 0);
        assert!(sim.rows().is_empty());

        let (_, ingestor, _) = setup(3);
        assert_eq!(ingest(&ingestor, &Watermarks::uniform(2), 100).await, 0);
    }

    // Scenario: only the tracked watermark is fed back between cycles, with
    // messages landing on two partitions in between.
    // Expected Outcome: after every cycle the tracked watermark equals the
    // highest offset actually present, per partition.
    #[tokio::test]
    async fn test_tracked_watermark_matches_destination() {
        let (sim, ingestor, tracker) = setup(3);
        sim.publish_event(1, 100, "other");

        for round in 0..6 {
            if round == 2 {
                sim.publish_event(1, 101, "late");
                sim.publish_event(0, 102, "late");
            }
            let after = tracker.watermarks(&destination()).await;
            ingest(&ingestor, &after, 2).await;

            let tracked = tracker.try_watermarks(&destination()).await.unwrap();
            for (partition, max) in sim.max_offsets() {
                assert_eq!(tracked.after(partition), max);
            }
        }
        assert_eq!(sim.rows().len(), 6);
    }

    // Scenario: partition 0 is far ahead of partition 1.
    // Expected Outcome: partition 1 is still read from its own watermark, not
    // from the global maximum.
    #[tokio::test]
    async fn test_lagging_partition_is_not_skipped() {
        let (sim, ingestor, tracker) = setup(6);
        let after = tracker.watermarks(&destination()).await;
        ingest(&ingestor, &after, 100).await;
        assert_eq!(tracker.last_offset(&destination()).await, 5);

        sim.publish_event(1, 50, "slow");
        sim.publish_event(1, 51, "slow");
        let after = tracker.watermarks(&destination()).await;
        assert_eq!(ingest(&ingestor, &after, 100).await, 2);
        assert!(sim.offsets().contains(&(1, 0)));
        assert!(sim.offsets().contains(&(1, 1)));
    }

    // Scenario: the tracker fell back to -1 although rows were committed.
    // Expected Outcome: nothing is appended twice.
    #[tokio::test]
    async fn test_understated_watermark_does_not_duplicate() {
        let (sim, ingestor, _) = setup(5);
        assert_eq!(ingest(&ingestor, &Watermarks::empty(), 100).await, 5);
        sim.publish_event(0, 5, "new");

        assert_eq!(ingest(&ingestor, &Watermarks::empty(), 100).await, 1);
        assert_eq!(sim.offsets(), (0..6).map(|o| (0, o)).collect::<Vec<_>>());
    }

    // Scenario: malformed `id` at offset 2 among offsets 0..4, batch size 2.
    // Expected Outcome: offsets 0,1 land; every batch containing offset 2 fails
    // without appending anything until the message is repaired.
    #[tokio::test]
    async fn test_scenario_b_poison_message_blocks_the_partition() {
        let (sim, ingestor, tracker) = setup(2);
        sim.publish(
            0,
            r#"{"id": "abc", "name": "bad", "timestamp": "2024-03-01T10:00:00"}"#,
        );
        sim.publish_event(0, 3, "event");
        sim.publish_event(0, 4, "event");

        let after = tracker.watermarks(&destination()).await;
        assert_eq!(ingest(&ingestor, &after, 2).await, 2);

        for _ in 0..3 {
            let after = tracker.watermarks(&destination()).await;
            assert_eq!(after.after(0), 1);
            let err = ingestor
                .ingest_batch(&source(), &destination(), &after, rows(2))
                .await
                .unwrap_err();
            match &err {
                IngestionError::Ingest { source, after, .. } => {
                    assert_eq!(source.error_name(), Some("INVALID_CAST_ARGUMENT"));
                    assert_eq!(after, "p0:1 rest:-1");
                }
                other => panic!("unexpected error: {other:?}"),
            }
            assert!(!err.is_fatal());
            assert_eq!(sim.offsets(), vec![(0, 0), (0, 1)]);
        }

        sim.repair(
            0,
            2,
            r#"{"id": 2, "name": "fixed", "timestamp": "2024-03-01T10:00:00"}"#,
        );
        let after = tracker.watermarks(&destination()).await;
        assert_eq!(ingest(&ingestor, &after, 2).await, 2);
        assert_eq!(tracker.last_offset(&destination()).await, 3);
    }

    #[tokio::test]
    async fn test_count_query_used_without_update_count() {
        let (sim, ingestor, _) = setup(3);
        sim.set_report_update_count(false);

        let outcome = ingestor
            .ingest_batch(&source(), &destination(), &Watermarks::empty(), rows(2))
            .await
            .unwrap();
        assert_eq!(outcome.rows_inserted, 2);
        assert_eq!(outcome.counted_by, RowCountSource::CountAfter);
        assert!(
            sim.statements()
                .iter()
                .any(|s| s.starts_with("SELECT COUNT(*)"))
        );
    }

    #[tokio::test]
    async fn test_unreachable_engine_is_a_connection_error() {
        let (sim, ingestor, _) = setup(3);
        sim.set_unreachable(true);

        let err = ingestor
            .ingest_batch(&source(), &destination(), &Watermarks::empty(), rows(2))
            .await
            .unwrap_err();
        assert!(err.is_connection());
        assert!(err.to_string().contains("simulated:8080"));
    }

    #[tokio::test]
    async fn test_ingested_rows_carry_source_position() {
        let (sim, ingestor, _) = setup(1);
        sim.publish_event(3, 77, "checkout");
        ingest(&ingestor, &Watermarks::empty(), 10).await;

        let row = sim.rows().into_iter().find(|r| r.partition_id == 3).unwrap();
        assert_eq!(row.id, 77);
        assert_eq!(row.name, "checkout");
        assert_eq!(row.source_offset, 0);
    }
}
