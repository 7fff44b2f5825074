//! Integration tests for the statistics engine
//!
//! Exercises the public API end to end: repository backends feeding
//! `StatsEngine`, plus the cross-aggregator consistency properties.

#[cfg(test)]
mod stats_engine_tests {
    use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
    use collision_stats::stats_core::{
        aggregate_objects, aggregate_overview, filter_by_range, generate_trend, CollisionEvent,
        StatsEngine, TimeRange,
    };
    use collision_stats::store::{
        EventRepository, JsonlEventStore, MemoryEventStore, SqliteEventStore, StoreError,
    };
    use tempfile::tempdir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    /// A mixed fixture: every severity, unknown values, empty objects, one malformed record
    fn fixture() -> Vec<CollisionEvent> {
        let lines = [
            r#"{"id":"1","timestamp":"2024-03-10T09:15:00Z","severity":"critical","objects":[{"id":"a","type":"vehicle","confidence":0.93},{"id":"b","type":"pedestrian","confidence":0.81}],"distances":[{"objectId1":"a","objectId2":"b","distance":1.4,"status":"critical"}]}"#,
            r#"{"id":"2","timestamp":"2024-03-09T14:40:00Z","severity":"high","objects":[{"id":"a","type":"vehicle","confidence":0.55}]}"#,
            r#"{"id":"3","timestamp":"2024-03-08T19:05:00Z","severity":"medium","objects":[]}"#,
            r#"{"id":"4","timestamp":"2024-03-06T23:30:00Z","severity":"low","objects":[{"id":"a","type":"animal","confidence":0.61},{"id":"b"}]}"#,
            r#"{"id":"5","timestamp":"2024-02-20T07:00:00Z","severity":"critical"}"#,
            r#"{"id":"6","timestamp":"2023-12-01T03:00:00Z","severity":"unheard-of","objects":[{"id":"a","type":"vehicle","confidence":1.4}]}"#,
            r#"{"id":"7","severity":"critical","objects":[{"id":"a","type":"vehicle","confidence":0.9}]}"#,
        ];

        lines
            .iter()
            .map(|line| CollisionEvent::from_json(line).unwrap())
            .collect()
    }

    fn ids(events: &[CollisionEvent]) -> Vec<String> {
        events.iter().filter_map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_filter_returns_sorted_subsequence() {
        let events = fixture();

        for range in [
            TimeRange::Day,
            TimeRange::Week,
            TimeRange::Month,
            TimeRange::Year,
            TimeRange::All,
        ] {
            let kept = filter_by_range(&events, range, &now());

            assert!(kept.iter().all(|e| events.contains(e)), "range {}", range);

            let instants: Vec<_> = kept.iter().map(|e| e.instant_in(&Utc).unwrap()).collect();
            assert!(instants.windows(2).all(|w| w[0] >= w[1]), "range {}", range);
        }
    }

    #[test]
    fn test_range_membership() {
        let events = fixture();

        assert_eq!(ids(&filter_by_range(&events, TimeRange::Day, &now())), vec!["1"]);
        assert_eq!(
            ids(&filter_by_range(&events, TimeRange::Week, &now())),
            vec!["1", "2", "3", "4"]
        );
        assert_eq!(
            ids(&filter_by_range(&events, TimeRange::Month, &now())),
            vec!["1", "2", "3", "4", "5"]
        );
        assert_eq!(
            ids(&filter_by_range(&events, TimeRange::Year, &now())),
            vec!["1", "2", "3", "4", "5", "6"]
        );
    }

    #[test]
    fn test_week_window_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let events: Vec<CollisionEvent> = [
            r#"{"id":"keep","timestamp":"2024-03-04T00:00:01"}"#,
            r#"{"id":"drop","timestamp":"2024-03-02T23:59:00"}"#,
        ]
        .iter()
        .map(|l| CollisionEvent::from_json(l).unwrap())
        .collect();

        assert_eq!(ids(&filter_by_range(&events, TimeRange::Week, &now)), vec!["keep"]);
    }

    #[test]
    fn test_overview_consistency() {
        let events = fixture();
        let overview = aggregate_overview(&events, &Utc);

        // Record 7 has no timestamp
        assert_eq!(overview.total, 6);
        assert_eq!(overview.by_time_of_day.total(), 6);
        assert_eq!(overview.by_severity.total(), 5);
        assert_eq!(overview.by_severity.critical, 2);
        assert_eq!(overview.by_time_of_day.morning, 2);
        assert_eq!(overview.by_time_of_day.afternoon, 1);
        assert_eq!(overview.by_time_of_day.evening, 1);
        assert_eq!(overview.by_time_of_day.night, 2);
    }

    #[test]
    fn test_object_consistency() {
        let stats = aggregate_objects(&fixture());

        assert_eq!(stats.total_objects, 7);
        assert_eq!(stats.by_type.values().sum::<usize>(), stats.total_objects);
        assert_eq!(stats.by_confidence.total(), stats.total_objects);
        assert_eq!(stats.by_type.get("vehicle"), Some(&4));
        assert_eq!(stats.by_type.get("unknown"), Some(&1));
        // 0.93, 1.4, 0.9 high; 0.81, 0.61 medium; 0.55 and missing low
        assert_eq!(stats.by_confidence.high, 3);
        assert_eq!(stats.by_confidence.medium, 2);
        assert_eq!(stats.by_confidence.low, 2);
    }

    #[test]
    fn test_trend_shape_in_offset_zone() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let today = tz.with_ymd_and_hms(2024, 3, 10, 0, 30, 0).unwrap();
        let series = generate_trend(&fixture(), 10, &today);

        assert_eq!(series.len(), 10);
        assert_eq!(series[9].date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(series[0].date, series[9].date - Duration::days(9));
        // 23:30Z on the 6th is the 7th at +03:00
        let seventh = series
            .iter()
            .find(|p| p.date == NaiveDate::from_ymd_opt(2024, 3, 7).unwrap())
            .unwrap();
        assert_eq!(seventh.count, 1);
    }

    #[test]
    fn test_aggregators_are_idempotent() {
        let events = fixture();
        let snapshot = events.clone();

        assert_eq!(aggregate_overview(&events, &Utc), aggregate_overview(&events, &Utc));
        assert_eq!(aggregate_objects(&events), aggregate_objects(&events));
        assert_eq!(
            generate_trend(&events, 10, &now()),
            generate_trend(&events, 10, &now())
        );
        assert_eq!(events, snapshot);
    }

    #[tokio::test]
    async fn test_report_from_memory_store() {
        let engine = StatsEngine::new(MemoryEventStore::with_events(fixture()));
        let report = engine.report(TimeRange::Week, &now()).await.unwrap();

        assert_eq!(report.range, TimeRange::Week);
        assert_eq!(report.statistics.total, 4);
        assert_eq!(report.statistics.by_severity.critical, 1);
        assert_eq!(report.statistics.by_severity.high, 1);
        assert_eq!(report.statistics.recent_trend.len(), 10);
        assert_eq!(
            report.statistics.recent_trend.iter().map(|p| p.count).sum::<usize>(),
            4
        );
        assert_eq!(report.objects.total_objects, 5);
        assert_eq!(report.statistics.object_types, report.objects.by_type);
        assert_eq!(report.accidents.total_accidents, 2);
        assert_eq!(report.accidents.by_time_of_day.morning, 1);
        assert_eq!(report.accidents.by_time_of_day.afternoon, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["range"], "week");
        assert!(json["statistics"]["recentTrend"][0]["date"].is_string());
        assert!(json["accidents"].get("totalAccidents").is_some());
        assert!(json["objects"]["byConfidence"].get("high").is_some());
    }

    #[tokio::test]
    async fn test_empty_store_reports_zeroes() {
        let engine = StatsEngine::new(MemoryEventStore::new());

        let stats = engine.event_statistics(TimeRange::Month, &now()).await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.by_severity.total(), 0);
        assert_eq!(stats.by_time_of_day.total(), 0);
        assert!(stats.recent_trend.iter().all(|p| p.count == 0));

        let objects = engine.object_detection_stats(TimeRange::Month, &now()).await.unwrap();
        assert_eq!(objects.total_objects, 0);
        assert_eq!(objects.format_percentage(0), "0.0");

        let accidents = engine.accident_stats(TimeRange::Month, &now()).await.unwrap();
        assert_eq!(accidents.total_accidents, 0);
    }

    #[tokio::test]
    async fn test_sqlite_backed_engine() {
        let dir = tempdir().unwrap();
        let store = SqliteEventStore::new(dir.path().join("events.db")).unwrap();
        let engine = StatsEngine::new(store);

        for event in fixture() {
            engine.add_event(event).await.unwrap();
        }

        // Record 7 received a generated timestamp on append
        let stored = engine.event_by_id("7").await.unwrap();
        assert!(stored.instant_in(&Utc).is_some());

        let objects = engine
            .object_detection_stats(TimeRange::Year, &now())
            .await
            .unwrap();
        assert_eq!(objects.by_type.get("animal"), Some(&1));

        assert!(matches!(
            engine.event_by_id("missing").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_jsonl_backed_engine_through_trait_object() {
        let dir = tempdir().unwrap();
        let store: Box<dyn EventRepository> =
            Box::new(JsonlEventStore::new(dir.path().join("events.jsonl")).unwrap());
        let engine = StatsEngine::new(store);

        let created = engine.add_event(CollisionEvent::default()).await.unwrap();
        assert!(created.id.is_some());

        let latest = engine.latest_events(TimeRange::Day, &Utc::now()).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].id, created.id);
        assert_eq!(engine.repository().backend_type(), "JSONL");
    }
}
