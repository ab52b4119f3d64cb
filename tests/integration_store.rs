//! Store and engine integration tests

use chrono::{Duration, TimeZone, Utc};

use visit_counter::domain::BucketKeys;
use visit_counter::{Period, StatsReport, VisitEngine, VisitStat, VisitStore};

#[tokio::test]
async fn test_round_trip_preserves_every_dimension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visits.json");
    let engine = VisitEngine::open(VisitStore::new(&path)).await.unwrap();

    let start = Utc.with_ymd_and_hms(2023, 12, 30, 18, 0, 0).unwrap();
    let regions = ["Russia", "Netherlands", "Unknown"];
    for i in 0..40i64 {
        let at = start + Duration::hours(i * 7);
        let visitor = format!("visitor-{}", i % 6);
        let region = regions[(i % 3) as usize];
        engine.record_at(&visitor, Some(region), at).await.unwrap();
    }

    let reopened = VisitEngine::open(VisitStore::new(&path)).await.unwrap();
    for period in Period::ALL {
        assert_eq!(
            reopened.query(period).await,
            engine.query(period).await,
            "{} differs after reload",
            period
        );
    }
    assert_eq!(reopened.snapshot().await, engine.snapshot().await);
    assert_eq!(
        reopened.query(Period::Total).await,
        StatsReport::Total(VisitStat::new(40, 6))
    );
}

#[tokio::test]
async fn test_bucket_keys_nest_for_recorded_visits() {
    let dir = tempfile::tempdir().unwrap();
    let engine = VisitEngine::open(VisitStore::new(dir.path().join("visits.json")))
        .await
        .unwrap();

    let at = Utc.with_ymd_and_hms(2024, 3, 17, 0, 0, 1).unwrap();
    engine.record_at("v1", None, at).await.unwrap();

    let keys = BucketKeys::at(at);
    assert!(keys.day.starts_with(&keys.month));
    assert!(keys.month.starts_with(&keys.year));

    let daily = engine.query(Period::Daily).await;
    let monthly = engine.query(Period::Monthly).await;
    let yearly = engine.query(Period::Yearly).await;
    assert!(daily.as_breakdown().unwrap().contains_key("2024-03-17"));
    assert!(monthly.as_breakdown().unwrap().contains_key("2024-03"));
    assert!(yearly.as_breakdown().unwrap().contains_key("2024"));
}

#[tokio::test]
async fn test_legacy_snapshot_gains_regions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visits.json");
    std::fs::write(
        &path,
        r#"{"total": 1, "unique_total": ["old"], "daily": {"2022-01-01": 1}, "unique_daily": {"2022-01-01": ["old"]}}"#,
    )
    .unwrap();

    let engine = VisitEngine::open(VisitStore::new(&path)).await.unwrap();
    engine.record("new", Some("Netherlands")).await.unwrap();

    assert_eq!(
        engine.query(Period::Total).await,
        StatsReport::Total(VisitStat::new(2, 2))
    );

    // Region keys are now written alongside the old ones
    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["by_region"]["Netherlands"], 1);
    assert_eq!(raw["daily"]["2022-01-01"], 1);
    assert!(raw.get("by_browser").is_none());
}

#[tokio::test]
async fn test_unreadable_snapshot_blocks_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visits.json");
    std::fs::create_dir(&path).unwrap();

    assert!(VisitEngine::open(VisitStore::new(&path)).await.is_err());
}
