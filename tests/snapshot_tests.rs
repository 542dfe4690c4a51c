use std::time::Duration;

use chart_overlay::acquire::{SnapshotFallback, YieldSnapshot};
use chart_overlay::core::Observation;
use chrono::{TimeZone, Utc};

#[test]
fn snapshot_json_uses_camel_case_fields() {
    let observed_at = Utc
        .with_ymd_and_hms(2025, 10, 17, 14, 30, 0)
        .single()
        .expect("time");
    let observation = Observation::new(4.23, -0.02, "US 10Y Yield: 4.23", observed_at);
    let json = YieldSnapshot::from_observation(&observation)
        .to_json_pretty()
        .expect("json");

    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["yieldValue"], 4.23);
    assert_eq!(value["dayChangeValue"], -0.02);
    assert_eq!(value["tooltip"], "US 10Y Yield: 4.23");
    assert_eq!(value["updatedAt"], "2025-10-17T14:30:00Z");
}

#[test]
fn legacy_snapshot_without_timestamp_still_parses() {
    let snapshot = YieldSnapshot::from_json_str(
        r#"{"yieldValue": 4.5, "dayChangeValue": 0.0, "tooltip": "US 20Y Yield: 4.50"}"#,
    )
    .expect("snapshot");
    assert!(snapshot.updated_at.is_none());

    let fallback_time = Utc::now();
    let observation = snapshot.to_observation(fallback_time).expect("observation");
    assert_eq!(observation.value(), 4.5);
    assert!(observation.change_sign().is_non_negative());
    assert_eq!(observation.observed_at(), fallback_time);
}

#[test]
fn malformed_snapshot_is_a_parse_failure() {
    assert!(YieldSnapshot::from_json_str("{\"yieldValue\": \"high\"}").is_err());
    assert!(YieldSnapshot::from_json_str("").is_err());
}

#[test]
fn atomic_write_replaces_previous_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data").join("yield.json");

    for value in [4.1, 4.2] {
        let observation = Observation::new(value, 0.1, format!("{value}"), Utc::now());
        YieldSnapshot::from_observation(&observation)
            .write_atomic(&path)
            .expect("write");
    }

    let raw = std::fs::read_to_string(&path).expect("read back");
    let stored = YieldSnapshot::from_json_str(&raw).expect("parse back");
    assert_eq!(stored.yield_value, 4.2);

    let leftovers = std::fs::read_dir(path.parent().expect("parent"))
        .expect("list")
        .count();
    assert_eq!(leftovers, 1, "temp files must not be left behind");
}

#[tokio::test]
async fn legacy_snapshot_age_comes_from_file_time() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("yield.json");
    std::fs::write(
        &path,
        r#"{"yieldValue": 4.5, "dayChangeValue": -0.01, "tooltip": "legacy"}"#,
    )
    .expect("write");

    let fallback = SnapshotFallback::new(&path, Duration::from_secs(600));
    let observation = fallback.load_fresh(Utc::now()).await.expect("fresh");
    assert_eq!(observation.label(), "legacy");

    let later = Utc::now() + chrono::Duration::hours(1);
    assert!(fallback.load_fresh(later).await.is_none());
}

#[tokio::test]
async fn missing_or_corrupt_snapshot_is_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = SnapshotFallback::new(dir.path().join("absent.json"), Duration::from_secs(60));
    assert!(missing.load_fresh(Utc::now()).await.is_none());

    let corrupt_path = dir.path().join("corrupt.json");
    std::fs::write(&corrupt_path, "not json").expect("write");
    let corrupt = SnapshotFallback::new(&corrupt_path, Duration::from_secs(60));
    assert!(corrupt.load_fresh(Utc::now()).await.is_none());
}
