use std::fs;
use std::path::{Path, PathBuf};

use rackwire_core::{PipelineConfig, ReplayReport, replay_file};

fn golden_dir(dir: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(dir)
}

fn load_expected_report(dir: &str) -> ReplayReport {
    let expected_path = golden_dir(dir).join("expected_report.json");
    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    serde_json::from_str(&expected_json).expect("parse expected report")
}

fn run_golden(dir: &str) -> ReplayReport {
    let input = golden_dir(dir).join("input.jsonl");
    let expected = load_expected_report(dir);

    let mut actual = replay_file(&input, &PipelineConfig::default()).expect("replay capture");
    assert_eq!(
        actual.records.len(),
        expected.records.len(),
        "record count mismatch in {dir}"
    );
    actual.input.path = expected.input.path.clone();
    for (record, pinned) in actual.records.iter_mut().zip(&expected.records) {
        record.uuid = pinned.uuid;
    }

    let actual_value = serde_json::to_value(&actual).expect("serialize actual");
    let expected_value = serde_json::to_value(&expected).expect("serialize expected");

    assert_eq!(actual_value, expected_value, "golden mismatch in {dir}");
    actual
}

#[test]
fn golden_v5008_rfid_churn() {
    run_golden("tests/golden/v5008_rfid_churn");
}

#[test]
fn golden_mixed_families() {
    run_golden("tests/golden/mixed_families");
}

#[test]
fn golden_v5008_rfid_churn_has_diff_sequence() {
    let report = load_expected_report("tests/golden/v5008_rfid_churn");
    let actions: Vec<(String, &str)> = report
        .records
        .iter()
        .filter(|record| record.data_key == "rfid_event")
        .map(|record| {
            let action = record.json_value.as_ref().expect("change payload")["action"]
                .as_str()
                .expect("action")
                .to_string();
            (action, record.str_value.as_deref().expect("tag id"))
        })
        .collect();
    assert_eq!(
        actions,
        vec![
            ("attach".to_string(), "DD344A44"),
            ("attach".to_string(), "DD23B0B4"),
            ("alarm_change".to_string(), "DD23B0B4"),
            ("attach".to_string(), "DD3CE9C4"),
            ("detach".to_string(), "DD344A44"),
            ("detach".to_string(), "DD23B0B4"),
            ("detach".to_string(), "DD3CE9C4"),
        ]
    );
    let last = report.records.last().expect("final snapshot");
    assert_eq!(last.data_key, "rfid_snapshot");
    assert_eq!(last.num_value, Some(0.0));
}

#[test]
fn golden_mixed_families_fans_out_climate_slots() {
    let report = load_expected_report("tests/golden/mixed_families");
    let climate: Vec<_> = report
        .records
        .iter()
        .filter(|record| record.path.starts_with("2437871205/M1/") && record.ts.ends_with(":00Z"))
        .collect();
    assert_eq!(climate.len(), 12);
    assert!(
        climate
            .iter()
            .all(|record| record.record_class.as_str() == "TELEMETRY")
    );
    assert_eq!(climate[0].num_value, Some(28.48));
    assert_eq!(climate[1].num_value, Some(51.1));
    assert_eq!(climate[4].num_value, Some(-5.5));
}

#[test]
fn golden_mixed_families_reports_rejections() {
    let report = load_expected_report("tests/golden/mixed_families");
    assert_eq!(report.summary.messages_total, 12);
    assert_eq!(report.summary.messages_rejected, 2);
    let ids: Vec<&str> = report.rejections.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["RW-DECODE", "RW-UNROUTABLE"]);
    assert_eq!(report.generated_at, "2025-03-01T08:00:11Z");
}

#[test]
fn golden_mixed_families_applies_change_events() {
    let report = load_expected_report("tests/golden/mixed_families");
    let tail: Vec<(&str, &str)> = report.records[report.records.len() - 3..]
        .iter()
        .map(|record| (record.data_key.as_str(), record.path.as_str()))
        .collect();
    assert_eq!(
        tail,
        vec![
            ("rfid_event", "2123456789/M2/S3"),
            ("rfid_event", "2123456789/M2/S5"),
            ("rfid_snapshot", "2123456789/M2/S0"),
        ]
    );
    let heartbeat_paths: Vec<&str> = report
        .records
        .iter()
        .filter(|record| record.data_key == "heartbeat")
        .map(|record| record.path.as_str())
        .collect();
    assert_eq!(heartbeat_paths, vec!["2437871205/M0/S0", "2123456789/M0/S0"]);
}
