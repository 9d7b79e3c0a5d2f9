use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rackwire_core::{JsonlFileSource, MessageSource, SourceError};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn temp_capture(name: &str, contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("rackwire_{name}_{unique}.jsonl"));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn jsonl_source_reads_messages_from_fixture() {
    let path = repo_root()
        .join("tests")
        .join("golden")
        .join("v5008_rfid_churn")
        .join("input.jsonl");
    let mut source = JsonlFileSource::open(&path).unwrap();

    let mut topics = Vec::new();
    while let Some(raw) = source.next_message().unwrap() {
        topics.push(raw.topic);
    }

    assert_eq!(topics.len(), 3);
    assert!(topics.iter().all(|topic| topic.ends_with("/LabelState")));
}

#[test]
fn jsonl_source_rejects_payload_conflicts() {
    let path = temp_capture(
        "conflict",
        "{\"topic\": \"V5008Upload/1/TemHum\", \"payload\": \"x\", \"payload_hex\": \"01\"}\n",
    );
    let mut source = JsonlFileSource::open(&path).unwrap();
    let err = source.next_message().unwrap_err();
    match err {
        SourceError::Line { line, message } => {
            assert_eq!(line, 1);
            assert!(message.contains("both payload and payload_hex"));
        }
        other => panic!("unexpected error: {other}"),
    }
    let _ = fs::remove_file(&path);
}

#[test]
fn jsonl_source_rejects_bad_hex_and_unknown_fields() {
    let input = concat!(
        "{\"topic\": \"V5008Upload/1/TemHum\", \"payload_hex\": \"zz\"}\n",
        "{\"topic\": \"V5008Upload/1/TemHum\", \"payload\": \"\", \"qos\": 1}\n",
    );
    let mut source = JsonlFileSource::from_reader(Cursor::new(input));
    let err = source.next_message().unwrap_err();
    assert!(err.to_string().contains("invalid payload_hex"), "{err}");
    let err = source.next_message().unwrap_err();
    assert!(matches!(err, SourceError::Line { line: 2, .. }));
}

#[test]
fn jsonl_source_reports_missing_file() {
    let path = std::env::temp_dir().join("rackwire_missing_capture_does_not_exist.jsonl");
    let err = match JsonlFileSource::open(&path) {
        Ok(_) => panic!("expected missing file to fail"),
        Err(err) => err,
    };
    assert!(matches!(err, SourceError::Io(_)));
}
