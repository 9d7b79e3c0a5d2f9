use serde::Deserialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::protocols::message::RawMessage;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CaptureLine {
    topic: String,
    #[serde(default)]
    payload: Option<String>,
    #[serde(default)]
    payload_hex: Option<String>,
    #[serde(default)]
    received_at: Option<String>,
}

/// Decode one capture line. `Ok(None)` means the line is blank or a comment.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use rackwire_core::source::jsonl::line::parse_line;
///
/// let raw = parse_line(r#"{"topic": "V5008Upload/1/TemHum", "payload_hex": "01ff"}"#)
///     .unwrap()
///     .unwrap();
/// assert_eq!(raw.payload, vec![0x01, 0xFF]);
/// ```
pub fn parse_line(line: &str) -> Result<Option<RawMessage>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let capture: CaptureLine =
        serde_json::from_str(trimmed).map_err(|err| format!("invalid capture JSON: {err}"))?;

    let payload = match (capture.payload, capture.payload_hex) {
        (Some(text), None) => text.into_bytes(),
        (None, Some(hex_text)) => hex::decode(hex_text.trim())
            .map_err(|err| format!("invalid payload_hex: {err}"))?,
        (Some(_), Some(_)) => return Err("both payload and payload_hex are set".to_string()),
        (None, None) => return Err("missing payload or payload_hex".to_string()),
    };

    let received_at = match capture.received_at {
        Some(text) => OffsetDateTime::parse(&text, &Rfc3339)
            .map_err(|err| format!("invalid received_at '{text}': {err}"))?,
        None => OffsetDateTime::UNIX_EPOCH,
    };

    Ok(Some(RawMessage::at(capture.topic, payload, received_at)))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::parse_line;

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# recorded on rack 4").unwrap(), None);
    }

    #[test]
    fn decodes_text_and_hex_payloads() {
        let raw = parse_line(r#"{"topic": "V6800Upload/1/x", "payload": "{\"a\":1}"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(raw.payload, br#"{"a":1}"#.to_vec());
        assert_eq!(raw.received_at, time::OffsetDateTime::UNIX_EPOCH);

        let raw = parse_line(
            r#"{"topic": "V5008Upload/1/x", "payload_hex": "BB01", "received_at": "2025-03-01T08:00:00Z"}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(raw.payload, vec![0xBB, 0x01]);
        assert_eq!(raw.received_at, datetime!(2025-03-01 08:00:00 UTC));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_line("{not json").is_err());
        assert!(parse_line(r#"{"topic": "a/b/c"}"#).is_err());
        assert!(parse_line(r#"{"topic": "a/b/c", "payload": "x", "payload_hex": "00"}"#).is_err());
        assert!(parse_line(r#"{"topic": "a/b/c", "payload_hex": "0"}"#).is_err());
        assert!(parse_line(r#"{"topic": "a/b/c", "payload": "x", "received_at": "yesterday"}"#).is_err());
    }
}
