//! Offline replay of a capture through the pipeline.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::PipelineConfig;
use crate::pipeline::{
    MemorySink, Pipeline, REJECT_DECODE, REJECT_PARSE, REJECT_UNROUTABLE, Rejection,
};
use crate::protocols::message::format_timestamp;
use crate::source::{JsonlFileSource, MessageSource, SourceError};
use crate::{ReplayReport, ReplaySummary, RejectionSummary, make_stub_report};

const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

pub fn replay_file(path: &Path, config: &PipelineConfig) -> Result<ReplayReport, ReplayError> {
    let source = JsonlFileSource::open(path)?;
    replay_source(path, source, config)
}

/// Replay every message of `source` through a fresh pipeline.
///
/// Messages are dispatched in source order on the calling thread, so the
/// report's record order is the order the pipeline emitted them.
pub fn replay_source<S: MessageSource>(
    path: &Path,
    mut source: S,
    config: &PipelineConfig,
) -> Result<ReplayReport, ReplayError> {
    let sink = Arc::new(MemorySink::new());
    let pipeline = Pipeline::from_config(config, sink.clone());
    let mut last_received = None;

    while let Some(raw) = source.next_message()? {
        last_received = Some(raw.received_at);
        // Rejections are collected by the sink.
        let _ = pipeline.dispatch(&raw);
    }

    let input_bytes = path.metadata().map(|meta| meta.len()).unwrap_or(0);
    let mut report = make_stub_report(&path.display().to_string(), input_bytes);
    if let Some(ts) = last_received {
        report.generated_at = format_timestamp(ts);
    }

    let stats = pipeline.stats();
    let records = sink.take_records();
    let mut records_by_class: BTreeMap<String, u64> = BTreeMap::new();
    for record in &records {
        *records_by_class
            .entry(record.record_class.as_str().to_string())
            .or_default() += 1;
    }
    report.summary = ReplaySummary {
        messages_total: stats.messages_processed,
        messages_rejected: stats.messages_rejected,
        records_total: records.len() as u64,
        records_by_class,
    };
    report.rejections = summarize_rejections(sink.take_rejections());
    report.records = records;

    info!(
        path = %path.display(),
        messages = report.summary.messages_total,
        rejected = report.summary.messages_rejected,
        records = report.summary.records_total,
        "replay complete"
    );
    Ok(report)
}

fn summarize_rejections(rejections: Vec<Rejection>) -> Vec<RejectionSummary> {
    let mut grouped: BTreeMap<String, RejectionSummary> = BTreeMap::new();
    for rejection in rejections {
        let entry = grouped
            .entry(rejection.id.clone())
            .or_insert_with(|| RejectionSummary {
                id: rejection.id.clone(),
                message: rejection_message(&rejection.id).to_string(),
                count: 0,
                examples: Vec::new(),
            });
        entry.count += 1;
        if entry.examples.len() < MAX_EXAMPLES {
            entry.examples.push(format!(
                "{} @ {}: {}",
                rejection.topic, rejection.received_at, rejection.message
            ));
        }
    }
    grouped.into_values().collect()
}

fn rejection_message(id: &str) -> &'static str {
    match id {
        REJECT_UNROUTABLE => "No parser owns the topic",
        REJECT_DECODE => "Payload shorter than its layout",
        REJECT_PARSE => "Payload or topic rejected by its parser",
        _ => "Rejected message",
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use time::OffsetDateTime;
    use time::macros::datetime;

    use super::{ReplayError, replay_file, replay_source};
    use crate::config::PipelineConfig;
    use crate::protocols::message::RawMessage;
    use crate::source::{SourceError, VecSource};

    #[test]
    fn groups_rejections_and_caps_examples() {
        let messages = (0..5).map(|i| {
            RawMessage::at(
                format!("X9000Upload/{i}/Status"),
                b"{}".to_vec(),
                OffsetDateTime::UNIX_EPOCH,
            )
        });
        let report = replay_source(
            Path::new("memory.jsonl"),
            VecSource::new(messages),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(report.summary.messages_total, 5);
        assert_eq!(report.summary.messages_rejected, 5);
        assert_eq!(report.rejections.len(), 1);
        assert_eq!(report.rejections[0].id, "RW-UNROUTABLE");
        assert_eq!(report.rejections[0].count, 5);
        assert_eq!(report.rejections[0].examples.len(), 3);
        assert_eq!(report.input.bytes, 0);
    }

    #[test]
    fn generated_at_is_last_received_at() {
        let messages = vec![
            RawMessage::at("G6000Upload/a/b", b"1".to_vec(), datetime!(2025-03-01 08:00:00 UTC)),
            RawMessage::at("G6000Upload/a/b", b"2".to_vec(), datetime!(2025-03-01 08:00:05 UTC)),
        ];
        let report = replay_source(
            Path::new("memory.jsonl"),
            VecSource::new(messages),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(report.generated_at, "2025-03-01T08:00:05Z");
        assert_eq!(report.summary.records_by_class["EVENT"], 2);
    }

    #[test]
    fn missing_capture_surfaces_as_source_error() {
        let path = std::env::temp_dir().join("rackwire_replay_missing_capture.jsonl");
        let err = replay_file(&path, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, ReplayError::Source(SourceError::Io(_))));
    }
}
