//! Route → parse → normalize → sink for one message at a time.
//!
//! `Pipeline` is `Send + Sync` and may be shared by any number of threads.
//! Each dispatch is independent: a rejected message is logged, reported to
//! the sink and counted, and the next dispatch proceeds normally.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::normalize::{NormalizedRecord, Normalizer};
use crate::protocols::error::ParseError;
use crate::protocols::message::{RawMessage, format_timestamp};
use crate::protocols::router::{ParserRouter, RouteError};

pub const REJECT_UNROUTABLE: &str = "RW-UNROUTABLE";
pub const REJECT_DECODE: &str = "RW-DECODE";
pub const REJECT_PARSE: &str = "RW-PARSE";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("{parser} parser rejected '{topic}': {source}")]
    Parse {
        parser: &'static str,
        topic: String,
        #[source]
        source: ParseError,
    },
}

impl IngestError {
    /// Stable identifier used to group rejections in reports.
    pub fn rejection_id(&self) -> &'static str {
        match self {
            IngestError::Route(_) => REJECT_UNROUTABLE,
            IngestError::Parse {
                source: ParseError::Decode(_),
                ..
            } => REJECT_DECODE,
            IngestError::Parse { .. } => REJECT_PARSE,
        }
    }
}

/// Receives the output of the pipeline.
pub trait RecordSink: Send + Sync {
    fn accept(&self, records: Vec<NormalizedRecord>);

    fn reject(&self, _error: &IngestError, _raw: &RawMessage) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub id: String,
    pub topic: String,
    pub message: String,
    pub received_at: String,
}

/// Sink that keeps everything in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<NormalizedRecord>>,
    rejections: Mutex<Vec<Rejection>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<NormalizedRecord> {
        self.records.lock().clone()
    }

    pub fn rejections(&self) -> Vec<Rejection> {
        self.rejections.lock().clone()
    }

    pub fn take_records(&self) -> Vec<NormalizedRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    pub fn take_rejections(&self) -> Vec<Rejection> {
        std::mem::take(&mut *self.rejections.lock())
    }
}

impl RecordSink for MemorySink {
    fn accept(&self, records: Vec<NormalizedRecord>) {
        self.records.lock().extend(records);
    }

    fn reject(&self, error: &IngestError, raw: &RawMessage) {
        self.rejections.lock().push(Rejection {
            id: error.rejection_id().to_string(),
            topic: raw.topic.clone(),
            message: error.to_string(),
            received_at: format_timestamp(raw.received_at),
        });
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub messages_processed: u64,
    pub messages_rejected: u64,
    pub records_emitted: u64,
}

#[derive(Debug, Default)]
struct Counters {
    processed: AtomicU64,
    rejected: AtomicU64,
    records: AtomicU64,
}

pub struct Pipeline {
    router: ParserRouter,
    normalizer: Normalizer,
    sink: Arc<dyn RecordSink>,
    counters: Counters,
}

impl Pipeline {
    pub fn new(router: ParserRouter, normalizer: Normalizer, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            router,
            normalizer,
            sink,
            counters: Counters::default(),
        }
    }

    pub fn from_config(config: &PipelineConfig, sink: Arc<dyn RecordSink>) -> Self {
        Self::new(ParserRouter::from_config(config), Normalizer::new(), sink)
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Process one message, returning the number of records handed to the sink.
    pub fn dispatch(&self, raw: &RawMessage) -> Result<usize, IngestError> {
        self.counters.processed.fetch_add(1, Ordering::Relaxed);
        match self.process(raw) {
            Ok(records) => {
                let count = records.len();
                self.counters
                    .records
                    .fetch_add(count as u64, Ordering::Relaxed);
                if !records.is_empty() {
                    self.sink.accept(records);
                }
                Ok(count)
            }
            Err(err) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(
                    topic = raw.topic.as_str(),
                    rejection = err.rejection_id(),
                    error = %err,
                    "message rejected"
                );
                self.sink.reject(&err, raw);
                Err(err)
            }
        }
    }

    /// Convenience for transports that hand over topic and payload only.
    pub fn dispatch_parts(
        &self,
        topic: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> Result<usize, IngestError> {
        self.dispatch(&RawMessage::new(topic, payload))
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            messages_processed: self.counters.processed.load(Ordering::Relaxed),
            messages_rejected: self.counters.rejected.load(Ordering::Relaxed),
            records_emitted: self.counters.records.load(Ordering::Relaxed),
        }
    }

    fn process(&self, raw: &RawMessage) -> Result<Vec<NormalizedRecord>, IngestError> {
        let parser = self.router.route(&raw.topic)?;
        let parsed = parser.parse(raw).map_err(|source| IngestError::Parse {
            parser: parser.name(),
            topic: raw.topic.clone(),
            source,
        })?;
        debug!(
            topic = raw.topic.as_str(),
            parser = parser.name(),
            msg_type = parsed.msg_type.as_str(),
            "parsed message"
        );
        Ok(self.normalizer.normalize(&parsed))
    }
}
