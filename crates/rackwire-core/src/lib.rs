//! rackwire core library: device protocol decoding and record normalization.
//!
//! Messages arrive as a topic plus an opaque payload. The parser router
//! picks a family parser by topic namespace, the parser decodes the payload
//! into a [`ParsedMessage`], and the [`Normalizer`] turns that into flat
//! [`NormalizedRecord`]s. RFID snapshots are diffed against the last
//! snapshot stored for the same module to recover attach/detach events.
//!
//! Parsing is byte-oriented and side-effect free; all I/O is isolated in
//! `source` modules and the replay driver. Family conventions (fixed-point
//! pairs, sentinel bytes, identifier rendering) live in readers so parsers
//! stay declarative.
//!
//! Invariants:
//! - Parsing is deterministic: identical raw messages parse identically.
//! - Stateful work for one `(device, module)` key is serialized; different
//!   keys never share a lock.
//! - A failing message never affects any other message.
//! - Replay reports are deterministic apart from record UUIDs.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use rackwire_core::{PipelineConfig, replay_file};
//!
//! let report = replay_file(Path::new("capture.jsonl"), &PipelineConfig::default())?;
//! println!("records: {}", report.summary.records_total);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod config;
mod normalize;
mod pipeline;
mod protocols;
mod replay;
mod source;

pub use config::{ConfigError, PipelineConfig};
pub use normalize::{
    ChangeAction, DeviceStateStore, Normalizer, NormalizedRecord, RecordClass, RecordIdentity,
    StateKey, StateKind, TagChange, TagSnapshot, TagState, apply_events, diff_snapshots,
    record_path,
};
pub use pipeline::{
    IngestError, MemorySink, Pipeline, PipelineStats, REJECT_DECODE, REJECT_PARSE,
    REJECT_UNROUTABLE, RecordSink, Rejection,
};
pub use protocols::capture::CaptureParser;
pub use protocols::common::{
    DecodeError, FrameReader, ip_to_string, parse_ip, signed_fixed_point, unsigned_fixed_point,
};
pub use protocols::error::ParseError;
pub use protocols::message::{
    AckCommand, AckModule, AckOutcome, AckSlot, ClimateModule, ClimateReading, CommandAck,
    DeviceFamily, DeviceProfile, DoorReading, Heartbeat, MessageBody, ModulePresence,
    ModuleProfile, NoiseModule, NoiseReading, ParsedMessage, PowerStatus, RawMessage,
    RfidModuleEvents, RfidModuleSnapshot, TagAction, TagEvent, TagReading, format_timestamp,
};
pub use protocols::router::{ParserKind, ParserRouter, ProtocolParser, RouteError};
pub use protocols::v5008::V5008Parser;
pub use protocols::v6800::V6800Parser;
pub use replay::{ReplayError, replay_file, replay_source};
pub use source::{JsonlFileSource, MessageSource, SourceError, VecSource};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no message time is available.
pub const DEFAULT_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

/// Result of replaying a capture through the pipeline.
///
/// # Examples
/// ```
/// use rackwire_core::make_stub_report;
///
/// let report = make_stub_report("capture.jsonl", 123);
/// assert_eq!(report.report_version, rackwire_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 `received_at` of the last replayed message.
    pub generated_at: String,

    /// Input capture metadata.
    pub input: InputInfo,

    pub summary: ReplaySummary,
    /// Rejections grouped by id, sorted by id.
    pub rejections: Vec<RejectionSummary>,
    /// Records in emission order.
    pub records: Vec<NormalizedRecord>,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use rackwire_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "rackwire".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "rackwire");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "rackwire").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the replay.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Message and record counters for one replay.
///
/// # Examples
/// ```
/// use rackwire_core::ReplaySummary;
///
/// let summary = ReplaySummary::default();
/// assert_eq!(summary.records_total, 0);
/// assert!(summary.records_by_class.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub messages_total: u64,
    pub messages_rejected: u64,
    pub records_total: u64,
    /// Record count per record class name.
    pub records_by_class: BTreeMap<String, u64>,
}

/// Rejected messages sharing one rejection id.
///
/// # Examples
/// ```
/// use rackwire_core::RejectionSummary;
///
/// let rejection = RejectionSummary {
///     id: "RW-UNROUTABLE".to_string(),
///     message: "No parser owns the topic".to_string(),
///     count: 1,
///     examples: vec!["X9000Upload/1/Status @ 1970-01-01T00:00:00Z".to_string()],
/// };
/// assert_eq!(rejection.count, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionSummary {
    /// Stable rejection identifier (e.g., `RW-DECODE`).
    pub id: String,
    /// Human-readable description of the rejection class.
    pub message: String,
    /// Number of messages aggregated into this entry.
    pub count: u64,
    /// At most three examples, formatted as `topic @ ts: error`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use rackwire_core::make_stub_report;
///
/// let report = make_stub_report("capture.jsonl", 123);
/// assert_eq!(report.input.bytes, 123);
/// assert!(report.records.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> ReplayReport {
    ReplayReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "rackwire".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_TIMESTAMP.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        summary: ReplaySummary::default(),
        rejections: vec![],
        records: vec![],
    }
}
