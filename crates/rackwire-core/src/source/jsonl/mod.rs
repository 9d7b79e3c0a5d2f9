//! JSON-lines capture source.
//!
//! One JSON object per line: `topic`, then either `payload` (text) or
//! `payload_hex` (binary), and an optional RFC 3339 `received_at` that
//! defaults to the Unix epoch so replays are reproducible. Blank lines and
//! lines starting with `#` are skipped.

pub mod error;
pub mod line;
pub mod parser;

pub use parser::JsonlFileSource;
