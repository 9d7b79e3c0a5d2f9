//! V6800 JSON protocol decoding.
//!
//! Payloads are JSON objects dispatched on their `msg_type`. Recognised
//! types are deserialized into the typed shapes in `schema`; a recognised
//! type with the wrong shape is an error, while unrecognised types and
//! non-JSON payloads still produce a message (`Unknown` / `Raw`) so the
//! normalizer can emit a fallback record.

pub mod parser;
pub mod schema;

pub use parser::V6800Parser;
