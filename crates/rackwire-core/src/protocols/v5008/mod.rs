//! V5008 binary protocol decoding.
//!
//! Frames are fixed-offset, big-endian and end with a 4-byte message id.
//! Dispatch is two-level: the topic's message class selects a layout, and
//! for `OpeAck` the leading header byte (plus a sub-header for `EF`)
//! selects the variant. Both levels are static lookup tables in `parser`.
//!
//! Offsets live in `layout`; sentinel handling (`FF FF` metrics, module id
//! and tag id rendering) lives in `reader`.

pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::V5008Parser;
