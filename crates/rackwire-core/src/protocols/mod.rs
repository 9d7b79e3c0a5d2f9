//! Protocol decoding modules.
//!
//! Each binary family follows a layered structure:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `reader`: safe byte access and family conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//!
//! JSON families replace `layout`/`reader` with a typed `schema`. Shared
//! helpers (bounds-checked reads, fixed-point and address conversions, topic
//! splitting) live in `common`, and `error` holds the per-message error
//! type.
//!
//! Parsers are pure and contain no I/O. The `router` picks a parser by
//! topic; sources and the pipeline handle everything else.

pub mod capture;
pub mod common;
pub mod error;
pub mod message;
pub mod router;
pub mod v5008;
pub mod v6800;
