use thiserror::Error;

use super::common::DecodeError;

/// Errors returned by protocol parsers.
///
/// Every variant is scoped to a single message: the pipeline reports it and
/// moves on to the next message.
///
/// # Examples
/// ```
/// use rackwire_core::ParseError;
///
/// let err = ParseError::UnknownSubcommand { command: 0xE9 };
/// assert!(err.to_string().contains("0xE9"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid topic '{topic}': expected {{namespace}}/{{deviceId}}/{{messageClass}}")]
    InvalidTopic { topic: String },
    #[error("unknown message class '{class}'")]
    UnknownMessageClass { class: String },
    #[error("unknown header 0x{header}")]
    UnknownHeader { header: String },
    #[error("unknown command subcommand 0x{command:02X}")]
    UnknownSubcommand { command: u8 },
    #[error("invalid layout: {reason}")]
    InvalidLayout { reason: String },
    #[error("invalid '{msg_type}' payload: {reason}")]
    InvalidPayload { msg_type: String, reason: String },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
