use thiserror::Error;

/// Errors returned by the shared field decoders.
///
/// # Examples
/// ```
/// use rackwire_core::DecodeError;
///
/// let err = DecodeError::Truncated { offset: 4, needed: 4, actual: 6 };
/// assert!(err.to_string().contains("truncated buffer"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("truncated buffer: need {needed} bytes at offset {offset}, got {actual}")]
    Truncated {
        offset: usize,
        needed: usize,
        actual: usize,
    },
    #[error("invalid IPv4 address: {value}")]
    InvalidIp { value: String },
}
