mod jsonl;

pub use jsonl::JsonlFileSource;

use std::collections::VecDeque;

use thiserror::Error;

use crate::protocols::message::RawMessage;

/// Anything that yields raw messages in order: a capture file, a broker
/// subscription, a test fixture.
pub trait MessageSource {
    fn next_message(&mut self) -> Result<Option<RawMessage>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture line {line}: {message}")]
    Line { line: usize, message: String },
}

impl From<jsonl::error::JsonlSourceError> for SourceError {
    fn from(value: jsonl::error::JsonlSourceError) -> Self {
        match value {
            jsonl::error::JsonlSourceError::Io(err) => SourceError::Io(err),
            jsonl::error::JsonlSourceError::Line { line, message } => {
                SourceError::Line { line, message }
            }
        }
    }
}

/// In-memory source, drained front to back.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    messages: VecDeque<RawMessage>,
}

impl VecSource {
    pub fn new(messages: impl IntoIterator<Item = RawMessage>) -> Self {
        Self {
            messages: messages.into_iter().collect(),
        }
    }
}

impl MessageSource for VecSource {
    fn next_message(&mut self) -> Result<Option<RawMessage>, SourceError> {
        Ok(self.messages.pop_front())
    }
}
