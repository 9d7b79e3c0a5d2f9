use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonlSourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Line { line: usize, message: String },
}
