use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::protocols::message::RawMessage;
use crate::source::{MessageSource, SourceError};

use super::error::JsonlSourceError;
use super::line::parse_line;

pub struct JsonlFileSource<R = BufReader<File>> {
    reader: R,
    line_number: usize,
    buffer: String,
}

impl JsonlFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(SourceError::from)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonlFileSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: String::new(),
        }
    }

    fn next_raw(&mut self) -> Result<Option<RawMessage>, JsonlSourceError> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let parsed = parse_line(&self.buffer).map_err(|message| JsonlSourceError::Line {
                line: self.line_number,
                message,
            })?;
            if let Some(raw) = parsed {
                return Ok(Some(raw));
            }
        }
    }
}

impl<R: BufRead> MessageSource for JsonlFileSource<R> {
    fn next_message(&mut self) -> Result<Option<RawMessage>, SourceError> {
        self.next_raw().map_err(SourceError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::JsonlFileSource;
    use crate::source::{MessageSource, SourceError};

    #[test]
    fn reports_line_numbers_past_skipped_lines() {
        let input = "# header\n\n{\"topic\": \"a/b/c\", \"payload\": \"x\"}\n{oops}\n";
        let mut source = JsonlFileSource::from_reader(Cursor::new(input));
        let first = source.next_message().unwrap().unwrap();
        assert_eq!(first.topic, "a/b/c");
        let err = source.next_message().unwrap_err();
        assert!(matches!(err, SourceError::Line { line: 4, .. }));
    }

    #[test]
    fn ends_cleanly() {
        let mut source = JsonlFileSource::from_reader(Cursor::new("{\"topic\": \"a/b/c\", \"payload\": \"\"}"));
        assert!(source.next_message().unwrap().is_some());
        assert!(source.next_message().unwrap().is_none());
        assert!(source.next_message().unwrap().is_none());
    }
}
