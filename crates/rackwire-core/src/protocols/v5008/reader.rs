use crate::protocols::common::{DecodeError, FrameReader, signed_fixed_point, tag_id, unsigned_fixed_point};

use super::layout;

/// V5008 conventions on top of the shared frame reader.
pub struct V5008Reader<'a> {
    frame: FrameReader<'a>,
}

impl<'a> V5008Reader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            frame: FrameReader::new(payload),
        }
    }

    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn payload(&self) -> &'a [u8] {
        self.frame.payload()
    }

    pub fn require_len(&self, needed: usize) -> Result<(), DecodeError> {
        self.frame.require_len(needed)
    }

    pub fn read_byte(&self, offset: usize) -> Result<u8, DecodeError> {
        self.frame.read_byte(offset)
    }

    pub fn read_word(&self, offset: usize) -> Result<u16, DecodeError> {
        self.frame.read_word(offset)
    }

    pub fn read_dword(&self, offset: usize) -> Result<u32, DecodeError> {
        self.frame.read_dword(offset)
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], DecodeError> {
        self.frame.read_slice(range)
    }

    /// Offset of the trailing message id, i.e. the end of the body.
    pub fn body_end(&self) -> Result<usize, DecodeError> {
        self.require_len(layout::MESSAGE_ID_LEN)?;
        Ok(self.len() - layout::MESSAGE_ID_LEN)
    }

    pub fn message_id(&self) -> Result<u32, DecodeError> {
        let offset = self.body_end()?;
        self.read_dword(offset)
    }

    /// Module serials are rendered as the decimal value of their four bytes.
    pub fn module_id(&self, offset: usize) -> Result<String, DecodeError> {
        Ok(self.read_dword(offset)?.to_string())
    }

    pub fn tag_id(&self, offset: usize) -> Result<String, DecodeError> {
        Ok(tag_id(self.read_dword(offset)?))
    }

    /// Signed hundredths pair, `None` when flagged unavailable.
    pub fn signed_metric(&self, offset: usize) -> Result<Option<f64>, DecodeError> {
        Ok(self
            .metric_pair(offset)?
            .map(|[int, frac]| signed_fixed_point(int, frac)))
    }

    /// Unsigned hundredths pair, `None` when flagged unavailable.
    pub fn unsigned_metric(&self, offset: usize) -> Result<Option<f64>, DecodeError> {
        Ok(self
            .metric_pair(offset)?
            .map(|[int, frac]| unsigned_fixed_point(int, frac)))
    }

    fn metric_pair(&self, offset: usize) -> Result<Option<[u8; 2]>, DecodeError> {
        let pair = [self.read_byte(offset)?, self.read_byte(offset + 1)?];
        if pair == layout::UNAVAILABLE_PAIR {
            Ok(None)
        } else {
            Ok(Some(pair))
        }
    }
}
