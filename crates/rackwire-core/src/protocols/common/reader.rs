use super::error::DecodeError;

/// Bounds-checked big-endian reads at explicit offsets.
///
/// Every read either returns the value or a `DecodeError::Truncated` naming
/// the offset; the reader never panics on short input.
#[derive(Debug, Clone, Copy)]
pub struct FrameReader<'a> {
    payload: &'a [u8],
}

impl<'a> FrameReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn require_len(&self, needed: usize) -> Result<(), DecodeError> {
        if self.payload.len() < needed {
            return Err(DecodeError::Truncated {
                offset: 0,
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_byte(&self, offset: usize) -> Result<u8, DecodeError> {
        let bytes = self.read_array::<1>(offset)?;
        Ok(bytes[0])
    }

    pub fn read_word(&self, offset: usize) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.read_array::<2>(offset)?))
    }

    pub fn read_dword(&self, offset: usize) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.read_array::<4>(offset)?))
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], DecodeError> {
        self.payload
            .get(range.clone())
            .ok_or(DecodeError::Truncated {
                offset: range.start,
                needed: range.end.saturating_sub(range.start),
                actual: self.payload.len(),
            })
    }

    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], DecodeError> {
        let end = offset.checked_add(N).ok_or(DecodeError::Truncated {
            offset,
            needed: N,
            actual: self.payload.len(),
        })?;
        let bytes = self.payload.get(offset..end).ok_or(DecodeError::Truncated {
            offset,
            needed: N,
            actual: self.payload.len(),
        })?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::FrameReader;
    use crate::protocols::common::error::DecodeError;

    #[test]
    fn reads_big_endian_values() {
        let payload = [0x01, 0x02, 0x03, 0x04, 0x05];
        let reader = FrameReader::new(&payload);
        assert_eq!(reader.read_byte(0).unwrap(), 0x01);
        assert_eq!(reader.read_word(1).unwrap(), 0x0203);
        assert_eq!(reader.read_dword(1).unwrap(), 0x0203_0405);
    }

    #[test]
    fn dword_past_end_is_truncated() {
        let payload = [0u8; 5];
        let reader = FrameReader::new(&payload);
        let err = reader.read_dword(2).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                offset: 2,
                needed: 4,
                actual: 5
            }
        );
    }

    #[test]
    fn huge_offset_does_not_overflow() {
        let payload = [0u8; 2];
        let reader = FrameReader::new(&payload);
        assert!(reader.read_word(usize::MAX).is_err());
    }

    #[test]
    fn require_len_reports_shortfall() {
        let payload = [0u8; 3];
        let reader = FrameReader::new(&payload);
        assert!(reader.require_len(3).is_ok());
        let msg = reader.require_len(4).unwrap_err().to_string();
        assert!(msg.contains("truncated buffer"));
    }
}
