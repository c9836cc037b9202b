//! Bounds-checked byte-stream reader for wire deserialization

use crate::error::DecodeError;

/// Cursor over a transaction wire buffer
///
/// Every read is bounds-checked; reading past the end is an error, never a
/// panic. The cursor tracks how many bytes have been consumed so the caller
/// can distinguish an exact decode from one that left a remainder.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left in the buffer
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        if count > self.remaining() {
            return Err(DecodeError::UnexpectedEnd);
        }
        let slice = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        let bytes = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(self.read_u64()? as i64)
    }

    /// Read a variable-length count, rejecting non-minimal encodings
    pub fn read_compact_size(&mut self) -> Result<u64, DecodeError> {
        let first = self.read_u8()?;
        let value = match first {
            0xfd => {
                let v = self.read_u16()? as u64;
                if v < 0xfd {
                    return Err(DecodeError::NonCanonicalCompactSize);
                }
                v
            }
            0xfe => {
                let v = self.read_u32()? as u64;
                if v <= u16::MAX as u64 {
                    return Err(DecodeError::NonCanonicalCompactSize);
                }
                v
            }
            0xff => {
                let v = self.read_u64()?;
                if v <= u32::MAX as u64 {
                    return Err(DecodeError::NonCanonicalCompactSize);
                }
                v
            }
            small => small as u64,
        };
        Ok(value)
    }

    /// Read a compact-size count that must fit the remaining buffer
    ///
    /// Collection counts can never exceed the bytes left to describe them,
    /// so an oversized count is an early end-of-data.
    pub fn read_count(&mut self) -> Result<usize, DecodeError> {
        let count = self.read_compact_size()?;
        if count > self.remaining() as u64 {
            return Err(DecodeError::UnexpectedEnd);
        }
        Ok(count as usize)
    }
}
