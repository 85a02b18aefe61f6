//! Bounds-checked reads over an in-memory image buffer.
//!
//! All table readers share one immutable byte slice and address it by
//! absolute offset, so no cursor state leaks between components. Every
//! read is checked against the buffer length and fails with
//! [`PeError::TruncatedFile`](crate::error::PeError::TruncatedFile)
//! instead of panicking, whatever the input looks like.

use crate::error::{PeError, Result};

/// Positional reader over a borrowed byte buffer.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'data> {
    data: &'data [u8],
}

impl<'data> ByteCursor<'data> {
    pub fn new(data: &'data [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw slice access for callers that need to scan a region themselves.
    pub fn bytes(&self, offset: usize, len: usize) -> Result<&'data [u8]> {
        self.data
            .get(offset..offset.saturating_add(len))
            .ok_or(PeError::TruncatedFile {
                expected: offset.saturating_add(len),
                actual: self.data.len(),
            })
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        Ok(self.bytes(offset, 1)?[0])
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        let b = self.bytes(offset, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        let b = self.bytes(offset, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u64(&self, offset: usize) -> Result<u64> {
        let b = self.bytes(offset, 8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Read a NUL-terminated ASCII string at `offset`, capped at `max_len`
    /// bytes. A missing terminator ends the string at the cap or the end of
    /// the buffer. Bytes outside printable ASCII are replaced, never
    /// rejected; symbol names in hostile images are not trustworthy input.
    pub fn read_cstring(&self, offset: usize, max_len: usize) -> Result<String> {
        if offset >= self.data.len() {
            return Err(PeError::TruncatedFile {
                expected: offset + 1,
                actual: self.data.len(),
            });
        }
        let end = offset.saturating_add(max_len).min(self.data.len());
        let slice = &self.data[offset..end];
        let len = slice.iter().position(|&b| b == 0).unwrap_or(slice.len());
        Ok(String::from_utf8_lossy(&slice[..len]).into_owned())
    }
}
