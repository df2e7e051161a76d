use crate::codec::error::{CodecError, Result};
use crate::item::FieldId;

/// Read cursor over an items.dat buffer.
///
/// Tracks the byte offset and the index of the record being read so any
/// out-of-bounds read reports where it happened. Reads never backtrack.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
    item_index: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            item_index: 0,
        }
    }

    /// Create a cursor starting at `position`
    pub fn at(data: &'a [u8], position: usize) -> Self {
        Self {
            data,
            position,
            item_index: 0,
        }
    }

    /// Get current position in the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Set the record index reported by truncation errors
    pub fn begin_item(&mut self, item_index: usize) {
        self.item_index = item_index;
    }

    /// Take the next `len` bytes.
    pub fn take(&mut self, len: usize, field: FieldId) -> Result<&'a [u8]> {
        let start = self.position;
        let bytes = start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or(CodecError::TruncatedInput {
                item_index: self.item_index,
                field,
                offset: start,
            })?;
        self.position += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self, field: FieldId) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N, field)?);
        Ok(buf)
    }

    // === Primitive Parsers (Big-Endian) ===

    pub fn read_u8(&mut self, field: FieldId) -> Result<u8> {
        Ok(self.take_array::<1>(field)?[0])
    }

    pub fn read_u16(&mut self, field: FieldId) -> Result<u16> {
        self.take_array(field).map(u16::from_be_bytes)
    }

    pub fn read_i32(&mut self, field: FieldId) -> Result<i32> {
        self.take_array(field).map(i32::from_be_bytes)
    }

    /// Parse a u16 length prefix followed by that many bytes
    pub fn read_prefixed(&mut self, field: FieldId) -> Result<&'a [u8]> {
        let len = self.read_u16(field)? as usize;
        self.take(len, field)
    }

    /// Skip `count` bytes forward
    pub fn skip(&mut self, count: usize, field: FieldId) -> Result<()> {
        self.take(count, field).map(|_| ())
    }
}
