//! Bounded byte cursor
//!
//! A cursor only ever sees the slice it was built from. Track bodies get their
//! own cursor over exactly the declared chunk length, so a malformed event can
//! never consume bytes of the following chunk.

use byteorder::{BigEndian, ByteOrder};

use super::MidiError;

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
    /// Offset of `data[0]` within the whole file, for error messages
    base: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8], base: usize) -> Self {
        Self {
            data,
            position: 0,
            base,
        }
    }

    /// Absolute offset of the next unread byte
    pub fn position(&self) -> usize {
        self.base + self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn peek_u8(&self) -> Result<u8, MidiError> {
        self.data
            .get(self.position)
            .copied()
            .ok_or_else(|| self.truncated(1))
    }

    pub fn read_u8(&mut self) -> Result<u8, MidiError> {
        let byte = self.peek_u8()?;
        self.position += 1;
        Ok(byte)
    }

    pub fn read_u16_be(&mut self) -> Result<u16, MidiError> {
        self.read_bytes(2).map(BigEndian::read_u16)
    }

    pub fn read_u24_be(&mut self) -> Result<u32, MidiError> {
        self.read_bytes(3).map(BigEndian::read_u24)
    }

    pub fn read_u32_be(&mut self) -> Result<u32, MidiError> {
        self.read_bytes(4).map(BigEndian::read_u32)
    }

    /// Borrow the next `len` bytes and advance past them
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], MidiError> {
        if len > self.remaining() {
            return Err(self.truncated(len));
        }
        let bytes = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), MidiError> {
        self.read_bytes(len).map(|_| ())
    }

    fn truncated(&self, wanted: usize) -> MidiError {
        MidiError::Truncated {
            offset: self.position(),
            wanted,
            remaining: self.remaining(),
        }
    }
}
