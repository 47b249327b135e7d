//! Little-endian cursor over action payloads.

use crate::error::BytecodeError;
use core_types::AvmString;
use std::rc::Rc;

/// Cursor reading the primitive encodings used by action records.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Starts reading at the beginning of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current offset into the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Reads one byte.
    pub fn read_u8(&mut self) -> Result<u8, BytecodeError> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or(BytecodeError::UnexpectedEnd { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16, BytecodeError> {
        let end = self.pos + 2;
        let raw = self
            .bytes
            .get(self.pos..end)
            .ok_or(BytecodeError::UnexpectedEnd { offset: self.pos })?;
        self.pos = end;
        Ok(u16::from_le_bytes([raw[0], raw[1]]))
    }

    /// Reads a null-terminated string.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, since older movies
    /// store strings in the author's locale encoding.
    pub fn read_string(&mut self) -> Result<AvmString, BytecodeError> {
        let start = self.pos;
        let rest = &self.bytes[start..];
        let len = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(BytecodeError::UnterminatedString { offset: start })?;
        self.pos = start + len + 1;
        Ok(Rc::from(String::from_utf8_lossy(&rest[..len]).as_ref()))
    }
}
