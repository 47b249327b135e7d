//! Action buffers and the code ranges that point into them.

use crate::error::BytecodeError;
use crate::reader::ByteReader;
use std::rc::Rc;

/// Action codes the core needs to recognise.
pub mod action_code {
    /// Terminates a block.
    pub const END: u8 = 0x00;
    /// Declares the string table for `Push` constant references.
    pub const CONSTANT_POOL: u8 = 0x88;
    /// Defines a function with registers and preload flags.
    pub const DEFINE_FUNCTION2: u8 = 0x8E;
    /// Defines a conventional function.
    pub const DEFINE_FUNCTION: u8 = 0x9B;
}

/// Immutable, shared block of action bytes.
///
/// Function objects keep a clone of the buffer their body lives in, so the
/// bytes stay alive as long as any function defined in them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBuffer {
    bytes: Rc<[u8]>,
}

impl ActionBuffer {
    /// Wraps raw action bytes.
    pub fn new(bytes: impl Into<Rc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// All bytes of the buffer.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decodes the action record starting at `pc`.
    ///
    /// Codes below `0x80` carry no payload; the rest are followed by a
    /// 16-bit payload length.
    ///
    /// # Arguments
    ///
    /// * `pc` - Offset of the action code byte
    pub fn action_at(&self, pc: usize) -> Result<ActionRecord, BytecodeError> {
        let code = *self
            .bytes
            .get(pc)
            .ok_or(BytecodeError::UnexpectedEnd { offset: pc })?;
        if code < 0x80 {
            return Ok(ActionRecord {
                code,
                payload_start: pc + 1,
                payload_len: 0,
            });
        }

        let mut reader = ByteReader::new(&self.bytes[pc + 1..]);
        let payload_len = reader
            .read_u16()
            .map_err(|_| BytecodeError::UnexpectedEnd { offset: pc + 1 })?
            as usize;
        let payload_start = pc + 3;
        if payload_start + payload_len > self.bytes.len() {
            return Err(BytecodeError::UnexpectedEnd {
                offset: payload_start,
            });
        }
        Ok(ActionRecord {
            code,
            payload_start,
            payload_len,
        })
    }

    /// Payload bytes of a decoded record.
    pub fn payload(&self, record: &ActionRecord) -> &[u8] {
        &self.bytes[record.payload_start..record.payload_start + record.payload_len]
    }
}

/// Location of one action inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRecord {
    /// Action code
    pub code: u8,
    /// Offset of the first payload byte
    pub payload_start: usize,
    /// Payload size in bytes
    pub payload_len: usize,
}

impl ActionRecord {
    /// Offset of the action following this one.
    pub fn next_pc(&self) -> usize {
        self.payload_start + self.payload_len
    }
}

/// A validated byte range of an [`ActionBuffer`], such as a function body.
///
/// # Example
///
/// ```
/// use bytecode_system::{ActionBuffer, CodeRange};
///
/// let buffer = ActionBuffer::new(vec![0x07, 0x00]);
/// let body = CodeRange::new(buffer.clone(), 0, 2).unwrap();
/// assert_eq!(body.bytes(), &[0x07, 0x00]);
/// assert!(CodeRange::new(buffer, 1, 5).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRange {
    buffer: ActionBuffer,
    start: usize,
    len: usize,
}

impl CodeRange {
    /// Builds a range, rejecting one that runs past the buffer.
    pub fn new(buffer: ActionBuffer, start: usize, len: usize) -> Result<Self, BytecodeError> {
        match start.checked_add(len) {
            Some(end) if end <= buffer.len() => Ok(Self { buffer, start, len }),
            _ => Err(BytecodeError::RangeOutOfBounds {
                start,
                len,
                buffer_len: buffer.len(),
            }),
        }
    }

    /// Range covering a whole buffer.
    pub fn whole(buffer: ActionBuffer) -> Self {
        let len = buffer.len();
        Self {
            buffer,
            start: 0,
            len,
        }
    }

    /// Buffer the range points into.
    pub fn buffer(&self) -> &ActionBuffer {
        &self.buffer
    }

    /// Offset of the first byte.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Offset one past the last byte.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bytes inside the range.
    pub fn bytes(&self) -> &[u8] {
        &self.buffer.bytes()[self.start..self.end()]
    }
}
