//! String table declared by the `ConstantPool` action.

use crate::action_buffer::{action_code, ActionBuffer};
use crate::error::BytecodeError;
use crate::reader::ByteReader;
use core_types::AvmString;

/// Ordered strings referenced by index from `Push` actions.
///
/// # Example
///
/// ```
/// use bytecode_system::ConstantPool;
///
/// let pool = ConstantPool::from_payload(&[2, 0, b'a', 0, b'b', b'c', 0]).unwrap();
/// assert_eq!(pool.get(1).as_deref(), Some("bc"));
/// assert!(pool.get(2).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantPool {
    entries: Vec<AvmString>,
}

impl ConstantPool {
    /// Creates a pool from already decoded strings.
    pub fn new(entries: Vec<AvmString>) -> Self {
        Self { entries }
    }

    /// Decodes the payload of a `ConstantPool` action: a 16-bit count
    /// followed by that many null-terminated strings.
    pub fn from_payload(payload: &[u8]) -> Result<Self, BytecodeError> {
        let mut reader = ByteReader::new(payload);
        let count = reader.read_u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(reader.read_string()?);
        }
        Ok(Self { entries })
    }

    /// Decodes the `ConstantPool` action at `pc`.
    pub fn read(buffer: &ActionBuffer, pc: usize) -> Result<Self, BytecodeError> {
        let record = buffer.action_at(pc)?;
        if record.code != action_code::CONSTANT_POOL {
            return Err(BytecodeError::WrongAction {
                expected: action_code::CONSTANT_POOL,
                found: record.code,
            });
        }
        Self::from_payload(buffer.payload(&record))
    }

    /// Entry at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<AvmString> {
        self.entries.get(index).cloned()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
