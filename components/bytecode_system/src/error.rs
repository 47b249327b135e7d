//! Decoding errors for action records.

use thiserror::Error;

/// Failure to decode part of an action buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BytecodeError {
    /// A read ran past the end of the available bytes.
    #[error("unexpected end of action data at offset {offset}")]
    UnexpectedEnd {
        /// Offset the read started at
        offset: usize,
    },

    /// A string was not null-terminated inside its record.
    #[error("unterminated string at offset {offset}")]
    UnterminatedString {
        /// Offset the string started at
        offset: usize,
    },

    /// A code range does not fit in its buffer.
    #[error("code range {start}+{len} exceeds buffer of {buffer_len} bytes")]
    RangeOutOfBounds {
        /// First byte of the range
        start: usize,
        /// Length of the range
        len: usize,
        /// Size of the buffer
        buffer_len: usize,
    },

    /// A record carried an action code other than the one expected.
    #[error("expected action 0x{expected:02X}, found 0x{found:02X}")]
    WrongAction {
        /// Code the decoder was asked to read
        expected: u8,
        /// Code found in the buffer
        found: u8,
    },
}
