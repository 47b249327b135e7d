//! Action bytecode containers for the AVM1 interpreter
//!
//! This crate holds the pieces of SWF action data the interpreter core
//! reasons about without executing them:
//!
//! - [`ActionBuffer`] and [`CodeRange`] - shared action bytes and validated
//!   slices of them, such as function bodies
//! - [`ConstantPool`] - the string table declared by `ConstantPool`
//! - [`FunctionSignature`] - parameters, register count and
//!   [`Function2Flags`] decoded from `DefineFunction`/`DefineFunction2`
//!
//! # Example
//!
//! ```
//! use bytecode_system::{ActionBuffer, ConstantPool};
//!
//! let buffer = ActionBuffer::new(vec![0x88, 0x05, 0x00, 0x01, 0x00, b'h', b'i', 0x00]);
//! let pool = ConstantPool::read(&buffer, 0).unwrap();
//! assert_eq!(pool.get(0).as_deref(), Some("hi"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod action_buffer;
pub mod constant_pool;
pub mod error;
pub mod reader;
pub mod signature;

// Re-export main types at crate root
pub use action_buffer::{action_code, ActionBuffer, ActionRecord, CodeRange};
pub use constant_pool::ConstantPool;
pub use error::BytecodeError;
pub use reader::ByteReader;
pub use signature::{Dialect, Function2Flags, FunctionSignature, Param};
