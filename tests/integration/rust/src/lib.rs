//! Integration test suite for the AVM1 interpreter core
//!
//! This crate verifies that components work together across crate
//! boundaries. [`MiniDispatcher`] runs a handful of real actions so that
//! tests can drive user functions from encoded bytecode.

use bytecode_system::{ActionBuffer, ByteReader, BytecodeError, CodeRange, ConstantPool};
use core_types::{AvmError, AvmResult, Value};
use interpreter::{ActionExecutor, Activation, Interpreter};
use std::rc::Rc;

/// Re-export components for test convenience
pub mod components {
    pub use bytecode_system;
    pub use core_types;
    pub use interpreter;
    pub use memory_manager;
}

/// Action codes understood by [`MiniDispatcher`].
pub mod op {
    /// End of actions
    pub const END: u8 = 0x00;
    /// Pop a name, push its value
    pub const GET_VARIABLE: u8 = 0x1C;
    /// Pop a value and a name, assign
    pub const SET_VARIABLE: u8 = 0x1D;
    /// Pop and return
    pub const RETURN: u8 = 0x3E;
    /// Version-aware addition
    pub const ADD2: u8 = 0x47;
    /// Declare the constant pool
    pub const CONSTANT_POOL: u8 = 0x88;
    /// Push literals
    pub const PUSH: u8 = 0x96;
}

/// Executor covering just enough actions for cross-crate tests.
#[derive(Debug, Default)]
pub struct MiniDispatcher;

fn decode_error(err: BytecodeError) -> AvmError {
    AvmError::TypeError(err.to_string())
}

impl MiniDispatcher {
    fn push_literals(interp: &mut Interpreter, payload: &[u8]) -> Result<(), BytecodeError> {
        let mut reader = ByteReader::new(payload);
        while reader.remaining() > 0 {
            let value = match reader.read_u8()? {
                0 => Value::String(reader.read_string()?),
                1 => {
                    let lo = reader.read_u16()? as u32;
                    let hi = reader.read_u16()? as u32;
                    Value::from(f32::from_bits(lo | (hi << 16)) as f64)
                }
                2 => Value::Null,
                3 => Value::Undefined,
                4 => {
                    let register = reader.read_u8()? as usize;
                    interp.get_register(register).unwrap_or(Value::Undefined)
                }
                5 => Value::from(reader.read_u8()? != 0),
                8 => {
                    let index = reader.read_u8()? as usize;
                    interp.constant(index)
                }
                _ => Value::Undefined,
            };
            interp.push(value);
        }
        Ok(())
    }
}

impl ActionExecutor for MiniDispatcher {
    fn execute(&self, interp: &mut Interpreter, activation: &Activation) -> AvmResult<Value> {
        let code: &CodeRange = &activation.code;
        let buffer: &ActionBuffer = code.buffer();
        let mut pc = code.start();
        while pc < code.end() {
            let record = buffer.action_at(pc).map_err(decode_error)?;
            match record.code {
                op::END => break,
                op::PUSH => {
                    Self::push_literals(interp, buffer.payload(&record)).map_err(decode_error)?
                }
                op::ADD2 => {
                    let b = interp.pop();
                    let a = interp.pop();
                    let sum = interp.add(&a, &b)?;
                    interp.push(sum);
                }
                op::GET_VARIABLE => {
                    let name = interp.pop();
                    let name = interp.to_string(&name)?;
                    let value = interp.get_variable(&name)?;
                    interp.push(value);
                }
                op::SET_VARIABLE => {
                    let value = interp.pop();
                    let name = interp.pop();
                    let name = interp.to_string(&name)?;
                    interp.set_variable(&name, value)?;
                }
                op::RETURN => return Ok(interp.pop()),
                op::CONSTANT_POOL => {
                    let pool = ConstantPool::read(buffer, pc).map_err(decode_error)?;
                    interp.set_constant_pool(Rc::new(pool));
                }
                _ => {}
            }
            pc = record.next_pc();
        }
        Ok(Value::Undefined)
    }
}

/// Appends one action with its payload.
pub fn emit(bytes: &mut Vec<u8>, code: u8, payload: &[u8]) {
    bytes.push(code);
    if code >= 0x80 {
        bytes.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        bytes.extend_from_slice(payload);
    }
}

/// `Push` payload for a string literal.
pub fn push_string(s: &str) -> Vec<u8> {
    let mut payload = vec![0];
    payload.extend_from_slice(s.as_bytes());
    payload.push(0);
    payload
}

/// `Push` payload for a number literal.
pub fn push_number(n: f32) -> Vec<u8> {
    let mut payload = vec![1];
    payload.extend_from_slice(&n.to_bits().to_le_bytes());
    payload
}
