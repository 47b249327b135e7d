//! Function signatures decoded from `DefineFunction` and `DefineFunction2`.

use crate::action_buffer::{action_code, ActionBuffer, CodeRange};
use crate::error::BytecodeError;
use crate::reader::ByteReader;
use core_types::AvmString;
use std::fmt;
use std::ops::BitOr;

/// Preload and suppress bits of a `DefineFunction2` header.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Function2Flags(u16);

impl Function2Flags {
    /// Put `this` in a register.
    pub const PRELOAD_THIS: Function2Flags = Function2Flags(0x0001);
    /// Do not make `this` available.
    pub const SUPPRESS_THIS: Function2Flags = Function2Flags(0x0002);
    /// Put `arguments` in a register.
    pub const PRELOAD_ARGUMENTS: Function2Flags = Function2Flags(0x0004);
    /// Do not make `arguments` available.
    pub const SUPPRESS_ARGUMENTS: Function2Flags = Function2Flags(0x0008);
    /// Put `super` in a register.
    pub const PRELOAD_SUPER: Function2Flags = Function2Flags(0x0010);
    /// Do not make `super` available.
    pub const SUPPRESS_SUPER: Function2Flags = Function2Flags(0x0020);
    /// Put `_root` in a register.
    pub const PRELOAD_ROOT: Function2Flags = Function2Flags(0x0040);
    /// Put `_parent` in a register.
    pub const PRELOAD_PARENT: Function2Flags = Function2Flags(0x0080);
    /// Put `_global` in a register.
    pub const PRELOAD_GLOBAL: Function2Flags = Function2Flags(0x0100);

    /// No flags set.
    pub const fn empty() -> Self {
        Function2Flags(0)
    }

    /// Builds flags from the raw header field.
    pub const fn from_bits(bits: u16) -> Self {
        Function2Flags(bits)
    }

    /// Raw header field.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether all bits of `other` are set.
    pub const fn contains(self, other: Function2Flags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Function2Flags {
    type Output = Function2Flags;

    fn bitor(self, rhs: Function2Flags) -> Function2Flags {
        Function2Flags(self.0 | rhs.0)
    }
}

impl fmt::Debug for Function2Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function2Flags({:#06x})", self.0)
    }
}

/// Where an argument is bound when the function is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// Bound as a local variable of this name.
    Named(AvmString),
    /// Bound directly into this register (never 0).
    Register(u8),
}

/// Calling convention of a user function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Arguments and implicit values are locals.
    Conventional,
    /// Registers with preload and suppress flags.
    Function2(Function2Flags),
}

/// Declared shape of a user function.
///
/// # Example
///
/// ```
/// use bytecode_system::{Dialect, Function2Flags, FunctionSignature, Param};
///
/// let sig = FunctionSignature::function2(
///     Some("f".into()),
///     vec![Param::Register(3), Param::Named("b".into())],
///     4,
///     Function2Flags::PRELOAD_THIS,
/// );
/// assert_eq!(sig.register_count(), 4);
/// assert!(matches!(sig.dialect(), Dialect::Function2(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    name: Option<AvmString>,
    params: Vec<Param>,
    register_count: u8,
    dialect: Dialect,
}

impl FunctionSignature {
    /// Signature of a conventional function; every parameter is named.
    pub fn conventional(name: Option<AvmString>, params: Vec<AvmString>) -> Self {
        Self {
            name,
            params: params.into_iter().map(Param::Named).collect(),
            register_count: 0,
            dialect: Dialect::Conventional,
        }
    }

    /// Signature of a register-based function.
    ///
    /// # Arguments
    ///
    /// * `name` - Function name, `None` for anonymous functions
    /// * `params` - Parameters in declaration order
    /// * `register_count` - Size of the function's register file
    /// * `flags` - Preload and suppress bits
    pub fn function2(
        name: Option<AvmString>,
        params: Vec<Param>,
        register_count: u8,
        flags: Function2Flags,
    ) -> Self {
        Self {
            name,
            params,
            register_count,
            dialect: Dialect::Function2(flags),
        }
    }

    /// Function name, if any.
    pub fn name(&self) -> Option<&AvmString> {
        self.name.as_ref()
    }

    /// Declared parameters.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Number of local registers; 0 for conventional functions.
    pub fn register_count(&self) -> u8 {
        self.register_count
    }

    /// Calling convention.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Decodes a `DefineFunction` or `DefineFunction2` action at `pc`.
    ///
    /// # Returns
    ///
    /// The signature and the range holding the function body, which
    /// directly follows the defining action.
    pub fn read(buffer: &ActionBuffer, pc: usize) -> Result<(Self, CodeRange), BytecodeError> {
        let record = buffer.action_at(pc)?;
        if record.code != action_code::DEFINE_FUNCTION
            && record.code != action_code::DEFINE_FUNCTION2
        {
            return Err(BytecodeError::WrongAction {
                expected: action_code::DEFINE_FUNCTION,
                found: record.code,
            });
        }
        let mut reader = ByteReader::new(buffer.payload(&record));

        let name = reader.read_string()?;
        let name = if name.is_empty() { None } else { Some(name) };
        let param_count = reader.read_u16()?;

        let signature = match record.code {
            action_code::DEFINE_FUNCTION => {
                let mut params = Vec::with_capacity(param_count as usize);
                for _ in 0..param_count {
                    params.push(reader.read_string()?);
                }
                Self::conventional(name, params)
            }
            _ => {
                let register_count = reader.read_u8()?;
                let flags = Function2Flags::from_bits(reader.read_u16()?);
                let mut params = Vec::with_capacity(param_count as usize);
                for _ in 0..param_count {
                    let register = reader.read_u8()?;
                    let param_name = reader.read_string()?;
                    params.push(if register == 0 {
                        Param::Named(param_name)
                    } else {
                        Param::Register(register)
                    });
                }
                Self::function2(name, params, register_count, flags)
            }
        };

        let body_len = reader.read_u16()? as usize;
        let body = CodeRange::new(buffer.clone(), record.next_pc(), body_len)?;
        Ok((signature, body))
    }
}
