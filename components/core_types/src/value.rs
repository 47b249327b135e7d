//! AVM1 value representation.
//!
//! A [`Value`] is either a primitive or a handle to a heap object.
//! Conversions that never need to look inside an object live here;
//! the ones that may call into script (`valueOf`, `toString`) are
//! provided by the interpreter.

use crate::number::{number_to_string, string_to_number};
use crate::ObjectId;
use std::fmt;
use std::rc::Rc;

/// Immutable, cheaply clonable string used for script strings.
pub type AvmString = Rc<str>;

/// Any value a script can hold.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let n = Value::from(42.0);
/// assert_eq!(n.type_name(), "number");
/// assert!(n.to_bool(7));
/// assert!(!Value::from("").to_bool(7));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The undefined value
    #[default]
    Undefined,
    /// The null value
    Null,
    /// A boolean
    Boolean(bool),
    /// An IEEE-754 double
    Number(f64),
    /// An immutable string
    String(AvmString),
    /// A heap object, function or display object wrapper
    Object(ObjectId),
}

/// Which primitive `to_primitive` should prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveHint {
    /// Try `valueOf`
    Number,
    /// Try `toString`, then `valueOf`
    String,
}

impl Value {
    /// Whether the value is `undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Whether the value is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value is `undefined` or `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Whether the value is a string.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Whether the value is a number.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Whether the value is an object reference.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Whether the value is a primitive.
    pub fn is_primitive(&self) -> bool {
        !self.is_object()
    }

    /// The object handle, if this is an object.
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// The number, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The string, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Primitive type name as reported by `typeof` for non-objects.
    ///
    /// Objects report `"object"` here. The interpreter refines this to
    /// `"function"` and `"movieclip"` since only it can see the target.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
        }
    }

    /// Converts to a boolean.
    ///
    /// Strings are truthy when non-empty from SWF7 on. Older versions
    /// convert the string to a number first, so `"0"` and `"abc"` are
    /// false there. SWF6 treats infinite numbers as false. Objects are
    /// always true.
    ///
    /// # Arguments
    ///
    /// * `version` - SWF version of the running code
    pub fn to_bool(&self, version: u8) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) if version == 6 => n.is_finite() && *n != 0.0,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => {
                if version >= 7 {
                    !s.is_empty()
                } else {
                    let n = string_to_number(s, version);
                    n != 0.0 && !n.is_nan()
                }
            }
            Value::Object(_) => true,
        }
    }

    /// Converts a primitive to a number.
    ///
    /// `undefined` and `null` are NaN from SWF5 on and `0` before.
    /// Objects yield NaN; the interpreter resolves them through
    /// `valueOf` before getting here.
    pub fn primitive_to_number(&self, version: u8) -> f64 {
        match self {
            Value::Undefined | Value::Null => {
                if version >= 5 {
                    f64::NAN
                } else {
                    0.0
                }
            }
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s, version),
            Value::Object(_) => f64::NAN,
        }
    }

    /// Converts a primitive to a string.
    ///
    /// `undefined` is the empty string up to SWF6. Objects yield
    /// `"[type Object]"`; the interpreter resolves them through
    /// `toString` before getting here.
    pub fn primitive_to_string(&self, version: u8) -> AvmString {
        match self {
            Value::Undefined => {
                if version <= 6 {
                    Rc::from("")
                } else {
                    Rc::from("undefined")
                }
            }
            Value::Null => Rc::from("null"),
            Value::Boolean(b) => Rc::from(if *b { "true" } else { "false" }),
            Value::Number(n) => Rc::from(number_to_string(*n)),
            Value::String(s) => Rc::clone(s),
            Value::Object(_) => Rc::from("[type Object]"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Object(id) => write!(f, "[object {}]", id),
            other => f.write_str(&other.primitive_to_string(u8::MAX)),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<AvmString> for Value {
    fn from(s: AvmString) -> Self {
        Value::String(s)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Object(id)
    }
}

impl From<Option<ObjectId>> for Value {
    fn from(id: Option<ObjectId>) -> Self {
        match id {
            Some(id) => Value::Object(id),
            None => Value::Null,
        }
    }
}
