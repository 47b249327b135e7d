//! Arithmetic, comparison and equality as the action dispatcher sees them.
//!
//! Operand order matters: conversions may run script, so each operator
//! converts its operands in the order the player does.

use crate::Interpreter;
use core_types::{AvmError, AvmResult, PrimitiveHint, Value};
use std::rc::Rc;

impl Interpreter {
    /// Primitive conversion that keeps the original value on a type error.
    fn primitive_or_self(&mut self, value: &Value, hint: Option<PrimitiveHint>) -> AvmResult<Value> {
        let result = match hint {
            Some(hint) => self.to_primitive(value, hint),
            None => self.to_primitive_default(value),
        };
        match result {
            Ok(prim) => Ok(prim),
            Err(AvmError::TypeError(msg)) => {
                action_trace!(self, "primitive conversion failed: {}", msg);
                Ok(value.clone())
            }
            Err(err) => Err(err),
        }
    }

    /// `a + b`.
    ///
    /// `b` is converted to a primitive before `a`. If either result is a
    /// string the operands are concatenated, otherwise added as numbers.
    pub fn add(&mut self, a: &Value, b: &Value) -> AvmResult<Value> {
        let b = self.primitive_or_self(b, None)?;
        let a = self.primitive_or_self(a, None)?;

        if a.is_string() || b.is_string() {
            let left = self.to_string(&a)?;
            let right = self.to_string(&b)?;
            let mut joined = String::with_capacity(left.len() + right.len());
            joined.push_str(&left);
            joined.push_str(&right);
            return Ok(Value::String(Rc::from(joined)));
        }

        let left = self.to_number(&a)?;
        let right = self.to_number(&b)?;
        Ok(Value::Number(left + right))
    }

    /// `a - b`.
    pub fn subtract(&mut self, a: &Value, b: &Value) -> AvmResult<Value> {
        let left = self.to_number(a)?;
        let right = self.to_number(b)?;
        Ok(Value::Number(left - right))
    }

    /// `a * b`.
    pub fn multiply(&mut self, a: &Value, b: &Value) -> AvmResult<Value> {
        let left = self.to_number(a)?;
        let right = self.to_number(b)?;
        Ok(Value::Number(left * right))
    }

    /// `a / b` with IEEE results for zero divisors.
    pub fn divide(&mut self, a: &Value, b: &Value) -> AvmResult<Value> {
        let left = self.to_number(a)?;
        let right = self.to_number(b)?;
        Ok(Value::Number(left / right))
    }

    /// `a % b`, with the sign of the dividend.
    pub fn modulo(&mut self, a: &Value, b: &Value) -> AvmResult<Value> {
        let left = self.to_number(a)?;
        let right = self.to_number(b)?;
        Ok(Value::Number(left % right))
    }

    /// `a < b`.
    ///
    /// Both operands are converted with the number hint, `a` first. An
    /// operand that is still an object makes the result `false`. Two
    /// strings compare by code unit, except that the empty string is never
    /// less than anything and everything else is less than it. NaN on
    /// either side gives `undefined`.
    pub fn less_than(&mut self, a: &Value, b: &Value) -> AvmResult<Value> {
        let a = self.primitive_or_self(a, Some(PrimitiveHint::Number))?;
        if a.is_object() {
            return Ok(Value::Boolean(false));
        }
        let b = self.primitive_or_self(b, Some(PrimitiveHint::Number))?;
        if b.is_object() {
            return Ok(Value::Boolean(false));
        }

        if let (Value::String(x), Value::String(y)) = (&a, &b) {
            return Ok(Value::Boolean(string_less_than(x, y)));
        }

        let x = self.to_number(&a)?;
        let y = self.to_number(&b)?;
        if x.is_nan() || y.is_nan() {
            return Ok(Value::Undefined);
        }
        Ok(Value::Boolean(x < y))
    }

    /// `a > b`, evaluated as `b < a`.
    pub fn greater_than(&mut self, a: &Value, b: &Value) -> AvmResult<Value> {
        self.less_than(b, a)
    }

    /// Abstract equality (`==`).
    pub fn equals(&mut self, a: &Value, b: &Value) -> AvmResult<bool> {
        let version = self.swf_version();
        let a_null = a.is_nullish() || (version < 6 && self.is_function_value(a));
        let b_null = b.is_nullish() || (version < 6 && self.is_function_value(b));
        if a_null || b_null {
            return Ok(a_null == b_null);
        }

        match (a, b) {
            (Value::Object(x), Value::Object(y)) => Ok(x == y),
            (Value::Number(_), Value::String(_)) => {
                let n = self.to_number(b)?;
                Ok(n.is_finite() && same_number(a.as_number().unwrap_or(f64::NAN), n))
            }
            (Value::String(_), Value::Number(_)) => {
                let n = self.to_number(a)?;
                Ok(n.is_finite() && same_number(n, b.as_number().unwrap_or(f64::NAN)))
            }
            _ if std::mem::discriminant(a) == std::mem::discriminant(b) => {
                Ok(strict_equals(a, b))
            }
            (Value::Boolean(_), _) => {
                let n = Value::Number(self.to_number(a)?);
                self.equals(&n, b)
            }
            (_, Value::Boolean(_)) => {
                let n = Value::Number(self.to_number(b)?);
                self.equals(a, &n)
            }
            (_, Value::Object(_)) => self.equals_converted(a, b, false),
            (Value::Object(_), _) => self.equals_converted(b, a, true),
            _ => Ok(false),
        }
    }

    /// Compares primitive `prim` against object `obj` after converting the
    /// object; `swapped` keeps the original operand order on recursion.
    fn equals_converted(&mut self, prim: &Value, obj: &Value, swapped: bool) -> AvmResult<bool> {
        let converted = match self.to_primitive_default(obj) {
            Ok(v) => v,
            Err(AvmError::TypeError(_)) => return Ok(false),
            Err(err) => return Err(err),
        };
        if strict_equals(obj, &converted) {
            return Ok(false);
        }
        if swapped {
            self.equals(&converted, prim)
        } else {
            self.equals(prim, &converted)
        }
    }

    fn is_function_value(&self, value: &Value) -> bool {
        value
            .as_object()
            .and_then(|id| self.objects.get(id))
            .is_some_and(|o| o.is_function())
    }

    /// Converts both operands with [`to_int`](Self::to_int), `a` first.
    fn int_operands(&mut self, a: &Value, b: &Value) -> AvmResult<(i32, i32)> {
        let x = self.to_int(a)?;
        let y = self.to_int(b)?;
        Ok((x, y))
    }

    /// `a & b`.
    pub fn bit_and(&mut self, a: &Value, b: &Value) -> AvmResult<Value> {
        let (x, y) = self.int_operands(a, b)?;
        Ok(Value::from(x & y))
    }

    /// `a | b`.
    pub fn bit_or(&mut self, a: &Value, b: &Value) -> AvmResult<Value> {
        let (x, y) = self.int_operands(a, b)?;
        Ok(Value::from(x | y))
    }

    /// `a ^ b`.
    pub fn bit_xor(&mut self, a: &Value, b: &Value) -> AvmResult<Value> {
        let (x, y) = self.int_operands(a, b)?;
        Ok(Value::from(x ^ y))
    }

    /// `a << b`; the shift count uses its low five bits.
    pub fn shift_left(&mut self, a: &Value, b: &Value) -> AvmResult<Value> {
        let (x, y) = self.int_operands(a, b)?;
        Ok(Value::from(x.wrapping_shl(y as u32 & 31)))
    }

    /// `a >> b`, sign-propagating.
    pub fn shift_right(&mut self, a: &Value, b: &Value) -> AvmResult<Value> {
        let (x, y) = self.int_operands(a, b)?;
        Ok(Value::from(x.wrapping_shr(y as u32 & 31)))
    }

    /// `a >>> b`, zero-filling.
    pub fn shift_right_unsigned(&mut self, a: &Value, b: &Value) -> AvmResult<Value> {
        let (x, y) = self.int_operands(a, b)?;
        Ok(Value::from((x as u32).wrapping_shr(y as u32 & 31)))
    }

    /// `typeof v` as a string value.
    pub fn type_of_value(&self, value: &Value) -> Value {
        Value::from(self.type_of(value))
    }
}

/// Strict equality (`===`): same type and same value.
///
/// NaN equals NaN and the two zeros are equal.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => same_number(*x, *y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => x == y,
        _ => false,
    }
}

fn same_number(x: f64, y: f64) -> bool {
    (x.is_nan() && y.is_nan()) || x == y
}

/// String ordering used by `<` when both sides are strings.
pub fn string_less_than(a: &str, b: &str) -> bool {
    if a.is_empty() {
        return false;
    }
    if b.is_empty() {
        return true;
    }
    a < b
}
