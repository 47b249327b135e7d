//! Conversions that may call into script.
//!
//! Primitive-only conversions live on [`Value`]. Everything here can run
//! `valueOf` or `toString` and therefore needs the interpreter.

use crate::object::{Object, Relay};
use crate::property::{Binding, Property};
use crate::string_table::{names, StringKey};
use crate::Interpreter;
use core_types::{
    to_int32, AvmError, AvmResult, AvmString, ObjectId, PrimitiveHint, PropFlags, Value,
};
use std::rc::Rc;

impl Interpreter {
    /// Hint used when an operator asks for "some" primitive.
    ///
    /// Dates prefer strings from SWF6 on; everything else prefers numbers.
    pub fn default_hint(&self, obj: ObjectId) -> PrimitiveHint {
        let is_date = self
            .objects
            .get(obj)
            .is_some_and(|o| matches!(o.relay, Some(Relay::Date(_))));
        if is_date && self.swf_version() > 5 {
            PrimitiveHint::String
        } else {
            PrimitiveHint::Number
        }
    }

    /// Converts `value` to a primitive.
    ///
    /// Primitives are returned unchanged. For objects, the number hint
    /// calls `valueOf` and yields `undefined` when there is none; the
    /// string hint calls `toString`, falling back to `valueOf`. Display
    /// objects never run script: they convert to NaN or their target path.
    ///
    /// # Errors
    ///
    /// [`AvmError::TypeError`] when no usable method exists for the string
    /// hint or the method returns another object. Errors raised by the
    /// method itself propagate.
    pub fn to_primitive(&mut self, value: &Value, hint: PrimitiveHint) -> AvmResult<Value> {
        let Value::Object(obj) = value else {
            return Ok(value.clone());
        };
        let obj = *obj;

        if let Some(Object {
            relay: Some(Relay::DisplayObject { target }),
            ..
        }) = self.objects.get(obj)
        {
            return Ok(match hint {
                PrimitiveHint::Number => Value::Number(f64::NAN),
                PrimitiveHint::String => Value::String(Rc::clone(target)),
            });
        }

        let method = match hint {
            PrimitiveHint::Number => match self.callable_member(obj, names::VALUE_OF)? {
                Some(method) => method,
                None => return Ok(Value::Undefined),
            },
            PrimitiveHint::String => {
                let to_string = self.callable_member(obj, names::TO_STRING)?;
                let method = match to_string {
                    Some(method) => Some(method),
                    None => self.callable_member(obj, names::VALUE_OF)?,
                };
                match method {
                    Some(method) => method,
                    None => {
                        return Err(AvmError::TypeError(
                            "object has neither toString nor valueOf".to_string(),
                        ))
                    }
                }
            }
        };

        let result = self.call_function(method, Some(obj), Vec::new())?;
        if result.is_object() {
            return Err(AvmError::TypeError(
                "conversion method returned an object".to_string(),
            ));
        }
        Ok(result)
    }

    /// [`to_primitive`](Self::to_primitive) with the [default
    /// hint](Self::default_hint).
    pub fn to_primitive_default(&mut self, value: &Value) -> AvmResult<Value> {
        match value {
            Value::Object(obj) => {
                let hint = self.default_hint(*obj);
                self.to_primitive(value, hint)
            }
            other => Ok(other.clone()),
        }
    }

    /// Member `name` of `obj` if it is a callable object.
    fn callable_member(&mut self, obj: ObjectId, name: StringKey) -> AvmResult<Option<ObjectId>> {
        let key = self.key_of(name);
        let Some(Value::Object(method)) = self.get_member(obj, &key)? else {
            return Ok(None);
        };
        let callable = self.objects.get(method).is_some_and(Object::is_callable);
        Ok(callable.then_some(method))
    }

    /// Converts to a boolean for the running version.
    pub fn to_boolean(&self, value: &Value) -> bool {
        value.to_bool(self.swf_version())
    }

    /// Converts to a number for the running version.
    ///
    /// Objects go through `valueOf`. When that fails the result is NaN,
    /// except for functions before SWF6, which convert to 0.
    pub fn to_number(&mut self, value: &Value) -> AvmResult<f64> {
        let version = self.swf_version();
        let Value::Object(obj) = value else {
            return Ok(value.primitive_to_number(version));
        };
        match self.to_primitive(value, PrimitiveHint::Number) {
            Ok(prim) => Ok(prim.primitive_to_number(version)),
            Err(AvmError::TypeError(msg)) => {
                coding_error!(self, "to_number: {}", msg);
                let is_function = self.objects.get(*obj).is_some_and(Object::is_function);
                if is_function && version < 6 {
                    Ok(0.0)
                } else {
                    Ok(f64::NAN)
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Converts to a string for the running version.
    ///
    /// Objects go through `toString`. Only a string result is accepted;
    /// anything else gives `[type Object]` or `[type Function]`.
    pub fn to_string(&mut self, value: &Value) -> AvmResult<AvmString> {
        let version = self.swf_version();
        let Value::Object(obj) = value else {
            return Ok(value.primitive_to_string(version));
        };
        let obj = *obj;
        match self.to_primitive(value, PrimitiveHint::String) {
            Ok(Value::String(s)) => return Ok(s),
            Ok(_) => {}
            Err(AvmError::TypeError(msg)) => {
                coding_error!(self, "to_string: {}", msg);
            }
            Err(err) => return Err(err),
        }
        let is_function = self.objects.get(obj).is_some_and(Object::is_function);
        Ok(Rc::from(if is_function {
            "[type Function]"
        } else {
            "[type Object]"
        }))
    }

    /// Converts to a number, then to a 32-bit integer. Non-finite values
    /// become 0.
    pub fn to_int(&mut self, value: &Value) -> AvmResult<i32> {
        let n = self.to_number(value)?;
        Ok(to_int32(n))
    }

    /// Wraps a primitive in its class instance.
    ///
    /// Objects are returned as they are. `undefined` and `null` have no
    /// object form. The wrapper's prototype is `_global.<Class>.prototype`
    /// when that class is installed, `Object.prototype` otherwise.
    pub fn to_object(&mut self, value: &Value) -> AvmResult<Option<ObjectId>> {
        let (class, relay) = match value {
            Value::Object(obj) => return Ok(Some(*obj)),
            Value::Undefined | Value::Null => return Ok(None),
            Value::Boolean(b) => (names::BOOLEAN, Relay::Boolean(*b)),
            Value::Number(n) => (names::NUMBER, Relay::Number(*n)),
            Value::String(s) => (names::STRING, Relay::String(Rc::clone(s))),
        };
        let proto = self.class_prototype(class)?;
        let mut wrapper = Object::new(Some(proto));
        wrapper.relay = Some(relay);
        if let Value::String(s) = value {
            let len_key = self.key_of(names::LENGTH);
            let case_sensitive = self.case_sensitive();
            wrapper.properties.insert(
                Property::new(
                    len_key,
                    Binding::Value(Value::from(s.chars().count())),
                    PropFlags::NATIVE_DEFAULT,
                ),
                case_sensitive,
            );
        }
        Ok(Some(self.alloc(wrapper)))
    }

    /// `_global.<class>.prototype`, or `Object.prototype` if missing.
    fn class_prototype(&mut self, class: StringKey) -> AvmResult<ObjectId> {
        let global = self.global;
        let ctor = self.get_by_key(global, class)?;
        if let Value::Object(ctor) = ctor {
            if let Value::Object(proto) = self.get_by_key(ctor, names::PROTOTYPE)? {
                return Ok(proto);
            }
        }
        Ok(self.object_proto)
    }

    /// Result of the `typeof` operator.
    pub fn type_of(&self, value: &Value) -> &'static str {
        let Value::Object(obj) = value else {
            return value.type_name();
        };
        match self.objects.get(*obj) {
            Some(o) if o.is_display_object() => "movieclip",
            Some(o) if o.is_function() => "function",
            _ => "object",
        }
    }
}
