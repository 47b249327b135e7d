//! Natives the core itself depends on.
//!
//! `Object.prototype` and `Function.prototype` methods, the `Object` and
//! `Function` constructors and `ASSetPropFlags`. Everything else is left
//! to the host's class library.

use crate::function::{FnCall, NativeFn};
use crate::object::Relay;
use crate::string_table::{names, StringKey};
use crate::Interpreter;
use core_types::{AvmResult, ObjectId, PropFlags, Value};

/// Class id of the `Object`/`Function` prototype natives.
pub const OBJECT_CLASS: u16 = 101;

/// Class id of `ASSetPropFlags`.
pub const GLOBAL_CLASS: u16 = 1;

/// Flags scripts may change through `ASSetPropFlags`.
const SCRIPT_FLAGS_MASK: u32 = PropFlags::DONT_ENUM.bits()
    | PropFlags::DONT_DELETE.bits()
    | PropFlags::READ_ONLY.bits()
    | PropFlags::ONLY_SWF5_UP.bits()
    | PropFlags::ONLY_SWF6_UP.bits()
    | PropFlags::IGNORE_SWF6.bits()
    | PropFlags::ONLY_SWF7_UP.bits()
    | PropFlags::ONLY_SWF8_UP.bits()
    | PropFlags::ONLY_SWF9_UP.bits();

enum Home {
    ObjectProto,
    FunctionProto,
    Global,
}

struct Entry {
    class_id: u16,
    method_id: u16,
    func: NativeFn,
    home: Home,
    name: StringKey,
    flags: PropFlags,
}

const SWF6_FLAGS: PropFlags = PropFlags::from_bits(
    PropFlags::DONT_ENUM.bits() | PropFlags::DONT_DELETE.bits() | PropFlags::ONLY_SWF6_UP.bits(),
);

const ENTRIES: &[Entry] = &[
    Entry { class_id: OBJECT_CLASS, method_id: 0, func: object_watch, home: Home::ObjectProto, name: names::WATCH, flags: SWF6_FLAGS },
    Entry { class_id: OBJECT_CLASS, method_id: 1, func: object_unwatch, home: Home::ObjectProto, name: names::UNWATCH, flags: SWF6_FLAGS },
    Entry { class_id: OBJECT_CLASS, method_id: 2, func: object_add_property, home: Home::ObjectProto, name: names::ADD_PROPERTY, flags: SWF6_FLAGS },
    Entry { class_id: OBJECT_CLASS, method_id: 3, func: object_value_of, home: Home::ObjectProto, name: names::VALUE_OF, flags: PropFlags::DONT_ENUM },
    Entry { class_id: OBJECT_CLASS, method_id: 4, func: object_to_string, home: Home::ObjectProto, name: names::TO_STRING, flags: PropFlags::DONT_ENUM },
    Entry { class_id: OBJECT_CLASS, method_id: 5, func: object_has_own_property, home: Home::ObjectProto, name: names::HAS_OWN_PROPERTY, flags: SWF6_FLAGS },
    Entry { class_id: OBJECT_CLASS, method_id: 6, func: object_is_prototype_of, home: Home::ObjectProto, name: names::IS_PROTOTYPE_OF, flags: SWF6_FLAGS },
    Entry { class_id: OBJECT_CLASS, method_id: 7, func: object_is_property_enumerable, home: Home::ObjectProto, name: names::IS_PROPERTY_ENUMERABLE, flags: SWF6_FLAGS },
    Entry { class_id: OBJECT_CLASS, method_id: 10, func: function_call, home: Home::FunctionProto, name: names::CALL, flags: PropFlags::DONT_ENUM },
    Entry { class_id: OBJECT_CLASS, method_id: 11, func: function_apply, home: Home::FunctionProto, name: names::APPLY, flags: PropFlags::DONT_ENUM },
    Entry { class_id: GLOBAL_CLASS, method_id: 0, func: as_set_prop_flags, home: Home::Global, name: names::AS_SET_PROP_FLAGS, flags: PropFlags::DONT_ENUM },
];

/// Registers the core natives and attaches them to the prototypes and
/// `_global`.
pub fn install(interp: &mut Interpreter) {
    for entry in ENTRIES {
        if let Err(err) = interp.register_native(entry.class_id, entry.method_id, entry.func) {
            tracing::error!("core native registration failed: {}", err);
            continue;
        }
        let func = match interp.get_native(entry.class_id, entry.method_id) {
            Ok(func) => func,
            Err(err) => {
                tracing::error!("core native lookup failed: {}", err);
                continue;
            }
        };
        let home = match entry.home {
            Home::ObjectProto => interp.object_proto,
            Home::FunctionProto => interp.function_proto,
            Home::Global => interp.global,
        };
        interp.init_member_key(home, entry.name, Value::Object(func), entry.flags);
    }

    let global = interp.global;
    let object_ctor = interp.create_function(object_constructor);
    let object_proto = interp.object_proto;
    interp.create_class(object_ctor, object_proto);
    interp.init_member_key(global, names::OBJECT, Value::Object(object_ctor), PropFlags::DONT_ENUM);

    let function_ctor = interp.create_function(function_constructor);
    let function_proto = interp.function_proto;
    interp.create_class(function_ctor, function_proto);
    interp.init_member_key(global, names::FUNCTION, Value::Object(function_ctor), PropFlags::DONT_ENUM);

    tracing::debug!(natives = interp.natives().len(), "core natives installed");
}

fn object_constructor(interp: &mut Interpreter, call: &FnCall) -> AvmResult<Value> {
    if call.nargs() == 1 {
        if let Some(obj) = interp.to_object(&call.arg(0))? {
            return Ok(Value::Object(obj));
        }
    }
    Ok(Value::Object(interp.create_object()))
}

fn function_constructor(interp: &mut Interpreter, call: &FnCall) -> AvmResult<Value> {
    match call.arg(0) {
        Value::Object(obj) => Ok(Value::Object(obj)),
        _ => Ok(Value::Object(interp.create_object())),
    }
}

fn receiver(interp: &Interpreter, call: &FnCall, method: &str) -> Option<ObjectId> {
    if call.this.is_none() {
        coding_error!(interp, "Object.{} called without an object", method);
    }
    call.this
}

fn object_watch(interp: &mut Interpreter, call: &FnCall) -> AvmResult<Value> {
    let Some(this) = receiver(interp, call, "watch") else {
        return Ok(Value::from(false));
    };
    if call.nargs() < 2 {
        coding_error!(interp, "Object.watch({}) needs at least two arguments", call.nargs());
        return Ok(Value::from(false));
    }
    let name = interp.to_string(&call.arg(0))?;
    let Some(trigger) = call.arg(1).as_object().filter(|f| {
        interp.object(*f).is_some_and(|o| o.is_callable())
    }) else {
        coding_error!(interp, "Object.watch: second argument is not a function");
        return Ok(Value::from(false));
    };
    let key = interp.key(&name);
    Ok(Value::from(interp.watch(this, &key, trigger, call.arg(2))))
}

fn object_unwatch(interp: &mut Interpreter, call: &FnCall) -> AvmResult<Value> {
    let Some(this) = receiver(interp, call, "unwatch") else {
        return Ok(Value::from(false));
    };
    if call.nargs() < 1 {
        coding_error!(interp, "Object.unwatch needs one argument");
        return Ok(Value::from(false));
    }
    let name = interp.to_string(&call.arg(0))?;
    let key = interp.key(&name);
    Ok(Value::from(interp.unwatch(this, &key)))
}

fn object_add_property(interp: &mut Interpreter, call: &FnCall) -> AvmResult<Value> {
    let Some(this) = receiver(interp, call, "addProperty") else {
        return Ok(Value::from(false));
    };
    if call.nargs() != 3 {
        coding_error!(interp, "Object.addProperty({}) needs three arguments", call.nargs());
        return Ok(Value::from(false));
    }
    let name = interp.to_string(&call.arg(0))?;
    if name.is_empty() {
        coding_error!(interp, "Object.addProperty: empty property name");
        return Ok(Value::from(false));
    }
    let callable = |interp: &Interpreter, v: &Value| {
        v.as_object()
            .filter(|f| interp.object(*f).is_some_and(|o| o.is_function()))
    };
    let Some(getter) = callable(interp, &call.arg(1)) else {
        coding_error!(interp, "Object.addProperty: getter is not a function");
        return Ok(Value::from(false));
    };
    let setter_arg = call.arg(2);
    let setter = match callable(interp, &setter_arg) {
        Some(setter) => Some(setter),
        None if setter_arg.is_null() => None,
        None => {
            coding_error!(interp, "Object.addProperty: setter is neither a function nor null");
            return Ok(Value::from(false));
        }
    };
    let key = interp.key(&name);
    Ok(Value::from(interp.add_property(this, &key, getter, setter)))
}

/// Wrapper objects give back their primitive; anything else is its own
/// value.
fn object_value_of(interp: &mut Interpreter, call: &FnCall) -> AvmResult<Value> {
    let Some(this) = call.this else {
        return Ok(Value::Undefined);
    };
    let primitive = match interp.object(this).and_then(|o| o.relay.as_ref()) {
        Some(Relay::Boolean(b)) => Value::from(*b),
        Some(Relay::Number(n)) | Some(Relay::Date(n)) => Value::from(*n),
        Some(Relay::String(s)) => Value::String(s.clone()),
        _ => Value::Object(this),
    };
    Ok(primitive)
}

fn object_to_string(_interp: &mut Interpreter, _call: &FnCall) -> AvmResult<Value> {
    Ok(Value::from("[object Object]"))
}

fn object_has_own_property(interp: &mut Interpreter, call: &FnCall) -> AvmResult<Value> {
    let Some(this) = receiver(interp, call, "hasOwnProperty") else {
        return Ok(Value::from(false));
    };
    if call.nargs() < 1 {
        coding_error!(interp, "Object.hasOwnProperty needs one argument");
        return Ok(Value::Undefined);
    }
    let name = interp.to_string(&call.arg(0))?;
    let key = interp.key(&name);
    Ok(Value::from(interp.has_own_property(this, &key)))
}

fn object_is_prototype_of(interp: &mut Interpreter, call: &FnCall) -> AvmResult<Value> {
    let Some(this) = receiver(interp, call, "isPrototypeOf") else {
        return Ok(Value::from(false));
    };
    match call.arg(0) {
        Value::Object(obj) => Ok(Value::from(interp.is_prototype_of(this, obj))),
        _ => Ok(Value::from(false)),
    }
}

fn object_is_property_enumerable(interp: &mut Interpreter, call: &FnCall) -> AvmResult<Value> {
    let Some(this) = receiver(interp, call, "isPropertyEnumerable") else {
        return Ok(Value::from(false));
    };
    if call.nargs() < 1 {
        coding_error!(interp, "Object.isPropertyEnumerable needs one argument");
        return Ok(Value::Undefined);
    }
    let name = interp.to_string(&call.arg(0))?;
    let key = interp.key(&name);
    Ok(Value::from(interp.is_property_enumerable(this, &key)))
}

/// Receiver for `call`/`apply`: the first argument as an object, or the
/// function itself when that is not possible.
fn call_receiver(interp: &mut Interpreter, call: &FnCall) -> AvmResult<Option<ObjectId>> {
    if call.nargs() == 0 {
        return Ok(call.this);
    }
    Ok(interp.to_object(&call.arg(0))?.or(call.this))
}

fn function_call(interp: &mut Interpreter, call: &FnCall) -> AvmResult<Value> {
    let Some(func) = call.this else {
        coding_error!(interp, "Function.call called without a function");
        return Ok(Value::Undefined);
    };
    let this = call_receiver(interp, call)?;
    let args = call.args.iter().skip(1).cloned().collect();
    interp.call_function(func, this, args)
}

fn function_apply(interp: &mut Interpreter, call: &FnCall) -> AvmResult<Value> {
    let Some(func) = call.this else {
        coding_error!(interp, "Function.apply called without a function");
        return Ok(Value::Undefined);
    };
    let this = call_receiver(interp, call)?;
    let mut args = Vec::new();
    if call.nargs() > 2 {
        coding_error!(interp, "Function.apply got {} arguments, expected at most 2", call.nargs());
    }
    match call.arg(1) {
        Value::Object(list) => {
            let len = interp.get_by_key(list, names::LENGTH)?;
            let len = interp.to_number(&len)?;
            let len = if len.is_finite() && len > 0.0 { len as usize } else { 0 };
            for i in 0..len {
                args.push(interp.get(list, &i.to_string())?);
            }
        }
        Value::Undefined if call.nargs() < 2 => {}
        other => {
            coding_error!(interp, "Function.apply: second argument {} is not an array", other);
        }
    }
    interp.call_function(func, this, args)
}

/// `ASSetPropFlags(obj, props, set_true [, set_false])`.
///
/// With three arguments `set_false` defaults to every flag in SWF5 and to
/// nothing later. Two zero masks act as `(obj, null, dontEnum, 0)`.
fn as_set_prop_flags(interp: &mut Interpreter, call: &FnCall) -> AvmResult<Value> {
    if call.nargs() < 3 {
        coding_error!(interp, "ASSetPropFlags needs at least three arguments");
        return Ok(Value::Undefined);
    }
    let Value::Object(obj) = call.arg(0) else {
        coding_error!(interp, "ASSetPropFlags: first argument {} is not an object", call.arg(0));
        return Ok(Value::Undefined);
    };
    let set_true = interp.to_int(&call.arg(2))? as u32 & SCRIPT_FLAGS_MASK;
    let set_false = if call.nargs() == 3 {
        if interp.swf_version() == 5 {
            SCRIPT_FLAGS_MASK
        } else {
            0
        }
    } else {
        interp.to_int(&call.arg(3))? as u32 & SCRIPT_FLAGS_MASK
    };

    let (props, set_true, set_false) = if set_true == 0 && set_false == 0 {
        (Value::Null, PropFlags::DONT_ENUM.bits(), 0)
    } else {
        (call.arg(1), set_true, set_false)
    };
    interp.set_prop_flags(
        obj,
        &props,
        PropFlags::from_bits(set_true),
        PropFlags::from_bits(set_false),
    )?;
    Ok(Value::Undefined)
}
