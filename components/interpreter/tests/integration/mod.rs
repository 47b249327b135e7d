//! Integration tests for interpreter
//!
//! Tests interaction between user function calls, the executor seam,
//! variable resolution and the object model.

use bytecode_system::{ActionBuffer, CodeRange, Function2Flags, FunctionSignature, Param};
use core_types::{AvmError, AvmResult, ObjectId, Value};
use interpreter::{Activation, Interpreter, InterpreterConfig, Relay};
use std::rc::Rc;

fn body() -> CodeRange {
    CodeRange::whole(ActionBuffer::new(vec![0u8]))
}

fn interp(version: u8) -> Interpreter {
    Interpreter::new(InterpreterConfig::default().with_swf_version(version))
}

/// Stores what the body observed into `_global.seen`.
fn record(interp: &mut Interpreter, name: &str, value: Value) {
    let global = interp.global();
    let seen = match interp.get(global, "seen").unwrap() {
        Value::Object(seen) => seen,
        _ => {
            let seen = interp.create_object();
            interp.set(global, "seen", Value::Object(seen)).unwrap();
            seen
        }
    };
    interp.set(seen, name, value).unwrap();
}

fn seen(interp: &mut Interpreter, name: &str) -> Value {
    let global = interp.global();
    let seen = interp.get(global, "seen").unwrap().as_object().unwrap();
    interp.get(seen, name).unwrap()
}

fn function2(params: Vec<Param>, registers: u8, flags: Function2Flags) -> FunctionSignature {
    FunctionSignature::function2(None, params, registers, flags)
}

#[test]
fn test_function2_preloads_this_and_global() {
    let mut interp = interp(7);
    interp.set_executor(Rc::new(|i: &mut Interpreter, _: &Activation| -> AvmResult<Value> {
        let r1 = i.get_register(1).unwrap_or(Value::Undefined);
        let r2 = i.get_register(2).unwrap_or(Value::Undefined);
        record(i, "r1", r1);
        record(i, "r2", r2);
        Ok(Value::Undefined)
    }));
    let sig = function2(
        vec![],
        2,
        Function2Flags::PRELOAD_THIS | Function2Flags::PRELOAD_GLOBAL,
    );
    let f = interp.create_user_function(sig, body());
    let receiver = interp.create_object();
    interp.call_function(f, Some(receiver), vec![]).unwrap();

    let global = interp.global();
    assert_eq!(seen(&mut interp, "r1"), Value::Object(receiver));
    assert_eq!(seen(&mut interp, "r2"), Value::Object(global));
}

#[test]
fn test_function2_swf6_positional_args_leave_preloads_alone() {
    let mut interp = interp(6);
    interp.set_executor(Rc::new(|i: &mut Interpreter, _: &Activation| -> AvmResult<Value> {
        let r1 = i.get_register(1).unwrap_or(Value::Undefined);
        let r2 = i.get_register(2).unwrap_or(Value::Undefined);
        record(i, "r1", r1);
        record(i, "r2", r2);
        let a = i.get_variable("a")?;
        let b = i.get_variable("b")?;
        record(i, "a", a);
        record(i, "b", b);
        Ok(Value::Undefined)
    }));
    let sig = function2(
        vec![Param::Named(Rc::from("a")), Param::Named(Rc::from("b"))],
        2,
        Function2Flags::PRELOAD_THIS | Function2Flags::PRELOAD_GLOBAL,
    );
    let f = interp.create_user_function(sig, body());
    let receiver = interp.create_object();
    interp
        .call_function(f, Some(receiver), vec![Value::from(10.0), Value::from(20.0)])
        .unwrap();

    let global = interp.global();
    assert_eq!(seen(&mut interp, "r1"), Value::Object(receiver));
    assert_eq!(seen(&mut interp, "r2"), Value::Object(global));
    assert_eq!(seen(&mut interp, "a"), Value::from(10.0));
    assert_eq!(seen(&mut interp, "b"), Value::from(20.0));
}

#[test]
fn test_function2_swf6_explicit_register_arg_overwrites_preload() {
    let mut interp = interp(6);
    interp.set_executor(Rc::new(|i: &mut Interpreter, _: &Activation| -> AvmResult<Value> {
        let r1 = i.get_register(1).unwrap_or(Value::Undefined);
        let r2 = i.get_register(2).unwrap_or(Value::Undefined);
        record(i, "r1", r1);
        record(i, "r2", r2);
        Ok(Value::Undefined)
    }));
    let sig = function2(
        vec![Param::Register(1)],
        2,
        Function2Flags::PRELOAD_THIS | Function2Flags::PRELOAD_GLOBAL,
    );
    let f = interp.create_user_function(sig, body());
    let receiver = interp.create_object();
    interp
        .call_function(f, Some(receiver), vec![Value::from(10.0), Value::from(20.0)])
        .unwrap();

    let global = interp.global();
    assert_eq!(seen(&mut interp, "r1"), Value::from(10.0));
    assert_eq!(seen(&mut interp, "r2"), Value::Object(global));
}

#[test]
fn test_suppressed_this_survives_collection_during_call() {
    let mut interp = interp(7);
    interp.set_executor(Rc::new(|i: &mut Interpreter, a: &Activation| -> AvmResult<Value> {
        i.collect_garbage();
        let alive = a.this.is_some_and(|this| i.object(this).is_some());
        record(i, "alive", Value::from(alive));
        Ok(Value::Undefined)
    }));
    let sig = function2(vec![], 1, Function2Flags::SUPPRESS_THIS);
    let f = interp.create_user_function(sig, body());
    let global = interp.global();
    interp.set(global, "f", Value::Object(f)).unwrap();
    let receiver = interp.create_object();
    interp.call_function(f, Some(receiver), vec![]).unwrap();

    assert_eq!(seen(&mut interp, "alive"), Value::from(true));
}

#[test]
fn test_function2_register_params_bound_after_preloads() {
    let mut interp = interp(7);
    interp.set_executor(Rc::new(|i: &mut Interpreter, _: &Activation| -> AvmResult<Value> {
        let r1 = i.get_register(1).unwrap_or(Value::Undefined);
        let r2 = i.get_register(2).unwrap_or(Value::Undefined);
        record(i, "r1", r1);
        record(i, "r2", r2);
        let named = i.get_variable("named")?;
        record(i, "named", named);
        Ok(Value::Undefined)
    }));
    let sig = function2(
        vec![Param::Register(2), Param::Named(Rc::from("named"))],
        3,
        Function2Flags::PRELOAD_THIS,
    );
    let f = interp.create_user_function(sig, body());
    let receiver = interp.create_object();
    interp
        .call_function(f, Some(receiver), vec![Value::from("x")])
        .unwrap();

    assert_eq!(seen(&mut interp, "r1"), Value::Object(receiver));
    assert_eq!(seen(&mut interp, "r2"), Value::from("x"));
    assert_eq!(seen(&mut interp, "named"), Value::Undefined);
}

#[test]
fn test_suppress_and_preload_arguments_gives_empty_object() {
    let mut interp = interp(7);
    interp.set_executor(Rc::new(|i: &mut Interpreter, _: &Activation| -> AvmResult<Value> {
        let arguments = i.get_register(1).unwrap_or(Value::Undefined);
        let length = match arguments {
            Value::Object(obj) => i.get(obj, "length")?,
            other => other,
        };
        record(i, "length", length);
        Ok(Value::Undefined)
    }));
    let sig = function2(
        vec![],
        2,
        Function2Flags::PRELOAD_ARGUMENTS | Function2Flags::SUPPRESS_ARGUMENTS,
    );
    let f = interp.create_user_function(sig, body());
    interp
        .call_function(f, None, vec![Value::from(1.0), Value::from(2.0)])
        .unwrap();
    assert_eq!(seen(&mut interp, "length"), Value::from(0.0));
}

#[test]
fn test_conventional_call_binds_locals() {
    let mut interp = interp(7);
    interp.set_executor(Rc::new(|i: &mut Interpreter, _: &Activation| -> AvmResult<Value> {
        let a = i.get_variable("a")?;
        record(i, "a", a);
        let locals = i.current_frame().map(|f| f.locals).unwrap();
        let key = i.key("b");
        let declared = i.has_own_property(locals, &key);
        record(i, "b_declared", Value::from(declared));
        let Value::Object(arguments) = i.get_variable("arguments")? else {
            return Err(AvmError::TypeError("no arguments".into()));
        };
        let length = i.get(arguments, "length")?;
        let caller = i.get(arguments, "caller")?;
        record(i, "length", length);
        record(i, "caller", caller);
        Ok(Value::from("done"))
    }));
    let sig = FunctionSignature::conventional(None, vec![Rc::from("a"), Rc::from("b")]);
    let f = interp.create_user_function(sig, body());
    let result = interp.call_function(f, None, vec![Value::from(5.0)]).unwrap();

    assert_eq!(result, Value::from("done"));
    assert_eq!(seen(&mut interp, "a"), Value::from(5.0));
    assert_eq!(seen(&mut interp, "b_declared"), Value::from(true));
    assert_eq!(seen(&mut interp, "length"), Value::from(1.0));
    assert_eq!(seen(&mut interp, "caller"), Value::Null);
    assert_eq!(interp.call_stack_depth(), 0);
}

#[test]
fn test_closures_capture_scope_from_swf6() {
    for (version, expected) in [(7u8, Value::from("captured")), (5u8, Value::Undefined)] {
        let mut interp = interp(version);
        interp.set_executor(Rc::new(|i: &mut Interpreter, _: &Activation| -> AvmResult<Value> {
            let v = i.get_variable("hidden")?;
            record(i, "hidden", v);
            Ok(Value::Undefined)
        }));
        let scope_obj = interp.create_object();
        interp.set(scope_obj, "hidden", Value::from("captured")).unwrap();
        interp.push_scope(scope_obj);
        let sig = FunctionSignature::conventional(None, vec![]);
        let f = interp.create_user_function(sig, body());
        interp.pop_scope();

        interp.call_function(f, None, vec![]).unwrap();
        assert_eq!(seen(&mut interp, "hidden"), expected, "SWF{version}");
    }
}

#[test]
fn test_swf5_display_object_receiver_becomes_target() {
    let mut interp = interp(5);
    interp.set_executor(Rc::new(|i: &mut Interpreter, _: &Activation| -> AvmResult<Value> {
        let target = Value::from(i.target());
        record(i, "target", target);
        Ok(Value::Undefined)
    }));
    let clip = interp.create_object();
    interp.object_mut(clip).unwrap().relay = Some(Relay::DisplayObject {
        target: Rc::from("_level0.clip"),
    });
    let before = interp.target();
    let sig = FunctionSignature::conventional(None, vec![]);
    let f = interp.create_user_function(sig, body());
    interp.call_function(f, Some(clip), vec![]).unwrap();

    assert_eq!(seen(&mut interp, "target"), Value::Object(clip));
    assert_eq!(interp.target(), before);
}

#[test]
fn test_runaway_recursion_is_contained() {
    let mut interp = Interpreter::new(InterpreterConfig::default().with_recursion_limit(8));
    interp.set_executor(Rc::new(|i: &mut Interpreter, a: &Activation| -> AvmResult<Value> {
        let f = a.function.unwrap();
        i.call_function(f, None, vec![])
    }));
    let sig = FunctionSignature::conventional(None, vec![]);
    let f = interp.create_user_function(sig, body());

    let result = interp.run_event(|i| i.call_function(f, None, vec![]));
    assert!(matches!(result, Err(AvmError::ActionLimit(_))));
    assert_eq!(interp.call_stack_depth(), 0);
    // The next event runs normally.
    let ok = interp.run_event(|i| Ok(Value::from(i.call_stack_depth())));
    assert_eq!(ok.unwrap(), Value::from(0.0));
}

#[test]
fn test_user_constructor_with_super_call() {
    let mut interp = interp(7);
    interp.set_executor(Rc::new(|i: &mut Interpreter, a: &Activation| -> AvmResult<Value> {
        let this = a.this.unwrap();
        let kind = i.get_variable("kind")?;
        i.set(this, "kind", kind)?;
        if let Value::Object(super_obj) = i.get_variable("super")? {
            i.call_function(super_obj, Some(this), vec![Value::from("base")])?;
            i.set(this, "called_super", Value::from(true))?;
        }
        Ok(Value::Undefined)
    }));
    let base = interp.create_user_function(
        FunctionSignature::conventional(None, vec![Rc::from("kind")]),
        body(),
    );
    let derived = interp.create_user_function(
        FunctionSignature::conventional(None, vec![Rc::from("kind")]),
        body(),
    );
    interp.extends(derived, base).unwrap();

    let instance: ObjectId = interp
        .construct_instance(derived, vec![Value::from("derived")])
        .unwrap();
    assert!(interp.instance_of(instance, base).unwrap());
    assert_eq!(interp.get(instance, "called_super").unwrap(), Value::from(true));
    // The base constructor ran last and overwrote `kind`.
    assert_eq!(interp.get(instance, "kind").unwrap(), Value::from("base"));
}

#[test]
fn test_set_variable_paths_and_targets() {
    let mut interp = interp(7);
    let root = interp.root().unwrap();
    let clip = interp.create_object();
    interp.set(root, "clip", Value::Object(clip)).unwrap();

    interp.set_variable("clip.x", Value::from(3.0)).unwrap();
    assert_eq!(interp.get(clip, "x").unwrap(), Value::from(3.0));
    assert_eq!(interp.get_variable("/clip:x").unwrap(), Value::from(3.0));

    interp.set_variable("y", Value::from(1.0)).unwrap();
    assert_eq!(interp.get(root, "y").unwrap(), Value::from(1.0));
    assert!(interp.delete_variable("y").unwrap());
    assert_eq!(interp.get_variable("y").unwrap(), Value::Undefined);
}

#[test]
fn test_global_lookup_requires_swf6() {
    let mut six = interp(6);
    let global = six.global();
    assert_eq!(six.get_variable("_global").unwrap(), Value::Object(global));

    let mut five = interp(5);
    assert_eq!(five.get_variable("_global").unwrap(), Value::Undefined);
}

#[test]
fn test_watch_trigger_transforms_value() {
    fn double(i: &mut Interpreter, call: &interpreter::FnCall) -> core_types::AvmResult<Value> {
        let n = i.to_number(&call.arg(2))?;
        Ok(Value::from(n * 2.0))
    }
    let mut interp = interp(7);
    let obj = interp.create_object();
    let trigger = interp.create_function(double);
    interp
        .call_method(obj, "watch", vec![Value::from("n"), Value::Object(trigger)])
        .unwrap();
    interp.set(obj, "n", Value::from(4.0)).unwrap();
    assert_eq!(interp.get(obj, "n").unwrap(), Value::from(8.0));

    interp.call_method(obj, "unwatch", vec![Value::from("n")]).unwrap();
    interp.set(obj, "n", Value::from(4.0)).unwrap();
    assert_eq!(interp.get(obj, "n").unwrap(), Value::from(4.0));
}

#[test]
fn test_collection_keeps_running_frames_alive() {
    let mut interp = interp(7);
    interp.set_executor(Rc::new(|i: &mut Interpreter, _: &Activation| -> AvmResult<Value> {
        let kept = i.create_object();
        i.set_local("kept", Value::Object(kept))?;
        i.collect_garbage();
        let alive = i.object(kept).is_some();
        record(i, "alive", Value::from(alive));
        Ok(Value::Undefined)
    }));
    let f = interp.create_user_function(FunctionSignature::conventional(None, vec![]), body());
    let global = interp.global();
    interp.set(global, "f", Value::Object(f)).unwrap();
    interp.call_function(f, None, vec![]).unwrap();
    assert_eq!(seen(&mut interp, "alive"), Value::from(true));
}
