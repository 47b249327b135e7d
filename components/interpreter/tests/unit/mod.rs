//! Unit tests for interpreter components

use core_types::{AvmError, AvmResult, PropFlags, Value};
use interpreter::{
    CallFrame, FnCall, Interpreter, InterpreterConfig, Relay, ScopeStack, GLOBAL_REGISTER_COUNT,
};

fn interp(version: u8) -> Interpreter {
    Interpreter::new(InterpreterConfig::default().with_swf_version(version))
}

fn answer(_: &mut Interpreter, _: &FnCall) -> AvmResult<Value> {
    Ok(Value::from(42.0))
}

fn text(_: &mut Interpreter, _: &FnCall) -> AvmResult<Value> {
    Ok(Value::from("text"))
}

fn throws(_: &mut Interpreter, call: &FnCall) -> AvmResult<Value> {
    Err(AvmError::Thrown(call.arg(0)))
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_defaults() {
    let config = InterpreterConfig::default();
    assert_eq!(config.swf_version, 8);
    assert_eq!(config.recursion_limit, 256);
    assert!(!config.verbose_as_coding_errors);
    assert_eq!(config.rng_seed, None);
}

#[test]
fn test_config_partial_json() {
    let config: InterpreterConfig =
        serde_json::from_str(r#"{ "swf_version": 6, "recursion_limit": 32 }"#).unwrap();
    assert_eq!(config.swf_version, 6);
    assert_eq!(config.recursion_limit, 32);
    assert_eq!(config.max_prototype_depth, InterpreterConfig::default().max_prototype_depth);
}

// ============================================================================
// Coercions
// ============================================================================

#[test]
fn test_to_number_uses_value_of() {
    let mut interp = interp(7);
    let obj = interp.create_object();
    let f = interp.create_function(answer);
    interp.set(obj, "valueOf", Value::Object(f)).unwrap();
    assert_eq!(interp.to_number(&Value::Object(obj)).unwrap(), 42.0);
}

#[test]
fn test_to_string_uses_to_string() {
    let mut interp = interp(7);
    let obj = interp.create_object();
    let f = interp.create_function(text);
    interp.set(obj, "toString", Value::Object(f)).unwrap();
    assert_eq!(&*interp.to_string(&Value::Object(obj)).unwrap(), "text");
}

#[test]
fn test_plain_object_strings() {
    let mut interp = interp(7);
    let obj = interp.create_object();
    assert_eq!(&*interp.to_string(&Value::Object(obj)).unwrap(), "[object Object]");
    let bare = interp.create_object_with_proto(None);
    assert_eq!(&*interp.to_string(&Value::Object(bare)).unwrap(), "[type Object]");
}

#[test]
fn test_typeof_display_object() {
    let mut interp = interp(7);
    let clip = interp.create_object();
    interp.object_mut(clip).unwrap().relay = Some(Relay::DisplayObject {
        target: "_level0.clip".into(),
    });
    assert_eq!(interp.type_of(&Value::Object(clip)), "movieclip");
    let f = interp.create_function(answer);
    assert_eq!(interp.type_of(&Value::Object(f)), "function");
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_add_concatenates_when_either_is_string() {
    let mut interp = interp(7);
    let sum = interp.add(&Value::from(1.0), &Value::from("2")).unwrap();
    assert_eq!(sum, Value::from("12"));
    let sum = interp.add(&Value::from(1.0), &Value::from(2.0)).unwrap();
    assert_eq!(sum, Value::from(3.0));
}

#[test]
fn test_less_than_nan_is_undefined() {
    let mut interp = interp(7);
    let nan = Value::from(f64::NAN);
    assert_eq!(interp.less_than(&nan, &Value::from(1.0)).unwrap(), Value::Undefined);
    assert_eq!(
        interp.less_than(&Value::from(1.0), &Value::from(2.0)).unwrap(),
        Value::from(true)
    );
    assert_eq!(
        interp.less_than(&Value::from("a"), &Value::from("b")).unwrap(),
        Value::from(true)
    );
}

#[test]
fn test_equals_rules() {
    let mut interp = interp(7);
    assert!(interp.equals(&Value::Undefined, &Value::Null).unwrap());
    assert!(!interp.equals(&Value::Undefined, &Value::from(0.0)).unwrap());
    assert!(interp.equals(&Value::from(1.0), &Value::from("1")).unwrap());
    assert!(interp.equals(&Value::from(true), &Value::from(1.0)).unwrap());
    assert!(interp.equals(&Value::from(f64::NAN), &Value::from(f64::NAN)).unwrap());
    let a = interp.create_object();
    let b = interp.create_object();
    assert!(interp.equals(&Value::Object(a), &Value::Object(a)).unwrap());
    assert!(!interp.equals(&Value::Object(a), &Value::Object(b)).unwrap());
}

#[test]
fn test_strict_equals() {
    assert!(interpreter::strict_equals(&Value::from(0.0), &Value::from(-0.0)));
    assert!(!interpreter::strict_equals(&Value::from(1.0), &Value::from("1")));
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_case_insensitive_below_swf7() {
    let mut interp = interp(6);
    let obj = interp.create_object();
    interp.set(obj, "Name", Value::from(1.0)).unwrap();
    assert_eq!(interp.get(obj, "name").unwrap(), Value::from(1.0));

    let mut interp7 = self::interp(7);
    let obj = interp7.create_object();
    interp7.set(obj, "Name", Value::from(1.0)).unwrap();
    assert_eq!(interp7.get(obj, "name").unwrap(), Value::Undefined);
}

#[test]
fn test_read_only_member_ignores_writes() {
    let mut interp = interp(7);
    let obj = interp.create_object();
    let key = interp.key("fixed");
    interp.init_member(obj, &key, Value::from(1.0), PropFlags::READ_ONLY);
    interp.set(obj, "fixed", Value::from(2.0)).unwrap();
    assert_eq!(interp.get(obj, "fixed").unwrap(), Value::from(1.0));
}

#[test]
fn test_dont_delete_member() {
    let mut interp = interp(7);
    let obj = interp.create_object();
    let key = interp.key("kept");
    interp.init_member(obj, &key, Value::from(1.0), PropFlags::DONT_DELETE);
    assert_eq!(interp.delete_member(obj, &key), (true, false));
    assert_eq!(interp.get(obj, "kept").unwrap(), Value::from(1.0));
}

#[test]
fn test_proto_member() {
    let mut interp = interp(7);
    let obj = interp.create_object();
    let proto = interp.object_prototype();
    assert_eq!(interp.get(obj, "__proto__").unwrap(), Value::Object(proto));
    let other = interp.create_object();
    interp.set(obj, "__proto__", Value::Object(other)).unwrap();
    assert_eq!(interp.object(obj).unwrap().proto, Some(other));
}

// ============================================================================
// Registers, stack and frames
// ============================================================================

#[test]
fn test_global_register_count() {
    let mut interp = interp(7);
    assert_eq!(GLOBAL_REGISTER_COUNT, 4);
    assert_eq!(interp.global_registers().len(), GLOBAL_REGISTER_COUNT);
    assert!(interp.set_register(0, Value::from(1.0)));
    assert!(!interp.set_register(GLOBAL_REGISTER_COUNT, Value::from(1.0)));
}

#[test]
fn test_pop_empty_stack_is_undefined() {
    let mut interp = interp(7);
    assert_eq!(interp.pop(), Value::Undefined);
}

#[test]
fn test_recursion_limit_is_fatal() {
    let mut interp = Interpreter::new(InterpreterConfig::default().with_recursion_limit(3));
    let locals = interp.create_object();
    interp
        .push_call_frame(CallFrame::new(None, locals, 0, ScopeStack::new()))
        .unwrap();
    interp
        .push_call_frame(CallFrame::new(None, locals, 0, ScopeStack::new()))
        .unwrap();
    let err = interp
        .push_call_frame(CallFrame::new(None, locals, 0, ScopeStack::new()))
        .unwrap_err();
    assert!(matches!(err, AvmError::ActionLimit(_)));
    assert_eq!(interp.call_stack_depth(), 2);

    assert!(interp.pop_call_frame().is_some());
    interp
        .push_call_frame(CallFrame::new(None, locals, 0, ScopeStack::new()))
        .unwrap();
    assert_eq!(interp.call_stack_depth(), 2);
}

// ============================================================================
// Natives
// ============================================================================

#[test]
fn test_duplicate_native_rejected() {
    let mut interp = interp(7);
    interp.register_native(900, 1, answer).unwrap();
    assert!(interp.register_native(900, 1, text).is_err());
    let f = interp.get_native(900, 1).unwrap();
    assert_eq!(interp.call_function(f, None, vec![]).unwrap(), Value::from(42.0));
}

#[test]
fn test_thrown_value_propagates_through_natives() {
    let mut interp = interp(7);
    let f = interp.create_function(throws);
    let err = interp
        .call_function(f, None, vec![Value::from("oops")])
        .unwrap_err();
    assert!(matches!(err, AvmError::Thrown(Value::String(ref s)) if &**s == "oops"));
    assert!(!err.is_fatal());
}

#[test]
fn test_calling_non_function_yields_undefined() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut interp = Interpreter::new(InterpreterConfig::default().with_verbose_as_coding_errors(true));
    let obj = interp.create_object();
    assert_eq!(interp.call_function(obj, None, vec![]).unwrap(), Value::Undefined);
    assert_eq!(interp.call_value(&Value::from(3.0), None, vec![]).unwrap(), Value::Undefined);
}
