//! Memory Manager and Interpreter Integration Tests
//!
//! Verifies that the interpreter reports every live object to the
//! memory_manager heap and that stale handles stop resolving.

use bytecode_system::{ActionBuffer, CodeRange, FunctionSignature};
use core_types::Value;
use interpreter::{Interpreter, InterpreterConfig};
use memory_manager::Heap;

fn empty_body() -> CodeRange {
    CodeRange::whole(ActionBuffer::new(vec![0u8]))
}

/// Test: freed slots are reused under a new generation
#[test]
fn test_stale_handles_after_reuse() {
    let mut heap: Heap<Value> = Heap::new();
    let first = heap.allocate(Value::from(1.0));
    heap.collect(std::iter::empty());
    let second = heap.allocate(Value::from(2.0));
    assert_ne!(first, second);
    assert!(heap.get(first).is_none());
    assert_eq!(heap.get(second), Some(&Value::from(2.0)));
}

/// Test: a function keeps its captured scope alive
#[test]
fn test_captured_scope_survives_collection() {
    let mut interp = Interpreter::new(InterpreterConfig::default().with_swf_version(7));
    let scope_obj = interp.create_object();
    interp.push_scope(scope_obj);
    let f = interp.create_user_function(FunctionSignature::conventional(None, vec![]), empty_body());
    interp.pop_scope();

    let global = interp.global();
    interp.set(global, "f", Value::Object(f)).unwrap();
    interp.collect_garbage();
    assert!(interp.object(scope_obj).is_some());

    let key = interp.key("f");
    interp.delete_member(global, &key);
    interp.collect_garbage();
    assert!(interp.object(f).is_none());
    assert!(interp.object(scope_obj).is_none());
}

/// Test: prototypes of live objects stay reachable
#[test]
fn test_prototype_chain_is_traced() {
    let mut interp = Interpreter::default();
    let proto = interp.create_object();
    let obj = interp.create_object_with_proto(Some(proto));
    interp.push(Value::Object(obj));
    interp.collect_garbage();
    assert!(interp.object(proto).is_some());

    interp.pop();
    let freed = interp.collect_garbage();
    assert_eq!(freed, 2);
    assert_eq!(interp.gc_stats().last_freed, 2);
}

/// Test: accessor functions are traced through properties
#[test]
fn test_accessors_keep_functions_alive() {
    fn getter(_: &mut Interpreter, _: &interpreter::FnCall) -> core_types::AvmResult<Value> {
        Ok(Value::from(1.0))
    }
    let mut interp = Interpreter::default();
    let root = interp.root().unwrap();
    let get = interp.create_function(getter);
    let key = interp.key("computed");
    assert!(interp.add_property(root, &key, get, None));
    interp.collect_garbage();
    assert!(interp.object(get).is_some());
    assert_eq!(interp.get(root, "computed").unwrap(), Value::from(1.0));
}
