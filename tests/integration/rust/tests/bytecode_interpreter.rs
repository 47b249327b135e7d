//! Bytecode System and Interpreter Integration Tests
//!
//! Decodes function definitions with bytecode_system and runs their bodies
//! through the interpreter's executor seam.

use bytecode_system::{action_code, ActionBuffer, CodeRange, FunctionSignature};
use core_types::{AvmError, Value};
use integration_tests::{emit, op, push_number, push_string, MiniDispatcher};
use interpreter::{Interpreter, InterpreterConfig};
use std::rc::Rc;

fn interpreter(version: u8) -> Interpreter {
    let mut interp = Interpreter::new(InterpreterConfig::default().with_swf_version(version));
    interp.set_executor(Rc::new(MiniDispatcher));
    interp
}

/// `function f(r:2 = a) { return a + 1; }` with `this` preloaded into r1.
fn define_add_one() -> ActionBuffer {
    let mut body = Vec::new();
    emit(&mut body, op::PUSH, &[4, 2]);
    emit(&mut body, op::PUSH, &push_number(1.0));
    emit(&mut body, op::ADD2, &[]);
    emit(&mut body, op::RETURN, &[]);

    let mut payload = b"f\0".to_vec();
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.push(3); // registers
    payload.extend_from_slice(&0x0001u16.to_le_bytes()); // preload this
    payload.extend_from_slice(&[2, b'a', 0]);
    payload.extend_from_slice(&(body.len() as u16).to_le_bytes());

    let mut bytes = Vec::new();
    emit(&mut bytes, action_code::DEFINE_FUNCTION2, &payload);
    bytes.extend_from_slice(&body);
    ActionBuffer::new(bytes)
}

#[test]
fn test_function2_body_reads_register_param() {
    let mut interp = interpreter(7);
    let (sig, body) = FunctionSignature::read(&define_add_one(), 0).unwrap();
    let f = interp.create_user_function(sig, body);

    let text = interp.call_function(f, None, vec![Value::from("4")]).unwrap();
    assert_eq!(text, Value::from("41"));

    let number = interp.call_function(f, None, vec![Value::from(4.0)]).unwrap();
    assert_eq!(number, Value::from(5.0));
    assert_eq!(interp.stack_len(), 0);
}

#[test]
fn test_conventional_body_reads_named_param() {
    let mut body = Vec::new();
    emit(&mut body, op::PUSH, &push_string("a"));
    emit(&mut body, op::GET_VARIABLE, &[]);
    emit(&mut body, op::RETURN, &[]);

    let mut payload = b"g\0".to_vec();
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(b"a\0");
    payload.extend_from_slice(&(body.len() as u16).to_le_bytes());
    let mut bytes = Vec::new();
    emit(&mut bytes, action_code::DEFINE_FUNCTION, &payload);
    bytes.extend_from_slice(&body);

    for version in [5u8, 7] {
        let mut interp = interpreter(version);
        let (sig, body) = FunctionSignature::read(&ActionBuffer::new(bytes.clone()), 0).unwrap();
        assert_eq!(sig.name().map(|n| &**n), Some("g"));
        let f = interp.create_user_function(sig, body);
        let result = interp.call_function(f, None, vec![Value::from(7.0)]).unwrap();
        assert_eq!(result, Value::from(7.0), "SWF{version}");
    }
}

#[test]
fn test_top_level_code_uses_constant_pool() {
    let mut bytes = Vec::new();
    emit(&mut bytes, op::CONSTANT_POOL, &[1, 0, b'x', 0]);
    emit(&mut bytes, op::PUSH, &[8, 0]);
    emit(&mut bytes, op::PUSH, &push_string("v"));
    emit(&mut bytes, op::SET_VARIABLE, &[]);
    emit(&mut bytes, op::END, &[]);

    let mut interp = interpreter(6);
    let root = interp.root();
    interp
        .execute_code(CodeRange::whole(ActionBuffer::new(bytes)), root)
        .unwrap();
    let root = root.unwrap();
    assert_eq!(interp.get(root, "x").unwrap(), Value::from("v"));
    assert_eq!(interp.get_variable("x").unwrap(), Value::from("v"));
}

#[test]
fn test_malformed_actions_are_contained() {
    let mut interp = interpreter(7);
    // Push declaring five payload bytes with none present.
    let code = CodeRange::whole(ActionBuffer::new(vec![op::PUSH, 5, 0]));
    let result = interp.run_event(|i| i.execute_code(code, None));
    assert!(matches!(result, Err(AvmError::TypeError(_))));
    assert_eq!(interp.stack_len(), 0);
}
