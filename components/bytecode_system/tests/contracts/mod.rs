//! Contract tests for the bytecode_system public API

use bytecode_system::{action_code, ActionBuffer, BytecodeError, FunctionSignature};

/// Contract: a function body starts right after its defining action
#[test]
fn contract_body_follows_definition() {
    let payload = [b'g', 0, 0, 0, 2, 0];
    let mut bytes = vec![action_code::DEFINE_FUNCTION, payload.len() as u8, 0];
    bytes.extend_from_slice(&payload);
    bytes.extend_from_slice(&[0x07, action_code::END]);
    let buffer = ActionBuffer::new(bytes);

    let (sig, body) = FunctionSignature::read(&buffer, 0).unwrap();
    assert_eq!(sig.name().map(|n| n.to_string()), Some("g".to_string()));
    assert_eq!(body.start(), 3 + payload.len());
    assert_eq!(body.bytes(), &[0x07, action_code::END]);
}

/// Contract: non-definition actions are rejected
#[test]
fn contract_rejects_other_actions() {
    let buffer = ActionBuffer::new(vec![0x96, 0x00, 0x00]);
    assert!(matches!(
        FunctionSignature::read(&buffer, 0),
        Err(BytecodeError::WrongAction { found: 0x96, .. })
    ));
}

/// Contract: decoding never reads outside the buffer
#[test]
fn contract_truncated_record() {
    let buffer = ActionBuffer::new(vec![action_code::DEFINE_FUNCTION2, 0x10]);
    assert!(FunctionSignature::read(&buffer, 0).is_err());
}
