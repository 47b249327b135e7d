//! Unit tests for bytecode_system components

use bytecode_system::{
    ActionBuffer, ByteReader, CodeRange, ConstantPool, Dialect, Function2Flags,
    FunctionSignature, Param,
};

// ============================================================================
// CodeRange Tests
// ============================================================================

#[test]
fn test_code_range_bounds() {
    let buffer = ActionBuffer::new(vec![1, 2, 3, 4]);
    let range = CodeRange::new(buffer.clone(), 1, 2).unwrap();
    assert_eq!(range.bytes(), &[2, 3]);
    assert_eq!(range.start(), 1);
    assert_eq!(range.end(), 3);
    assert!(CodeRange::new(buffer.clone(), 4, 0).is_ok());
    assert!(CodeRange::new(buffer, usize::MAX, 2).is_err());
}

#[test]
fn test_whole_range() {
    let range = CodeRange::whole(ActionBuffer::new(vec![0u8; 9]));
    assert_eq!(range.len(), 9);
}

#[test]
fn test_ranges_share_buffer() {
    let buffer = ActionBuffer::new(vec![7, 8]);
    let a = CodeRange::whole(buffer.clone());
    let b = CodeRange::whole(buffer);
    assert_eq!(a, b);
}

// ============================================================================
// ConstantPool Tests
// ============================================================================

#[test]
fn test_empty_pool() {
    let pool = ConstantPool::from_payload(&[0, 0]).unwrap();
    assert!(pool.is_empty());
}

#[test]
fn test_pool_preserves_order() {
    let pool = ConstantPool::new(vec!["a".into(), "b".into(), "a".into()]);
    assert_eq!(pool.len(), 3);
    assert_eq!(pool.get(2).as_deref(), Some("a"));
}

#[test]
fn test_pool_lossy_decoding() {
    let pool = ConstantPool::from_payload(&[1, 0, 0xFF, 0]).unwrap();
    assert_eq!(pool.get(0).as_deref(), Some("\u{FFFD}"));
}

// ============================================================================
// Signature Tests
// ============================================================================

#[test]
fn test_conventional_names_only() {
    let sig = FunctionSignature::conventional(None, vec!["a".into(), "b".into()]);
    assert_eq!(sig.register_count(), 0);
    assert!(sig
        .params()
        .iter()
        .all(|p| matches!(p, Param::Named(_))));
}

#[test]
fn test_flag_union() {
    let flags = Function2Flags::PRELOAD_THIS | Function2Flags::SUPPRESS_ARGUMENTS;
    assert_eq!(flags.bits(), 0x0009);
    assert!(flags.contains(Function2Flags::SUPPRESS_ARGUMENTS));
    assert!(!flags.contains(Function2Flags::PRELOAD_ARGUMENTS));
}

#[test]
fn test_function2_dialect_keeps_flags() {
    let sig = FunctionSignature::function2(None, vec![], 2, Function2Flags::PRELOAD_ROOT);
    assert_eq!(sig.dialect(), Dialect::Function2(Function2Flags::PRELOAD_ROOT));
}

#[test]
fn test_reader_position() {
    let mut reader = ByteReader::new(&[1, 2, 3]);
    reader.read_u8().unwrap();
    assert_eq!(reader.position(), 1);
    assert_eq!(reader.remaining(), 2);
}
