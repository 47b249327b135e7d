//! Unit tests for AvmError and RegistryError

use core_types::{AvmError, RegistryError, Value};

#[cfg(test)]
mod avm_error_tests {
    use super::*;

    #[test]
    fn test_only_action_limit_is_fatal() {
        assert!(AvmError::ActionLimit("x".into()).is_fatal());
        assert!(!AvmError::TypeError("x".into()).is_fatal());
        assert!(!AvmError::Thrown(Value::Undefined).is_fatal());
    }

    #[test]
    fn test_display_contains_message() {
        let err = AvmError::action_limit("Max stack count reached (256)");
        assert!(err.to_string().contains("Max stack count reached (256)"));
    }

    #[test]
    fn test_thrown_carries_value() {
        match AvmError::Thrown(Value::from("boom")) {
            AvmError::Thrown(v) => assert_eq!(v, Value::from("boom")),
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[cfg(test)]
mod registry_error_tests {
    use super::*;

    #[test]
    fn test_missing_display() {
        let err = RegistryError::Missing {
            class_id: 2,
            method_id: 9,
        };
        assert_eq!(err.to_string(), "no native function registered as (2, 9)");
    }
}
