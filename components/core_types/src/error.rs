//! Interpreter error types.
//!
//! Recoverable script mistakes are logged and never reach these types.
//! What remains are the conditions that unwind out of an operation.

use crate::Value;
use thiserror::Error;

/// An error that unwinds through interpreter operations.
///
/// # Examples
///
/// ```
/// use core_types::AvmError;
///
/// let err = AvmError::ActionLimit("Max stack count reached (256)".to_string());
/// assert!(err.is_fatal());
/// assert!(!AvmError::TypeError("no toString".to_string()).is_fatal());
/// ```
#[derive(Debug, Clone, Error)]
pub enum AvmError {
    /// A configured resource limit was exceeded.
    ///
    /// Aborts the whole event handler that triggered it.
    #[error("action limit hit: {0}")]
    ActionLimit(String),

    /// A conversion could not produce a primitive.
    ///
    /// Always caught by the coercion layer and replaced by a fallback.
    #[error("type error: {0}")]
    TypeError(String),

    /// A script `throw` unwinding toward a handler.
    #[error("script exception: {0:?}")]
    Thrown(Value),
}

impl AvmError {
    /// Whether the error terminates the current event dispatch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AvmError::ActionLimit(_))
    }

    /// Shorthand used at the recursion and lookup guards.
    pub fn action_limit(message: impl Into<String>) -> Self {
        AvmError::ActionLimit(message.into())
    }
}

/// Result alias used across the interpreter.
pub type AvmResult<T> = Result<T, AvmError>;

/// Failure of the native function registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two natives claimed the same `(class, method)` slot.
    #[error("native function ({class_id}, {method_id}) is already registered")]
    Duplicate {
        /// Class identifier
        class_id: u16,
        /// Method identifier within the class
        method_id: u16,
    },

    /// No native is registered under the requested slot.
    #[error("no native function registered as ({class_id}, {method_id})")]
    Missing {
        /// Class identifier
        class_id: u16,
        /// Method identifier within the class
        method_id: u16,
    },
}
