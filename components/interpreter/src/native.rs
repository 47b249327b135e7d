//! Registry of host functions addressed by `(class, method)`.
//!
//! Movies reach built-ins through `ASnative(class, method)`, so every
//! native that scripts may look up is registered here under a fixed slot.

use crate::function::NativeFn;
use core_types::RegistryError;
use std::collections::HashMap;

/// Table of registered host functions.
///
/// # Example
///
/// ```
/// use core_types::{AvmResult, Value};
/// use interpreter::{FnCall, Interpreter, NativeRegistry};
///
/// fn answer(_: &mut Interpreter, _: &FnCall) -> AvmResult<Value> {
///     Ok(Value::from(42.0))
/// }
///
/// let mut registry = NativeRegistry::new();
/// registry.register(200, 0, answer).unwrap();
/// assert!(registry.register(200, 0, answer).is_err());
/// assert!(registry.lookup(200, 0).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct NativeRegistry {
    table: HashMap<(u16, u16), NativeFn>,
}

impl NativeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `func` under `(class_id, method_id)`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Duplicate`] if the slot is taken. The existing
    /// entry is left in place.
    pub fn register(
        &mut self,
        class_id: u16,
        method_id: u16,
        func: NativeFn,
    ) -> Result<(), RegistryError> {
        use std::collections::hash_map::Entry;
        match self.table.entry((class_id, method_id)) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate {
                class_id,
                method_id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(func);
                Ok(())
            }
        }
    }

    /// Looks up the function in `(class_id, method_id)`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Missing`] if nothing is registered there.
    pub fn lookup(&self, class_id: u16, method_id: u16) -> Result<NativeFn, RegistryError> {
        self.table
            .get(&(class_id, method_id))
            .copied()
            .ok_or(RegistryError::Missing {
                class_id,
                method_id,
            })
    }

    /// Number of registered natives.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
