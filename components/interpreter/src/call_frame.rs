//! Activation record of a user function call.

use crate::scope::ScopeStack;
use core_types::{ObjectId, Value};
use memory_manager::{Trace, Tracer};

/// State owned by one active user function call.
///
/// Stored on the call stack so that locals, registers and the scope chain
/// stay reachable while the function runs.
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Function being run; absent for frames pushed by the host
    pub function: Option<ObjectId>,
    /// Receiver of the call, kept even when the body never binds `this`
    pub this: Option<ObjectId>,
    /// Object holding local variables
    pub locals: ObjectId,
    /// Local registers; empty unless the function declares some
    pub registers: Vec<Value>,
    /// Scope chain the body resolves names against
    pub scope: ScopeStack,
}

impl CallFrame {
    /// Creates a frame with `register_count` undefined registers.
    ///
    /// # Arguments
    ///
    /// * `function` - Function object being called
    /// * `locals` - Object receiving local variables
    /// * `register_count` - Size of the register file
    /// * `scope` - Scope chain for the body
    pub fn new(
        function: Option<ObjectId>,
        locals: ObjectId,
        register_count: usize,
        scope: ScopeStack,
    ) -> Self {
        Self {
            function,
            this: None,
            locals,
            registers: vec![Value::Undefined; register_count],
            scope,
        }
    }

    /// Sets the receiver of the call.
    pub fn with_this(mut self, this: Option<ObjectId>) -> Self {
        self.this = this;
        self
    }

    /// Whether this frame has its own registers.
    pub fn has_local_registers(&self) -> bool {
        !self.registers.is_empty()
    }

    /// Register `index`, if in range.
    pub fn register(&self, index: usize) -> Option<&Value> {
        self.registers.get(index)
    }

    /// Stores into register `index`.
    ///
    /// # Returns
    ///
    /// `false` if the index is out of range; the value is dropped.
    pub fn set_register(&mut self, index: usize, value: Value) -> bool {
        match self.registers.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl Trace for CallFrame {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        tracer.trace_opt(self.function);
        tracer.trace_opt(self.this);
        tracer.trace_object(self.locals);
        tracer.trace_values(&self.registers);
        self.scope.trace(tracer);
    }
}
