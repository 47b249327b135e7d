//! Scope chain used for identifier resolution.

use core_types::ObjectId;
use memory_manager::{Trace, Tracer};

/// Ordered list of objects searched for unqualified names.
///
/// The last pushed entry is searched first. A function captures the
/// stack that was active where it was defined and resolves names against
/// that copy for every call.
///
/// # Example
///
/// ```
/// use core_types::ObjectId;
/// use interpreter::ScopeStack;
///
/// let mut scope = ScopeStack::new();
/// scope.push(ObjectId::new(1, 0));
/// scope.push(ObjectId::new(2, 0));
/// let order: Vec<u32> = scope.nearest_first().map(|id| id.index()).collect();
/// assert_eq!(order, vec![2, 1]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeStack {
    entries: Vec<ObjectId>,
}

impl ScopeStack {
    /// Creates an empty scope stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a scope, making it the first one searched.
    pub fn push(&mut self, obj: ObjectId) {
        self.entries.push(obj);
    }

    /// Removes the most recently pushed scope.
    pub fn pop(&mut self) -> Option<ObjectId> {
        self.entries.pop()
    }

    /// Iterates from the most recently pushed scope outward.
    pub fn nearest_first(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.entries.iter().rev().copied()
    }

    /// Number of scopes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no scope is pushed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Trace for ScopeStack {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        for id in &self.entries {
            tracer.trace_object(*id);
        }
    }
}
