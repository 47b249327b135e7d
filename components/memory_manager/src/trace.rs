//! Reachability tracing.

use core_types::{ObjectId, Value};

/// Implemented by heap payloads to report the handles they hold.
///
/// # Example
///
/// ```
/// use core_types::{ObjectId, Value};
/// use memory_manager::{Trace, Tracer};
///
/// struct Pair(Value, Option<ObjectId>);
///
/// impl Trace for Pair {
///     fn trace(&self, tracer: &mut Tracer<'_>) {
///         tracer.trace_value(&self.0);
///         tracer.trace_opt(self.1);
///     }
/// }
/// ```
pub trait Trace {
    /// Reports every object handle directly reachable from `self`.
    fn trace(&self, tracer: &mut Tracer<'_>);
}

/// Collects handles discovered during the mark phase.
pub struct Tracer<'a> {
    worklist: &'a mut Vec<ObjectId>,
}

impl<'a> Tracer<'a> {
    pub(crate) fn new(worklist: &'a mut Vec<ObjectId>) -> Self {
        Self { worklist }
    }

    /// Queues an object for marking.
    pub fn trace_object(&mut self, id: ObjectId) {
        self.worklist.push(id);
    }

    /// Queues an optional object for marking.
    pub fn trace_opt(&mut self, id: Option<ObjectId>) {
        if let Some(id) = id {
            self.worklist.push(id);
        }
    }

    /// Queues the object a value refers to, if any.
    pub fn trace_value(&mut self, value: &Value) {
        if let Value::Object(id) = value {
            self.worklist.push(*id);
        }
    }

    /// Queues every object referred to by `values`.
    pub fn trace_values<'v>(&mut self, values: impl IntoIterator<Item = &'v Value>) {
        for value in values {
            self.trace_value(value);
        }
    }
}

impl Trace for Value {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        tracer.trace_value(self);
    }
}

impl<T: Trace> Trace for Vec<T> {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        for item in self {
            item.trace(tracer);
        }
    }
}

impl<T: Trace> Trace for Option<T> {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        if let Some(item) = self {
            item.trace(tracer);
        }
    }
}

impl Trace for ObjectId {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        tracer.trace_object(*self);
    }
}
