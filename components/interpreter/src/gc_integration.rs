//! Garbage collection entry points.
//!
//! The heap itself only knows how to trace from a root set. This module
//! enumerates the roots held by the interpreter and lets the host keep
//! extra objects alive.

use crate::Interpreter;
use core_types::{ObjectId, Value};
use memory_manager::GcStats;

impl Interpreter {
    /// Every handle the interpreter itself keeps alive.
    ///
    /// Covers the core prototypes and `_global`, the root movie and the
    /// current targets, the operand stack, the global registers, each call
    /// frame (function, locals, registers and scope chain), the top-level
    /// scope chain and every pinned object.
    pub fn gc_roots(&self) -> Vec<ObjectId> {
        let mut roots = vec![self.global, self.object_proto, self.function_proto];
        roots.extend(self.root);
        roots.extend(self.target);
        roots.extend(self.original_target);
        roots.extend(self.stack_values().iter().filter_map(Value::as_object));
        roots.extend(self.global_registers().iter().filter_map(Value::as_object));
        for frame in &self.call_stack {
            roots.extend(frame.function);
            roots.extend(frame.this);
            roots.push(frame.locals);
            roots.extend(frame.registers.iter().filter_map(Value::as_object));
            roots.extend(frame.scope.nearest_first());
        }
        roots.extend(self.root_scope.nearest_first());
        roots.extend(self.pinned.keys().copied());
        roots
    }

    /// Frees every object unreachable from [`gc_roots`](Self::gc_roots).
    ///
    /// # Returns
    ///
    /// The number of objects freed.
    pub fn collect_garbage(&mut self) -> usize {
        let roots = self.gc_roots();
        let freed = self.objects.collect(roots);
        action_trace!(self, freed, live = self.objects.len(), "collected garbage");
        freed
    }

    /// Heap counters.
    pub fn gc_stats(&self) -> GcStats {
        self.objects.stats()
    }

    /// Keeps `obj` alive until a matching [`unpin`](Self::unpin).
    ///
    /// Pins nest: an object pinned twice needs two unpins.
    pub fn pin(&mut self, obj: ObjectId) {
        *self.pinned.entry(obj).or_insert(0) += 1;
    }

    /// Releases one pin on `obj`.
    pub fn unpin(&mut self, obj: ObjectId) {
        if let Some(count) = self.pinned.get_mut(&obj) {
            *count -= 1;
            if *count == 0 {
                self.pinned.remove(&obj);
            }
        }
    }
}
