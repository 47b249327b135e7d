//! Contract tests verifying the memory_manager API.

use core_types::{ObjectId, Value};
use memory_manager::{Heap, Trace, Tracer};

struct Cell {
    value: Value,
    next: Option<ObjectId>,
}

impl Trace for Cell {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        tracer.trace_value(&self.value);
        tracer.trace_opt(self.next);
    }
}

/// Contract: objects reachable through values survive collection
#[test]
fn contract_values_keep_objects_alive() {
    let mut heap = Heap::new();
    let leaf = heap.allocate(Cell {
        value: Value::from(1.0),
        next: None,
    });
    let root = heap.allocate(Cell {
        value: Value::Object(leaf),
        next: None,
    });
    heap.collect([root]);
    assert!(heap.contains(leaf));
}

/// Contract: chains are traced transitively
#[test]
fn contract_chains_are_traced() {
    let mut heap = Heap::new();
    let mut next = None;
    for _ in 0..10 {
        next = Some(heap.allocate(Cell {
            value: Value::Undefined,
            next,
        }));
    }
    let head = next.expect("allocated");
    assert_eq!(heap.collect([head]), 0);
    assert_eq!(heap.len(), 10);
}

/// Contract: get_mut edits are visible through get
#[test]
fn contract_get_mut() {
    let mut heap = Heap::new();
    let id = heap.allocate(Cell {
        value: Value::Null,
        next: None,
    });
    if let Some(cell) = heap.get_mut(id) {
        cell.value = Value::from("set");
    }
    assert_eq!(heap.get(id).map(|c| c.value.clone()), Some(Value::from("set")));
}

/// Contract: iteration visits every live object once
#[test]
fn contract_iter_visits_live_objects() {
    let mut heap = Heap::new();
    let a = heap.allocate(Cell {
        value: Value::Null,
        next: None,
    });
    heap.allocate(Cell {
        value: Value::Null,
        next: None,
    });
    heap.collect([a]);
    let ids: Vec<ObjectId> = heap.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![a]);
}
