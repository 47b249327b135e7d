//! Slot arena with generational handles and mark-and-sweep collection.
//!
//! Objects live in a `Vec` of slots. A freed slot goes onto a free list and
//! has its generation bumped, so stale [`ObjectId`]s stop resolving instead
//! of pointing at whatever reuses the slot.

use crate::trace::{Trace, Tracer};
use core_types::ObjectId;

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Counters describing collector activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcStats {
    /// Number of completed collections
    pub runs: u64,
    /// Objects freed by the most recent collection
    pub last_freed: usize,
    /// Objects freed over the heap's lifetime
    pub total_freed: usize,
    /// Objects currently allocated
    pub live: usize,
}

/// Arena of `T` addressed by [`ObjectId`].
///
/// # Example
///
/// ```
/// use memory_manager::Heap;
///
/// let mut heap: Heap<core_types::Value> = Heap::new();
/// let id = heap.allocate(core_types::Value::from(1.0));
/// assert!(heap.contains(id));
/// heap.collect(std::iter::empty());
/// assert!(!heap.contains(id));
/// ```
#[derive(Debug)]
pub struct Heap<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    marks: Vec<bool>,
    worklist: Vec<ObjectId>,
    stats: GcStats,
}

impl<T> Default for Heap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Heap<T> {
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            marks: Vec::new(),
            worklist: Vec::new(),
            stats: GcStats::default(),
        }
    }

    /// Stores `value` and returns its handle.
    ///
    /// Freed slots are reused before the arena grows.
    pub fn allocate(&mut self, value: T) -> ObjectId {
        self.stats.live += 1;
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            debug_assert!(slot.value.is_none());
            slot.value = Some(value);
            return ObjectId::new(idx, slot.generation);
        }

        let idx = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        self.marks.push(false);
        ObjectId::new(idx, 0)
    }

    fn slot_index(&self, id: ObjectId) -> Option<usize> {
        let idx = id.index() as usize;
        let slot = self.slots.get(idx)?;
        if slot.generation != id.generation() || slot.value.is_none() {
            return None;
        }
        Some(idx)
    }

    /// Whether `id` refers to a live object.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.slot_index(id).is_some()
    }

    /// Borrows the object behind `id`.
    ///
    /// # Returns
    ///
    /// `None` if the handle is stale or was never issued by this heap.
    pub fn get(&self, id: ObjectId) -> Option<&T> {
        let idx = self.slot_index(id)?;
        self.slots[idx].value.as_ref()
    }

    /// Mutably borrows the object behind `id`.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        let idx = self.slot_index(id)?;
        self.slots[idx].value.as_mut()
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.stats.live
    }

    /// Whether the heap holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.stats.live == 0
    }

    /// Collector counters.
    pub fn stats(&self) -> GcStats {
        self.stats
    }

    /// Iterates over live objects and their handles.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &T)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.value
                .as_ref()
                .map(|value| (ObjectId::new(idx as u32, slot.generation), value))
        })
    }
}

impl<T: Trace> Heap<T> {
    /// Frees every object not reachable from `roots`.
    ///
    /// Stale handles among the roots are ignored.
    ///
    /// # Returns
    ///
    /// The number of objects freed.
    pub fn collect(&mut self, roots: impl IntoIterator<Item = ObjectId>) -> usize {
        self.stats.runs += 1;
        debug_assert_eq!(self.slots.len(), self.marks.len());

        let mut worklist = std::mem::take(&mut self.worklist);
        worklist.clear();
        worklist.extend(roots);

        // Mark.
        while let Some(id) = worklist.pop() {
            let Some(idx) = self.slot_index(id) else {
                continue;
            };
            if self.marks[idx] {
                continue;
            }
            self.marks[idx] = true;
            if let Some(value) = self.slots[idx].value.as_ref() {
                value.trace(&mut Tracer::new(&mut worklist));
            }
        }
        self.worklist = worklist;

        // Sweep.
        let mut freed = 0;
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            let marked = std::mem::replace(&mut self.marks[idx], false);
            if marked || slot.value.is_none() {
                continue;
            }
            slot.value = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(idx as u32);
            freed += 1;
        }

        self.stats.live -= freed;
        self.stats.last_freed = freed;
        self.stats.total_freed += freed;
        tracing::debug!(freed, live = self.stats.live, "garbage collection finished");
        freed
    }
}
