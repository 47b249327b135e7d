//! Generational handles into the object heap.

use std::fmt;

/// Handle to a heap-allocated object.
///
/// A handle pairs a slot index with the generation the slot had when the
/// object was allocated. Once the collector frees the slot its generation
/// is bumped, so a stale handle no longer resolves instead of aliasing a
/// newer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Builds a handle from its raw parts.
    ///
    /// # Arguments
    ///
    /// * `index` - Slot index in the heap
    /// * `generation` - Generation of the slot at allocation time
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the heap.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}
