//! Memory Manager - object arena and garbage collection
//!
//! This component provides:
//! - A slot arena addressed by generational [`ObjectId`] handles
//! - Tracing mark-and-sweep collection from an explicit root set
//! - The [`Trace`] trait objects implement to report outgoing references
//!
//! Handles survive `Vec` reallocation and detect reuse of a freed slot,
//! so object graphs may contain cycles without reference counting.
//!
//! [`ObjectId`]: core_types::ObjectId

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod heap;
pub mod trace;

pub use heap::{GcStats, Heap};
pub use trace::{Trace, Tracer};
