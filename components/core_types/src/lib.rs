//! Core AVM1 value types and error handling.
//!
//! This crate provides the foundational types shared by the interpreter
//! crates: value representation, object handles, property flags and the
//! error types that unwind through interpreter operations.
//!
//! # Overview
//!
//! - [`Value`] - Primitive or object handle held by scripts
//! - [`ObjectId`] - Generational handle into the object heap
//! - [`PropFlags`] - Per-property attribute and version-gate bits
//! - [`AvmError`] - Errors that unwind out of an operation
//! - [`RegistryError`] - Native function registry failures
//!
//! # Examples
//!
//! ```
//! use core_types::{number_to_string, Value};
//!
//! let v = Value::from(0.1 + 0.2);
//! assert_eq!(&*v.primitive_to_string(7), "0.3");
//! assert_eq!(number_to_string(1e21), "1e+21");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod flags;
mod handle;
mod number;
mod value;

pub use error::{AvmError, AvmResult, RegistryError};
pub use flags::PropFlags;
pub use handle::ObjectId;
pub use number::{number_to_string, number_to_string_radix, string_to_number, to_int32, to_uint32};
pub use value::{AvmString, PrimitiveHint, Value};

/// SWF version of the code being run. Many conversions depend on it.
pub type SwfVersion = u8;
