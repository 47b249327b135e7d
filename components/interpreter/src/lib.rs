//! AVM1 interpreter core
//!
//! This crate provides the runtime model ActionScript 1/2 bytecode runs
//! against:
//! - Dynamically typed [`core_types::Value`]s with the player's coercions
//! - Objects with prototype chains, flagged properties and host relays
//! - Native and script functions, including the `DefineFunction2`
//!   register preloading
//! - Call frames, scope chains, registers and variable resolution
//! - The operators whose semantics depend on the SWF version
//!
//! Instruction decoding and dispatch are left to an [`ActionExecutor`]
//! installed by the host.
//!
//! # Example
//!
//! ```
//! use core_types::Value;
//! use interpreter::{Interpreter, InterpreterConfig};
//!
//! let mut interp = Interpreter::new(InterpreterConfig::default().with_swf_version(6));
//! let obj = interp.create_object();
//! interp.set(obj, "n", Value::from("5")).unwrap();
//! let n = interp.get(obj, "n").unwrap();
//! let sum = interp.add(&n, &Value::from(1.0)).unwrap();
//! assert_eq!(sum, Value::from("51"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Reports a script mistake the player tolerates, such as calling a
/// non-function or writing a read-only member.
///
/// Only emitted when `verbose_as_coding_errors` is set.
macro_rules! coding_error {
    ($interp:expr, $($arg:tt)+) => {
        if $interp.config().verbose_as_coding_errors {
            tracing::warn!(target: "avm1::coding", $($arg)+);
        }
    };
}

/// Traces interpreter activity when `verbose_action` is set.
macro_rules! action_trace {
    ($interp:expr, $($arg:tt)+) => {
        if $interp.config().verbose_action {
            tracing::debug!(target: "avm1::action", $($arg)+);
        }
    };
}

pub mod call_frame;
pub mod class;
pub mod coercion;
pub mod config;
pub mod core_natives;
pub mod environment;
pub mod executor;
pub mod function;
pub mod gc_integration;
pub mod invoke;
pub mod members;
pub mod native;
pub mod object;
pub mod operators;
pub mod property;
pub mod property_list;
pub mod rng;
pub mod scope;
pub mod string_table;
pub mod vm;

// Re-export main types at crate root
pub use call_frame::CallFrame;
pub use config::InterpreterConfig;
pub use environment::parse_path;
pub use executor::{ActionExecutor, Activation};
pub use function::{FnCall, Function, NativeFn, NativeFunction, SuperBinding, UserFunction};
pub use invoke::{ImplicitBinding, PreloadPlan};
pub use native::NativeRegistry;
pub use object::{Object, Relay, Trigger};
pub use operators::{strict_equals, string_less_than};
pub use property::{Accessor, Binding, Property, PropertyKey};
pub use property_list::PropertyList;
pub use scope::ScopeStack;
pub use string_table::{StringKey, StringTable};
pub use vm::{Interpreter, GLOBAL_REGISTER_COUNT};
