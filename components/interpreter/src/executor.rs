//! Seam between the interpreter core and the action dispatcher.
//!
//! The core never decodes action bodies itself. When a user function is
//! called it binds arguments, pushes a frame, and hands the body to the
//! installed [`ActionExecutor`].

use crate::Interpreter;
use bytecode_system::CodeRange;
use core_types::{AvmResult, ObjectId, Value};

/// What the dispatcher needs to run one body.
#[derive(Debug, Clone)]
pub struct Activation {
    /// Function being run; `None` for top-level code
    pub function: Option<ObjectId>,
    /// Actions to run
    pub code: CodeRange,
    /// Receiver for `this`
    pub this: Option<ObjectId>,
    /// Call stack depth while the body runs
    pub depth: usize,
    /// SWF version of the running code
    pub swf_version: u8,
}

/// Runs action bodies on behalf of the interpreter.
///
/// Implemented for closures, which is convenient for hosts and tests:
///
/// ```
/// use std::rc::Rc;
/// use core_types::{AvmResult, Value};
/// use interpreter::{Activation, Interpreter};
///
/// let mut interp = Interpreter::default();
/// interp.set_executor(Rc::new(|_: &mut Interpreter, _: &Activation| -> AvmResult<Value> {
///     Ok(Value::from(1.0))
/// }));
/// ```
pub trait ActionExecutor {
    /// Runs `activation.code` to completion and returns its result.
    ///
    /// Name resolution, registers and `with` scopes go through `interp`,
    /// which already has the callee's frame on top of the call stack.
    fn execute(&self, interp: &mut Interpreter, activation: &Activation) -> AvmResult<Value>;
}

impl<F> ActionExecutor for F
where
    F: Fn(&mut Interpreter, &Activation) -> AvmResult<Value>,
{
    fn execute(&self, interp: &mut Interpreter, activation: &Activation) -> AvmResult<Value> {
        self(interp, activation)
    }
}
