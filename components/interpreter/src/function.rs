//! Callable objects: native, user-defined and `super`.

use crate::scope::ScopeStack;
use crate::Interpreter;
use bytecode_system::{CodeRange, FunctionSignature};
use core_types::{AvmResult, ObjectId, Value};
use memory_manager::{Trace, Tracer};
use std::rc::Rc;

/// Signature of a host function callable from scripts.
pub type NativeFn = fn(&mut Interpreter, &FnCall) -> AvmResult<Value>;

/// Arguments and receiver of one call.
///
/// # Example
///
/// ```
/// use core_types::Value;
/// use interpreter::FnCall;
///
/// let call = FnCall::new(None, vec![Value::from(1.0)]);
/// assert_eq!(call.arg(0), Value::from(1.0));
/// assert_eq!(call.arg(5), Value::Undefined);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FnCall {
    /// Receiver, absent for plain function calls
    pub this: Option<ObjectId>,
    /// Arguments in call order
    pub args: Vec<Value>,
    /// `super` object for the callee, if any
    pub super_obj: Option<ObjectId>,
    /// Function object being called
    pub callee: Option<ObjectId>,
}

impl FnCall {
    /// Call with a receiver and arguments.
    pub fn new(this: Option<ObjectId>, args: Vec<Value>) -> Self {
        Self {
            this,
            args,
            super_obj: None,
            callee: None,
        }
    }

    /// Attaches a `super` object.
    pub fn with_super(mut self, super_obj: Option<ObjectId>) -> Self {
        self.super_obj = super_obj;
        self
    }

    /// Argument `i`, or `undefined` when fewer were passed.
    pub fn arg(&self, i: usize) -> Value {
        self.args.get(i).cloned().unwrap_or_default()
    }

    /// Number of arguments passed.
    pub fn nargs(&self) -> usize {
        self.args.len()
    }

    /// Receiver as a value; `undefined` when absent.
    pub fn this_value(&self) -> Value {
        self.this.map(Value::Object).unwrap_or_default()
    }
}

/// Host function with its registry slot.
#[derive(Debug, Clone, Copy)]
pub struct NativeFunction {
    /// Callback
    pub func: NativeFn,
    /// `(class, method)` slot it was registered under, if any
    pub native_id: Option<(u16, u16)>,
}

/// Script function defined by `DefineFunction` or `DefineFunction2`.
#[derive(Debug, Clone)]
pub struct UserFunction {
    /// Declared parameters and calling convention
    pub signature: FunctionSignature,
    /// Function body
    pub body: CodeRange,
    /// Scope chain captured at definition
    pub scope: ScopeStack,
    /// Target that was current at definition
    pub target: Option<ObjectId>,
}

/// The object a constructor sees as `super`.
///
/// Calling it runs the parent constructor on the current `this`; member
/// lookups on it resolve through the parent prototype.
#[derive(Debug, Clone, Copy)]
pub struct SuperBinding {
    /// Parent constructor
    pub constructor: Option<ObjectId>,
    /// Prototype whose parent this binding represents
    pub base_proto: Option<ObjectId>,
}

/// What happens when an object is called.
#[derive(Debug, Clone)]
pub enum Function {
    /// Host callback run in the caller's frame.
    Native(NativeFunction),
    /// Script function run in a new frame.
    User(Rc<UserFunction>),
    /// Forwards to the parent constructor.
    Super(SuperBinding),
}

impl Function {
    /// Whether `typeof` reports `"function"` for this callable.
    pub fn is_function(&self) -> bool {
        !matches!(self, Function::Super(_))
    }
}

impl Trace for Function {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        match self {
            Function::Native(_) => {}
            Function::User(user) => {
                user.scope.trace(tracer);
                tracer.trace_opt(user.target);
            }
            Function::Super(binding) => {
                tracer.trace_opt(binding.constructor);
                tracer.trace_opt(binding.base_proto);
            }
        }
    }
}
