//! Calling functions.
//!
//! Natives run directly in the caller's frame. User functions get a fresh
//! [`CallFrame`] whose locals and registers are filled in before the body
//! is handed to the installed executor.

use crate::call_frame::CallFrame;
use crate::executor::Activation;
use crate::function::{FnCall, Function, SuperBinding, UserFunction};
use crate::object::Object;
use crate::scope::ScopeStack;
use crate::string_table::{names, StringKey};
use crate::Interpreter;
use arrayvec::ArrayVec;
use bytecode_system::{Dialect, Function2Flags, Param};
use core_types::{AvmResult, ObjectId, PropFlags, Value};
use std::rc::Rc;

/// How one implicit value is made available to a function2 body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplicitBinding {
    /// Not bound at all.
    Suppressed,
    /// Bound as a local variable.
    Local,
    /// Bound into the next free register.
    Register,
    /// An empty `arguments` object in the next free register.
    EmptyRegister,
}

impl ImplicitBinding {
    /// Binding of `this`, `arguments` or `super` from its flag pair.
    pub fn from_flags(flags: Function2Flags, preload: Function2Flags, suppress: Function2Flags) -> Self {
        match (flags.contains(preload), flags.contains(suppress)) {
            (_, true) => ImplicitBinding::Suppressed,
            (true, false) => ImplicitBinding::Register,
            (false, false) => ImplicitBinding::Local,
        }
    }

    /// Binding of `arguments`, which still fills its register with an
    /// empty object when both flags are set.
    pub fn for_arguments(flags: Function2Flags) -> Self {
        if flags.contains(Function2Flags::PRELOAD_ARGUMENTS)
            && flags.contains(Function2Flags::SUPPRESS_ARGUMENTS)
        {
            return ImplicitBinding::EmptyRegister;
        }
        Self::from_flags(
            flags,
            Function2Flags::PRELOAD_ARGUMENTS,
            Function2Flags::SUPPRESS_ARGUMENTS,
        )
    }

    /// Binding of a register-only value (`_root`, `_parent`, `_global`).
    pub fn register_only(flags: Function2Flags, preload: Function2Flags) -> Self {
        if flags.contains(preload) {
            ImplicitBinding::Register
        } else {
            ImplicitBinding::Suppressed
        }
    }

    fn uses_register(self) -> bool {
        matches!(self, ImplicitBinding::Register | ImplicitBinding::EmptyRegister)
    }
}

/// Implicit values in preload order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Implicit {
    This,
    Arguments,
    Super,
    Root,
    Parent,
    Global,
}

/// Per-call binding plan for a function2 body.
#[derive(Debug, Clone)]
pub struct PreloadPlan {
    slots: ArrayVec<(Implicit, ImplicitBinding), 6>,
}

impl PreloadPlan {
    /// Evaluates the flags once for a call in `version`.
    pub fn new(flags: Function2Flags, version: u8) -> Self {
        let super_binding = if version > 5 {
            ImplicitBinding::from_flags(
                flags,
                Function2Flags::PRELOAD_SUPER,
                Function2Flags::SUPPRESS_SUPER,
            )
        } else {
            ImplicitBinding::Suppressed
        };
        let mut slots = ArrayVec::new();
        slots.push((
            Implicit::This,
            ImplicitBinding::from_flags(
                flags,
                Function2Flags::PRELOAD_THIS,
                Function2Flags::SUPPRESS_THIS,
            ),
        ));
        slots.push((Implicit::Arguments, ImplicitBinding::for_arguments(flags)));
        slots.push((Implicit::Super, super_binding));
        slots.push((
            Implicit::Root,
            ImplicitBinding::register_only(flags, Function2Flags::PRELOAD_ROOT),
        ));
        slots.push((
            Implicit::Parent,
            ImplicitBinding::register_only(flags, Function2Flags::PRELOAD_PARENT),
        ));
        slots.push((
            Implicit::Global,
            ImplicitBinding::register_only(flags, Function2Flags::PRELOAD_GLOBAL),
        ));
        Self { slots }
    }

    /// Binding of `this`.
    pub fn this(&self) -> ImplicitBinding {
        self.slots[0].1
    }

    /// Binding of `arguments`.
    pub fn arguments(&self) -> ImplicitBinding {
        self.slots[1].1
    }

    /// Binding of `super`.
    pub fn super_binding(&self) -> ImplicitBinding {
        self.slots[2].1
    }

    /// Number of registers the preloads may take.
    pub fn register_slots(&self) -> usize {
        self.slots.iter().filter(|(_, b)| b.uses_register()).count()
    }
}

impl Interpreter {
    /// Calls `func` with a receiver and arguments.
    ///
    /// Calling something that is not a function logs a coding error and
    /// yields `undefined`.
    pub fn call_function(
        &mut self,
        func: ObjectId,
        this: Option<ObjectId>,
        args: Vec<Value>,
    ) -> AvmResult<Value> {
        self.call(func, FnCall::new(this, args))
    }

    /// Calls a value; non-objects log a coding error and yield `undefined`.
    pub fn call_value(
        &mut self,
        func: &Value,
        this: Option<ObjectId>,
        args: Vec<Value>,
    ) -> AvmResult<Value> {
        match func {
            Value::Object(id) => self.call_function(*id, this, args),
            other => {
                coding_error!(self, "attempt to call a non-function value {}", other);
                Ok(Value::Undefined)
            }
        }
    }

    /// Calls the method `name` of `obj` with `obj` as receiver.
    pub fn call_method(&mut self, obj: ObjectId, name: &str, args: Vec<Value>) -> AvmResult<Value> {
        let method = self.get(obj, name)?;
        self.call_value(&method, Some(obj), args)
    }

    /// Calls `func` with a fully specified call record.
    pub fn call(&mut self, func: ObjectId, mut call: FnCall) -> AvmResult<Value> {
        let Some(function) = self.objects.get(func).and_then(|o| o.function.clone()) else {
            coding_error!(self, "attempt to call non-function object {}", func);
            return Ok(Value::Undefined);
        };
        call.callee = Some(func);
        match function {
            Function::Native(native) => (native.func)(self, &call),
            Function::User(user) => self.call_user(func, &user, call),
            Function::Super(binding) => self.call_super(binding, call),
        }
    }

    /// Runs the parent constructor on the current receiver.
    fn call_super(&mut self, binding: SuperBinding, call: FnCall) -> AvmResult<Value> {
        let Some(ctor) = binding.constructor else {
            coding_error!(self, "super constructor is not defined");
            return Ok(Value::Undefined);
        };
        let parent = binding
            .base_proto
            .and_then(|base| self.objects.get(base))
            .and_then(|o| o.proto);
        let nested = self.make_super(parent);
        self.call(ctor, FnCall::new(call.this, call.args).with_super(nested))
    }

    fn call_user(&mut self, func: ObjectId, user: &Rc<UserFunction>, call: FnCall) -> AvmResult<Value> {
        let version = self.swf_version();
        let caller = self.call_stack.last().and_then(|frame| frame.function);

        let locals = self.alloc(Object::new(None));
        let mut scope = ScopeStack::new();
        if version >= 6 {
            scope = user.scope.clone();
            scope.push(locals);
        }

        let plan = match user.signature.dialect() {
            Dialect::Function2(flags) => Some(PreloadPlan::new(flags, version)),
            Dialect::Conventional => None,
        };
        let register_count = match &plan {
            Some(plan) => {
                let explicit = user
                    .signature
                    .params()
                    .iter()
                    .filter_map(|p| match p {
                        Param::Register(r) => Some(*r as usize + 1),
                        Param::Named(_) => None,
                    })
                    .max()
                    .unwrap_or(0);
                (user.signature.register_count() as usize)
                    .max(plan.register_slots() + 1)
                    .max(explicit)
            }
            None => 0,
        };

        self.push_call_frame(
            CallFrame::new(Some(func), locals, register_count, scope).with_this(call.this),
        )?;

        let saved_target = self.target;
        let saved_original = self.original_target;
        let mut target = user.target.or(self.target);
        let mut original = user.target.or(self.original_target);
        if version <= 5 {
            if let Some(this) = call.this {
                if self.objects.get(this).is_some_and(Object::is_display_object) {
                    target = Some(this);
                    original = Some(this);
                }
            }
        }
        self.target = target;
        self.original_target = original;

        let result = self.bind_and_run(func, user, &call, locals, caller, plan.as_ref());

        self.target = saved_target;
        self.original_target = saved_original;
        self.pop_call_frame();
        result
    }

    fn bind_and_run(
        &mut self,
        func: ObjectId,
        user: &Rc<UserFunction>,
        call: &FnCall,
        locals: ObjectId,
        caller: Option<ObjectId>,
        plan: Option<&PreloadPlan>,
    ) -> AvmResult<Value> {
        let version = self.swf_version();
        match plan {
            None => {
                for (i, param) in user.signature.params().iter().enumerate() {
                    if let Param::Named(name) = param {
                        let key = self.intern(name);
                        if i < call.nargs() {
                            self.set_local_key(locals, key, call.arg(i));
                        } else {
                            self.declare_local_key(locals, key);
                        }
                    }
                }
                self.set_local_key(locals, names::THIS, call.this_value());
                if version > 5 {
                    if let Some(super_obj) = call.super_obj {
                        self.set_local_key(locals, names::SUPER, Value::Object(super_obj));
                    }
                }
                let arguments = self.make_arguments(func, &call.args, caller);
                self.set_local_key(locals, names::ARGUMENTS, Value::Object(arguments));
            }
            Some(plan) => {
                self.preload(plan, func, call, locals, caller)?;
                for (i, param) in user.signature.params().iter().enumerate() {
                    match param {
                        Param::Named(name) => {
                            let key = self.intern(name);
                            if i < call.nargs() {
                                self.set_local_key(locals, key, call.arg(i));
                            } else {
                                self.declare_local_key(locals, key);
                            }
                        }
                        Param::Register(reg) => {
                            if i < call.nargs() {
                                self.set_register(*reg as usize, call.arg(i));
                            }
                        }
                    }
                }
            }
        }

        let activation = Activation {
            function: Some(func),
            code: user.body.clone(),
            this: call.this,
            depth: self.call_stack.len(),
            swf_version: version,
        };
        action_trace!(self, depth = activation.depth, "running user function {}", func);
        self.run_body(&activation)
    }

    fn preload(
        &mut self,
        plan: &PreloadPlan,
        func: ObjectId,
        call: &FnCall,
        locals: ObjectId,
        caller: Option<ObjectId>,
    ) -> AvmResult<()> {
        let mut next_register = 1usize;
        for (implicit, binding) in plan.slots.iter().copied() {
            if binding == ImplicitBinding::Suppressed {
                continue;
            }
            let value = match implicit {
                Implicit::This => call.this_value(),
                Implicit::Arguments => {
                    let args: &[Value] = if binding == ImplicitBinding::EmptyRegister {
                        &[]
                    } else {
                        &call.args
                    };
                    Value::Object(self.make_arguments(func, args, caller))
                }
                Implicit::Super => match call.super_obj {
                    Some(super_obj) => Value::Object(super_obj),
                    None => continue,
                },
                Implicit::Root => match self.root {
                    Some(root) => Value::Object(root),
                    None => continue,
                },
                Implicit::Parent => {
                    let key = self.key_of(names::PARENT);
                    self.get_variable_key(&key)?
                }
                Implicit::Global => Value::Object(self.global),
            };
            match binding {
                ImplicitBinding::Local => {
                    let name = match implicit {
                        Implicit::This => names::THIS,
                        Implicit::Arguments => names::ARGUMENTS,
                        _ => names::SUPER,
                    };
                    self.set_local_key(locals, name, value);
                }
                ImplicitBinding::Register | ImplicitBinding::EmptyRegister => {
                    self.set_register(next_register, value);
                    next_register += 1;
                }
                ImplicitBinding::Suppressed => {}
            }
        }
        Ok(())
    }

    /// Builds the `arguments` object of a call.
    ///
    /// Holds the arguments as indexed members plus `length`, `callee` and
    /// `caller`; `caller` is `null` for calls from top-level code.
    pub fn make_arguments(
        &mut self,
        callee: ObjectId,
        args: &[Value],
        caller: Option<ObjectId>,
    ) -> ObjectId {
        let proto = self.array_prototype();
        let arguments = self.alloc(Object::new(Some(proto)));
        for (i, arg) in args.iter().enumerate() {
            let key = self.key(&i.to_string());
            self.init_member(arguments, &key, arg.clone(), PropFlags::DEFAULT);
        }
        self.init_member_key(arguments, names::LENGTH, Value::from(args.len()), PropFlags::NATIVE_DEFAULT);
        self.init_member_key(arguments, names::CALLEE, Value::Object(callee), PropFlags::NATIVE_DEFAULT);
        self.init_member_key(arguments, names::CALLER, Value::from(caller), PropFlags::NATIVE_DEFAULT);
        arguments
    }

    fn array_prototype(&mut self) -> ObjectId {
        let global = self.global;
        let key = self.key_of(names::ARRAY);
        let ctor = self
            .own_property(global, &key)
            .map(|p| p.cached_value())
            .and_then(|v| v.as_object());
        let proto_key = self.key_of(names::PROTOTYPE);
        ctor.and_then(|c| self.own_property(c, &proto_key))
            .and_then(|p| p.cached_value().as_object())
            .unwrap_or(self.object_proto)
    }

    fn set_local_key(&mut self, locals: ObjectId, name: StringKey, value: Value) {
        let key = self.key_of(name);
        self.init_member(locals, &key, value, PropFlags::DEFAULT);
    }

    fn declare_local_key(&mut self, locals: ObjectId, name: StringKey) {
        let key = self.key_of(name);
        if self.own_property(locals, &key).is_none() {
            self.init_member(locals, &key, Value::Undefined, PropFlags::DEFAULT);
        }
    }
}
