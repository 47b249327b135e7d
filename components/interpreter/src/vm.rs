//! The interpreter context.
//!
//! Main entry point for hosts and the action dispatcher: it owns the object
//! heap, operand stack, call stack, registers, native registry and the
//! remaining process-wide state of a running movie.

use crate::call_frame::CallFrame;
use crate::config::InterpreterConfig;
use crate::core_natives;
use crate::executor::{ActionExecutor, Activation};
use crate::function::NativeFn;
use crate::native::NativeRegistry;
use crate::object::{Object, Relay};
use crate::property::PropertyKey;
use crate::rng::Rng;
use crate::scope::ScopeStack;
use crate::string_table::{names, StringKey, StringTable};
use arrayvec::ArrayVec;
use bytecode_system::{CodeRange, ConstantPool};
use core_types::{AvmError, AvmResult, AvmString, ObjectId, RegistryError, Value};
use memory_manager::Heap;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

/// Number of registers shared by all code that has no local registers.
pub const GLOBAL_REGISTER_COUNT: usize = 4;

/// AVM1 interpreter state.
///
/// # Example
///
/// ```
/// use core_types::Value;
/// use interpreter::{Interpreter, InterpreterConfig};
///
/// let mut interp = Interpreter::new(InterpreterConfig::default().with_swf_version(7));
/// let obj = interp.create_object();
/// interp.set(obj, "x", Value::from(3.0)).unwrap();
/// assert_eq!(interp.get(obj, "x").unwrap(), Value::from(3.0));
/// ```
pub struct Interpreter {
    pub(crate) objects: Heap<Object>,
    pub(crate) strings: StringTable,
    config: InterpreterConfig,
    stack: Vec<Value>,
    pub(crate) call_stack: Vec<CallFrame>,
    global_registers: ArrayVec<Value, GLOBAL_REGISTER_COUNT>,
    natives: NativeRegistry,
    rng: Rng,
    start: Instant,
    constant_pool: Option<Rc<ConstantPool>>,
    pub(crate) global: ObjectId,
    pub(crate) object_proto: ObjectId,
    pub(crate) function_proto: ObjectId,
    pub(crate) root: Option<ObjectId>,
    pub(crate) target: Option<ObjectId>,
    pub(crate) original_target: Option<ObjectId>,
    pub(crate) root_scope: ScopeStack,
    executor: Option<Rc<dyn ActionExecutor>>,
    pub(crate) pinned: HashMap<ObjectId, usize>,
}

impl Interpreter {
    /// Creates an interpreter with the core prototypes, `_global` and a
    /// root movie object.
    pub fn new(config: InterpreterConfig) -> Self {
        let mut objects = Heap::new();
        let object_proto = objects.allocate(Object::new(None));
        let function_proto = objects.allocate(Object::new(Some(object_proto)));
        let global = objects.allocate(Object::new(Some(object_proto)));
        let mut root_obj = Object::new(Some(object_proto));
        root_obj.relay = Some(Relay::DisplayObject {
            target: Rc::from("_level0"),
        });
        let root = objects.allocate(root_obj);

        let rng = match config.rng_seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::from_clock(),
        };

        let mut global_registers = ArrayVec::new();
        for _ in 0..GLOBAL_REGISTER_COUNT {
            global_registers.push(Value::Undefined);
        }

        let mut interp = Self {
            objects,
            strings: StringTable::new(),
            config,
            stack: Vec::with_capacity(64),
            call_stack: Vec::with_capacity(32),
            global_registers,
            natives: NativeRegistry::new(),
            rng,
            start: Instant::now(),
            constant_pool: None,
            global,
            object_proto,
            function_proto,
            root: Some(root),
            target: Some(root),
            original_target: Some(root),
            root_scope: ScopeStack::new(),
            executor: None,
            pinned: HashMap::new(),
        };
        core_natives::install(&mut interp);
        tracing::debug!(
            swf_version = interp.config.swf_version,
            recursion_limit = interp.config.recursion_limit,
            "interpreter initialised"
        );
        interp
    }

    /// Active configuration.
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// SWF version of the running movie.
    pub fn swf_version(&self) -> u8 {
        self.config.swf_version
    }

    /// Switches the SWF version, e.g. when a movie of another version is
    /// loaded into a level.
    pub fn set_swf_version(&mut self, version: u8) {
        self.config.swf_version = version;
    }

    pub(crate) fn case_sensitive(&self) -> bool {
        self.config.swf_version >= 7
    }

    // ------------------------------------------------------------------
    // Strings and keys
    // ------------------------------------------------------------------

    /// Interns `name`.
    pub fn intern(&mut self, name: &str) -> StringKey {
        self.strings.intern(name)
    }

    /// Property key for `name` without a namespace.
    pub fn key(&mut self, name: &str) -> PropertyKey {
        let k = self.strings.intern(name);
        self.key_of(k)
    }

    /// Property key for an interned name.
    pub fn key_of(&self, name: StringKey) -> PropertyKey {
        PropertyKey {
            name,
            folded: self.strings.folded(name),
            namespace: names::EMPTY,
        }
    }

    /// Text of an interned name.
    pub fn string(&self, key: StringKey) -> AvmString {
        Rc::clone(self.strings.get(key))
    }

    /// The string table.
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    // ------------------------------------------------------------------
    // Heap
    // ------------------------------------------------------------------

    /// Borrows an object.
    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id)
    }

    /// Mutably borrows an object.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id)
    }

    /// Places `obj` on the heap.
    pub fn alloc(&mut self, obj: Object) -> ObjectId {
        self.objects.allocate(obj)
    }

    /// The object heap.
    pub fn heap(&self) -> &Heap<Object> {
        &self.objects
    }

    /// The `_global` object.
    pub fn global(&self) -> ObjectId {
        self.global
    }

    /// `Object.prototype`.
    pub fn object_prototype(&self) -> ObjectId {
        self.object_proto
    }

    /// `Function.prototype`.
    pub fn function_prototype(&self) -> ObjectId {
        self.function_proto
    }

    // ------------------------------------------------------------------
    // Targets
    // ------------------------------------------------------------------

    /// Root movie (`_root`), if any.
    pub fn root(&self) -> Option<ObjectId> {
        self.root
    }

    /// Replaces the root movie.
    pub fn set_root(&mut self, root: Option<ObjectId>) {
        self.root = root;
    }

    /// Current target, changed by `tellTarget`.
    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    /// Sets the current target.
    pub fn set_target(&mut self, target: Option<ObjectId>) {
        self.target = target;
    }

    /// Target the running code was attached to.
    pub fn original_target(&self) -> Option<ObjectId> {
        self.original_target
    }

    /// Sets the original target; also resets the current target.
    pub fn set_original_target(&mut self, target: Option<ObjectId>) {
        self.original_target = target;
        self.target = target;
    }

    // ------------------------------------------------------------------
    // Operand stack
    // ------------------------------------------------------------------

    /// Pushes onto the operand stack.
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Pops the operand stack; `undefined` when it is empty.
    pub fn pop(&mut self) -> Value {
        match self.stack.pop() {
            Some(v) => v,
            None => {
                coding_error!(self, "operand stack underflow");
                Value::Undefined
            }
        }
    }

    /// Value `dist` slots below the top; `undefined` when out of range.
    pub fn top(&self, dist: usize) -> Value {
        self.stack
            .len()
            .checked_sub(dist + 1)
            .and_then(|idx| self.stack.get(idx))
            .cloned()
            .unwrap_or_default()
    }

    /// Discards up to `count` values from the top.
    pub fn drop_values(&mut self, count: usize) {
        let keep = self.stack.len().saturating_sub(count);
        self.stack.truncate(keep);
    }

    /// Current operand stack height.
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn stack_values(&self) -> &[Value] {
        &self.stack
    }

    // ------------------------------------------------------------------
    // Registers
    // ------------------------------------------------------------------

    /// Reads register `index`.
    ///
    /// Uses the current frame's registers if it has any, the global
    /// registers otherwise.
    pub fn get_register(&self, index: usize) -> Option<Value> {
        match self.call_stack.last() {
            Some(frame) if frame.has_local_registers() => frame.register(index).cloned(),
            _ => self.global_registers.get(index).cloned(),
        }
    }

    /// Writes register `index`.
    ///
    /// # Returns
    ///
    /// `false` if the index is out of range; the write is dropped.
    pub fn set_register(&mut self, index: usize, value: Value) -> bool {
        if let Some(frame) = self.call_stack.last_mut() {
            if frame.has_local_registers() {
                return frame.set_register(index, value);
            }
        }
        match self.global_registers.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => {
                coding_error!(self, "register {} out of range", index);
                false
            }
        }
    }

    /// The four global registers.
    pub fn global_registers(&self) -> &[Value] {
        &self.global_registers
    }

    // ------------------------------------------------------------------
    // Call stack
    // ------------------------------------------------------------------

    /// Pushes a frame, enforcing the recursion limit.
    ///
    /// # Errors
    ///
    /// [`AvmError::ActionLimit`] if the push would reach the limit. The
    /// frame is not pushed.
    pub fn push_call_frame(&mut self, frame: CallFrame) -> AvmResult<()> {
        let limit = self.config.recursion_limit;
        if self.call_stack.len() + 1 >= limit {
            return Err(AvmError::action_limit(format!(
                "Max stack count reached ({})",
                self.call_stack.len()
            )));
        }
        action_trace!(self, depth = self.call_stack.len() + 1, "push call frame");
        self.call_stack.push(frame);
        Ok(())
    }

    /// Pops the top frame.
    pub fn pop_call_frame(&mut self) -> Option<CallFrame> {
        self.call_stack.pop()
    }

    /// Number of active frames.
    pub fn call_stack_depth(&self) -> usize {
        self.call_stack.len()
    }

    /// Top frame.
    pub fn current_frame(&self) -> Option<&CallFrame> {
        self.call_stack.last()
    }

    /// Mutable top frame.
    pub fn current_frame_mut(&mut self) -> Option<&mut CallFrame> {
        self.call_stack.last_mut()
    }

    // ------------------------------------------------------------------
    // Scope
    // ------------------------------------------------------------------

    /// Scope chain of the running code.
    pub fn current_scope(&self) -> &ScopeStack {
        match self.call_stack.last() {
            Some(frame) => &frame.scope,
            None => &self.root_scope,
        }
    }

    /// Enters a `with` block.
    pub fn push_scope(&mut self, obj: ObjectId) {
        match self.call_stack.last_mut() {
            Some(frame) => frame.scope.push(obj),
            None => self.root_scope.push(obj),
        }
    }

    /// Leaves a `with` block.
    pub fn pop_scope(&mut self) -> Option<ObjectId> {
        match self.call_stack.last_mut() {
            Some(frame) => frame.scope.pop(),
            None => self.root_scope.pop(),
        }
    }

    // ------------------------------------------------------------------
    // Natives
    // ------------------------------------------------------------------

    /// Registers a native under `(class_id, method_id)`.
    pub fn register_native(
        &mut self,
        class_id: u16,
        method_id: u16,
        func: NativeFn,
    ) -> Result<(), RegistryError> {
        self.natives.register(class_id, method_id, func)
    }

    /// Looks up a registered native.
    pub fn native(&self, class_id: u16, method_id: u16) -> Result<NativeFn, RegistryError> {
        self.natives.lookup(class_id, method_id)
    }

    /// The native registry.
    pub fn natives(&self) -> &NativeRegistry {
        &self.natives
    }

    // ------------------------------------------------------------------
    // Constant pool
    // ------------------------------------------------------------------

    /// Installs the pool declared by the last `ConstantPool` action.
    pub fn set_constant_pool(&mut self, pool: Rc<ConstantPool>) {
        self.constant_pool = Some(pool);
    }

    /// Current constant pool.
    pub fn constant_pool(&self) -> Option<&Rc<ConstantPool>> {
        self.constant_pool.as_ref()
    }

    /// Entry `index` of the current pool, `undefined` if missing.
    pub fn constant(&self, index: usize) -> Value {
        match self.constant_pool.as_ref().and_then(|pool| pool.get(index)) {
            Some(s) => Value::String(s),
            None => {
                coding_error!(self, "constant pool index {} out of range", index);
                Value::Undefined
            }
        }
    }

    // ------------------------------------------------------------------
    // Random numbers and clock
    // ------------------------------------------------------------------

    /// Uniform value in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        self.rng.next_f64()
    }

    /// Uniform integer in `[0, max)`, as returned by `random(max)`.
    pub fn random_below(&mut self, max: u32) -> u32 {
        self.rng.next_below(max)
    }

    /// Milliseconds since the interpreter started, as `getTimer()`.
    pub fn elapsed_millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Installs the action dispatcher.
    pub fn set_executor(&mut self, executor: Rc<dyn ActionExecutor>) {
        self.executor = Some(executor);
    }

    /// Builder form of [`set_executor`](Self::set_executor).
    pub fn with_executor(mut self, executor: Rc<dyn ActionExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub(crate) fn run_body(&mut self, activation: &Activation) -> AvmResult<Value> {
        let Some(executor) = self.executor.clone() else {
            tracing::warn!("no action executor installed; body not run");
            return Ok(Value::Undefined);
        };
        executor.execute(self, activation)
    }

    /// Runs top-level code, such as a frame action, in the current target.
    pub fn execute_code(&mut self, code: CodeRange, this: Option<ObjectId>) -> AvmResult<Value> {
        let activation = Activation {
            function: None,
            code,
            this,
            depth: self.call_stack.len(),
            swf_version: self.swf_version(),
        };
        self.run_body(&activation)
    }

    /// Runs one event handler and contains its failures.
    ///
    /// Whatever the handler leaves behind on error is unwound: frames
    /// above the entry depth are dropped, the operand stack is cut back and
    /// targets are restored. Limit errors are logged as errors and script
    /// exceptions that escaped every handler as warnings. The error is
    /// still returned so the host can tell the handler was abandoned.
    pub fn run_event<F>(&mut self, handler: F) -> AvmResult<Value>
    where
        F: FnOnce(&mut Interpreter) -> AvmResult<Value>,
    {
        let depth = self.call_stack.len();
        let stack_len = self.stack.len();
        let target = self.target;
        let original_target = self.original_target;

        let result = handler(self);

        if let Err(err) = &result {
            self.call_stack.truncate(depth);
            self.stack.truncate(stack_len);
            self.target = target;
            self.original_target = original_target;
            match err {
                AvmError::ActionLimit(msg) => {
                    tracing::error!("script aborted: {}", msg);
                }
                AvmError::Thrown(value) => {
                    tracing::warn!("uncaught script exception: {}", value);
                }
                AvmError::TypeError(msg) => {
                    tracing::warn!("unhandled type error: {}", msg);
                }
            }
        }
        result
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(InterpreterConfig::default())
    }
}
