//! Object and function factories, constructors, inheritance.

use crate::function::{FnCall, Function, NativeFn, NativeFunction, SuperBinding, UserFunction};
use crate::object::Object;
use crate::string_table::names;
use crate::Interpreter;
use bytecode_system::{CodeRange, FunctionSignature};
use core_types::{AvmResult, ObjectId, PropFlags, RegistryError, Value};
use std::collections::HashSet;
use std::rc::Rc;

impl Interpreter {
    /// Creates an empty object inheriting from `Object.prototype`.
    pub fn create_object(&mut self) -> ObjectId {
        let proto = self.object_proto;
        self.alloc(Object::new(Some(proto)))
    }

    /// Creates an empty object with an explicit prototype.
    pub fn create_object_with_proto(&mut self, proto: Option<ObjectId>) -> ObjectId {
        self.alloc(Object::new(proto))
    }

    /// Wraps a host callback in a function object.
    pub fn create_function(&mut self, func: NativeFn) -> ObjectId {
        self.alloc_native(func, None)
    }

    /// Function object for a registered native.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Missing`] if nothing is registered under the pair.
    pub fn get_native(&mut self, class_id: u16, method_id: u16) -> Result<ObjectId, RegistryError> {
        let func = self.native(class_id, method_id)?;
        Ok(self.alloc_native(func, Some((class_id, method_id))))
    }

    /// Like [`get_native`](Self::get_native), for calls coming from script:
    /// a missing entry is logged and gives `undefined`.
    pub fn native_value(&mut self, class_id: u16, method_id: u16) -> Value {
        match self.get_native(class_id, method_id) {
            Ok(func) => Value::Object(func),
            Err(err) => {
                coding_error!(self, "{}", err);
                Value::Undefined
            }
        }
    }

    fn alloc_native(&mut self, func: NativeFn, native_id: Option<(u16, u16)>) -> ObjectId {
        let proto = self.function_proto;
        self.alloc(Object::with_function(
            Some(proto),
            Function::Native(NativeFunction { func, native_id }),
        ))
    }

    /// Installs consecutive natives of `class_id` on `target`, as
    /// `ASSetNative` does.
    ///
    /// `members` is a comma-separated list of member names. A leading digit
    /// restricts the member to that SWF version and later, e.g.
    /// `"6push,pop"`.
    pub fn assign_natives(&mut self, target: ObjectId, class_id: u16, members: &str, first_method: u16) {
        for (offset, entry) in members.split(',').enumerate() {
            let entry = entry.trim();
            let (flags, name) = match entry.as_bytes().first() {
                Some(b'5') => (PropFlags::NONE, &entry[1..]),
                Some(b'6') => (PropFlags::ONLY_SWF6_UP, &entry[1..]),
                Some(b'7') => (PropFlags::ONLY_SWF7_UP, &entry[1..]),
                Some(b'8') => (PropFlags::ONLY_SWF8_UP, &entry[1..]),
                Some(b'9') => (PropFlags::ONLY_SWF9_UP, &entry[1..]),
                _ => (PropFlags::NONE, entry),
            };
            if name.is_empty() {
                continue;
            }
            let method_id = first_method.wrapping_add(offset as u16);
            match self.get_native(class_id, method_id) {
                Ok(func) => {
                    let key = self.key(name);
                    self.init_member(target, &key, Value::Object(func), flags | PropFlags::NATIVE_DEFAULT);
                }
                Err(err) => coding_error!(self, "ASSetNative '{}': {}", name, err),
            }
        }
    }

    /// Creates a script function capturing the current scope and target.
    ///
    /// The function gets a fresh `prototype` object whose `constructor`
    /// points back at it.
    pub fn create_user_function(&mut self, signature: FunctionSignature, body: CodeRange) -> ObjectId {
        let user = UserFunction {
            signature,
            body,
            scope: self.current_scope().clone(),
            target: self.target,
        };
        let proto = self.function_proto;
        let func = self.alloc(Object::with_function(
            Some(proto),
            Function::User(Rc::new(user)),
        ));
        let prototype = self.create_object();
        self.init_member_key(prototype, names::CONSTRUCTOR, Value::Object(func), PropFlags::DONT_ENUM);
        self.init_member_key(func, names::PROTOTYPE, Value::Object(prototype), PropFlags::NATIVE_DEFAULT);
        func
    }

    /// Links a constructor and its prototype both ways.
    pub fn create_class(&mut self, ctor: ObjectId, proto: ObjectId) -> ObjectId {
        self.init_member_key(ctor, names::PROTOTYPE, Value::Object(proto), PropFlags::NATIVE_DEFAULT);
        self.init_member_key(proto, names::CONSTRUCTOR, Value::Object(ctor), PropFlags::DONT_ENUM);
        ctor
    }

    /// `new ctor(args)`.
    ///
    /// The instance inherits from `ctor.prototype` and records its
    /// constructor. The constructor runs with the instance as `this` and
    /// a `super` bound to the parent class. A native constructor that
    /// returns an object replaces the instance.
    pub fn construct_instance(&mut self, ctor: ObjectId, args: Vec<Value>) -> AvmResult<ObjectId> {
        let version = self.swf_version();
        let proto = match self.get_by_key(ctor, names::PROTOTYPE)? {
            Value::Object(proto) => proto,
            _ => self.object_proto,
        };
        let instance = self.alloc(Object::new(Some(proto)));
        let ctor_value = Value::Object(ctor);
        self.init_member_key(
            instance,
            names::UU_CONSTRUCTOR,
            ctor_value.clone(),
            PropFlags::DONT_ENUM | PropFlags::ONLY_SWF6_UP,
        );
        if version < 7 {
            self.init_member_key(instance, names::CONSTRUCTOR, ctor_value, PropFlags::DONT_ENUM);
        }

        let is_native = matches!(
            self.objects.get(ctor).and_then(|o| o.function.as_ref()),
            Some(Function::Native(_))
        );
        let super_obj = self.get_super(instance);
        let call = FnCall::new(Some(instance), args).with_super(super_obj);
        // Keep the instance alive across collections triggered by the body.
        self.pin(instance);
        let result = self.call(ctor, call);
        self.unpin(instance);
        let result = result?;

        if is_native {
            if let Value::Object(replacement) = result {
                return Ok(replacement);
            }
        }
        Ok(instance)
    }

    /// `super` object for methods running on `this`.
    pub fn get_super(&mut self, this: ObjectId) -> Option<ObjectId> {
        let proto = self.objects.get(this)?.proto;
        self.make_super(proto)
    }

    /// Super object representing the parent of prototype `base`.
    ///
    /// Its own prototype is `base.__proto__`, so member lookups find the
    /// parent class's methods; calling it runs `base.__constructor__`.
    pub fn make_super(&mut self, base: Option<ObjectId>) -> Option<ObjectId> {
        let base = base?;
        let parent = self.objects.get(base)?.proto;
        let ctor_key = self.key_of(names::UU_CONSTRUCTOR);
        let constructor = self
            .own_property(base, &ctor_key)
            .and_then(|p| p.cached_value().as_object());
        let binding = SuperBinding {
            constructor,
            base_proto: Some(base),
        };
        Some(self.alloc(Object::with_function(parent, Function::Super(binding))))
    }

    /// `sub extends sup`: gives `sub` a new prototype inheriting from
    /// `sup.prototype`.
    pub fn extends(&mut self, sub: ObjectId, sup: ObjectId) -> AvmResult<()> {
        let super_proto = self.get_by_key(sup, names::PROTOTYPE)?.as_object();
        let proto = self.alloc(Object::new(super_proto));
        if self.swf_version() > 5 {
            self.init_member_key(proto, names::UU_CONSTRUCTOR, Value::Object(sup), PropFlags::DONT_ENUM);
        }
        self.init_member_key(sub, names::PROTOTYPE, Value::Object(proto), PropFlags::NATIVE_DEFAULT);
        Ok(())
    }

    /// Declares that instances of `ctor` implement each interface.
    pub fn implements(&mut self, ctor: ObjectId, interfaces: &[ObjectId]) -> AvmResult<()> {
        let Value::Object(proto) = self.get_by_key(ctor, names::PROTOTYPE)? else {
            coding_error!(self, "implements: constructor has no prototype");
            return Ok(());
        };
        let mut protos = Vec::with_capacity(interfaces.len());
        for iface in interfaces {
            match self.get_by_key(*iface, names::PROTOTYPE)? {
                Value::Object(p) => protos.push(p),
                _ => coding_error!(self, "implements: interface has no prototype"),
            }
        }
        if let Some(o) = self.objects.get_mut(proto) {
            o.interfaces.extend(protos);
        }
        Ok(())
    }

    /// `obj instanceof ctor`.
    ///
    /// True if `ctor.prototype` is on `obj`'s prototype chain or is an
    /// interface declared by one of the prototypes on it.
    pub fn instance_of(&mut self, obj: ObjectId, ctor: ObjectId) -> AvmResult<bool> {
        let Value::Object(target) = self.get_by_key(ctor, names::PROTOTYPE)? else {
            return Ok(false);
        };
        let mut visited = HashSet::new();
        let mut current = self.objects.get(obj).and_then(|o| o.proto);
        while let Some(proto) = current {
            if proto == target {
                return Ok(true);
            }
            if !visited.insert(proto) {
                break;
            }
            let Some(o) = self.objects.get(proto) else {
                break;
            };
            if o.interfaces.contains(&target) {
                return Ok(true);
            }
            current = o.proto;
        }
        Ok(false)
    }

    /// Whether `proto` is on `obj`'s prototype chain.
    pub fn is_prototype_of(&self, proto: ObjectId, obj: ObjectId) -> bool {
        let mut visited = HashSet::new();
        let mut current = self.objects.get(obj).and_then(|o| o.proto);
        while let Some(p) = current {
            if p == proto {
                return true;
            }
            if !visited.insert(p) {
                return false;
            }
            current = self.objects.get(p).and_then(|o| o.proto);
        }
        false
    }
}
