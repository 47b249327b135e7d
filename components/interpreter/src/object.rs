//! Heap object layout.

use crate::function::Function;
use crate::property::PropertyKey;
use crate::property_list::PropertyList;
use core_types::{AvmString, ObjectId, PropFlags, Value};
use memory_manager::{Trace, Tracer};
use std::any::Any;
use std::fmt;

/// Native state attached to an object by a built-in class or the host.
///
/// The closed variants cover the state the core itself inspects. Anything
/// else goes into [`Relay::Host`] and is recovered with
/// [`Object::host_relay`].
pub enum Relay {
    /// Boxed boolean
    Boolean(bool),
    /// Boxed number
    Number(f64),
    /// Boxed string
    String(AvmString),
    /// Date, as milliseconds since the epoch
    Date(f64),
    /// Script view of a display object
    DisplayObject {
        /// Slash-free target path, e.g. `_level0.clip`
        target: AvmString,
    },
    /// Host-defined state
    Host(Box<dyn Any>),
}

impl fmt::Debug for Relay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relay::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Relay::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Relay::String(s) => f.debug_tuple("String").field(s).finish(),
            Relay::Date(t) => f.debug_tuple("Date").field(t).finish(),
            Relay::DisplayObject { target } => f
                .debug_struct("DisplayObject")
                .field("target", target)
                .finish(),
            Relay::Host(_) => write!(f, "Host(..)"),
        }
    }
}

/// A watch installed with `Object.prototype.watch`.
#[derive(Debug, Clone)]
pub struct Trigger {
    /// Function called as `f(name, old, new, user_data)`
    pub function: ObjectId,
    /// Extra argument passed to every call
    pub user_data: Value,
    /// Set while the trigger runs so that its own writes do not recurse
    pub executing: bool,
}

/// A script object.
///
/// Functions, `super` objects and display object views are all objects;
/// what sets them apart is the optional [`Function`] and [`Relay`].
#[derive(Debug)]
pub struct Object {
    /// Own properties
    pub properties: PropertyList,
    /// Prototype, exposed to scripts as `__proto__`
    pub proto: Option<ObjectId>,
    /// Attribute bits of the `__proto__` member
    pub proto_flags: PropFlags,
    /// Behaviour when called
    pub function: Option<Function>,
    /// Native state
    pub relay: Option<Relay>,
    /// Interfaces declared with `implements`
    pub interfaces: Vec<ObjectId>,
    /// Active watches by property
    pub watches: Vec<(PropertyKey, Trigger)>,
}

impl Object {
    /// Creates an empty object with the given prototype.
    pub fn new(proto: Option<ObjectId>) -> Self {
        Self {
            properties: PropertyList::new(),
            proto,
            proto_flags: PropFlags::NATIVE_DEFAULT,
            function: None,
            relay: None,
            interfaces: Vec::new(),
            watches: Vec::new(),
        }
    }

    /// Creates a callable object.
    pub fn with_function(proto: Option<ObjectId>, function: Function) -> Self {
        Self {
            function: Some(function),
            ..Self::new(proto)
        }
    }

    /// Whether the object can be called.
    pub fn is_callable(&self) -> bool {
        self.function.is_some()
    }

    /// Whether `typeof` reports `"function"`.
    pub fn is_function(&self) -> bool {
        self.function.as_ref().is_some_and(Function::is_function)
    }

    /// Whether the object is a display object view.
    pub fn is_display_object(&self) -> bool {
        matches!(self.relay, Some(Relay::DisplayObject { .. }))
    }

    /// Host relay downcast to `T`.
    pub fn host_relay<T: Any>(&self) -> Option<&T> {
        match &self.relay {
            Some(Relay::Host(state)) => state.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Mutable host relay downcast to `T`.
    pub fn host_relay_mut<T: Any>(&mut self) -> Option<&mut T> {
        match &mut self.relay {
            Some(Relay::Host(state)) => state.downcast_mut::<T>(),
            _ => None,
        }
    }

    /// Watch installed on `key`, if any.
    pub fn watch_position(&self, key: &PropertyKey, case_sensitive: bool) -> Option<usize> {
        self.watches
            .iter()
            .position(|(k, _)| k.matches(key, case_sensitive))
    }
}

impl Trace for Object {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        self.properties.trace(tracer);
        tracer.trace_opt(self.proto);
        if let Some(function) = &self.function {
            function.trace(tracer);
        }
        for id in &self.interfaces {
            tracer.trace_object(*id);
        }
        for (_, trigger) in &self.watches {
            tracer.trace_object(trigger.function);
            tracer.trace_value(&trigger.user_data);
        }
    }
}
