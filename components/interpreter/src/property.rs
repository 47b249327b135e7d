//! Named slots of an object.

use crate::function::NativeFn;
use crate::string_table::{names, StringKey};
use core_types::{ObjectId, PropFlags, Value};
use memory_manager::{Trace, Tracer};

/// Identity of a property: its name and optional namespace.
///
/// The lower-cased form of the name is carried along so that lookups
/// for SWF6 and older can compare without consulting the string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    /// Interned name as written
    pub name: StringKey,
    /// Interned lower-cased name
    pub folded: StringKey,
    /// Interned namespace, [`names::EMPTY`] when there is none
    pub namespace: StringKey,
}

impl PropertyKey {
    /// Compares two keys, ignoring case when `case_sensitive` is false.
    pub fn matches(&self, other: &PropertyKey, case_sensitive: bool) -> bool {
        if self.namespace != other.namespace {
            return false;
        }
        if case_sensitive {
            self.name == other.name
        } else {
            self.folded == other.folded
        }
    }

    /// Whether this key names the `__proto__` slot.
    pub fn is_proto(&self) -> bool {
        self.folded == names::PROTO && self.namespace == names::EMPTY
    }
}

/// Getter/setter pair backing an accessor property.
#[derive(Debug, Clone)]
pub enum Accessor {
    /// Script functions installed by `addProperty`.
    User {
        /// Getter function object
        getter: Option<ObjectId>,
        /// Setter function object
        setter: Option<ObjectId>,
        /// Last value seen; returned while the accessor is re-entered
        cache: Value,
        /// Set while the getter or setter is running
        being_accessed: bool,
    },
    /// Host callbacks.
    Native {
        /// Getter callback
        getter: NativeFn,
        /// Setter callback; writes are dropped without one
        setter: Option<NativeFn>,
    },
}

impl Accessor {
    /// Script accessor with an empty cache.
    pub fn user(getter: Option<ObjectId>, setter: Option<ObjectId>) -> Self {
        Accessor::User {
            getter,
            setter,
            cache: Value::Undefined,
            being_accessed: false,
        }
    }
}

/// What a property holds.
#[derive(Debug, Clone)]
pub enum Binding {
    /// A stored value.
    Value(Value),
    /// Computed through a getter and setter.
    Accessor(Accessor),
    /// Computed once by a native getter, then replaced by the result.
    Destructive(NativeFn),
}

/// A single named member of an object.
///
/// # Example
///
/// ```
/// use core_types::{PropFlags, Value};
/// use interpreter::property::{Binding, Property};
/// use interpreter::string_table::StringTable;
///
/// let mut strings = StringTable::new();
/// let name = strings.intern("x");
/// let key = interpreter::PropertyKey {
///     name,
///     folded: strings.folded(name),
///     namespace: interpreter::string_table::names::EMPTY,
/// };
/// let prop = Property::new(key, Binding::Value(Value::from(1.0)), PropFlags::READ_ONLY);
/// assert!(prop.flags.is_read_only());
/// ```
#[derive(Debug, Clone)]
pub struct Property {
    /// Name and namespace
    pub key: PropertyKey,
    /// Attribute bits
    pub flags: PropFlags,
    /// Stored value or accessor
    pub binding: Binding,
}

impl Property {
    /// Builds a property.
    pub fn new(key: PropertyKey, binding: Binding, flags: PropFlags) -> Self {
        Self {
            key,
            flags,
            binding,
        }
    }

    /// Whether the property is computed rather than stored.
    pub fn is_accessor(&self) -> bool {
        !matches!(self.binding, Binding::Value(_))
    }

    /// Stored value, or the accessor cache for script accessors.
    ///
    /// Never calls into script; used where a value is needed without
    /// side effects, such as watch triggers.
    pub fn cached_value(&self) -> Value {
        match &self.binding {
            Binding::Value(v) => v.clone(),
            Binding::Accessor(Accessor::User { cache, .. }) => cache.clone(),
            Binding::Accessor(Accessor::Native { .. }) | Binding::Destructive(_) => {
                Value::Undefined
            }
        }
    }
}

impl Trace for Property {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        match &self.binding {
            Binding::Value(v) => tracer.trace_value(v),
            Binding::Accessor(Accessor::User {
                getter,
                setter,
                cache,
                ..
            }) => {
                tracer.trace_opt(*getter);
                tracer.trace_opt(*setter);
                tracer.trace_value(cache);
            }
            Binding::Accessor(Accessor::Native { .. }) | Binding::Destructive(_) => {}
        }
    }
}
