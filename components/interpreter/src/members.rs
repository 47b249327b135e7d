//! Member access: lookup through prototypes, accessors, watches and flags.

use crate::function::{FnCall, NativeFn};
use crate::object::Trigger;
use crate::property::{Accessor, Binding, Property, PropertyKey};
use crate::property_list::Deletion;
use crate::string_table::{names, StringKey};
use crate::Interpreter;
use core_types::{AvmError, AvmResult, AvmString, ObjectId, PropFlags, Value};
use std::collections::HashSet;

impl Interpreter {
    /// Finds the object in `obj`'s prototype chain holding a property
    /// visible to the running version.
    ///
    /// # Errors
    ///
    /// [`AvmError::ActionLimit`] if the chain is longer than the configured
    /// prototype depth. Cycles end the walk without error.
    pub fn find_property(&self, obj: ObjectId, key: &PropertyKey) -> AvmResult<Option<ObjectId>> {
        let version = self.swf_version();
        let case_sensitive = self.case_sensitive();
        let limit = self.config().prototype_depth_for(version);

        let mut visited = HashSet::new();
        let mut current = Some(obj);
        let mut depth = 0usize;
        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            let Some(o) = self.objects.get(id) else {
                break;
            };
            if let Some(prop) = o.properties.get(key, case_sensitive) {
                if prop.flags.is_visible(version) {
                    return Ok(Some(id));
                }
            }
            current = o.proto;
            depth += 1;
            if depth > limit {
                return Err(AvmError::action_limit(format!(
                    "Lookup depth exceeded ({})",
                    limit
                )));
            }
        }
        Ok(None)
    }

    /// Own property of `obj`, ignoring visibility.
    pub fn own_property(&self, obj: ObjectId, key: &PropertyKey) -> Option<&Property> {
        self.objects
            .get(obj)?
            .properties
            .get(key, self.case_sensitive())
    }

    fn own_property_mut(&mut self, obj: ObjectId, key: &PropertyKey) -> Option<&mut Property> {
        let case_sensitive = self.case_sensitive();
        self.objects
            .get_mut(obj)?
            .properties
            .get_mut(key, case_sensitive)
    }

    /// Reads a member, walking the prototype chain and running getters.
    ///
    /// # Returns
    ///
    /// `None` if no visible property exists.
    pub fn get_member(&mut self, obj: ObjectId, key: &PropertyKey) -> AvmResult<Option<Value>> {
        if key.is_proto() {
            let version = self.swf_version();
            return Ok(self.objects.get(obj).and_then(|o| {
                if o.proto_flags.is_visible(version) {
                    o.proto.map(Value::Object)
                } else {
                    None
                }
            }));
        }
        match self.find_property(obj, key)? {
            Some(owner) => self.read_property(owner, obj, key).map(Some),
            None => Ok(None),
        }
    }

    /// Reads a member by name; `undefined` when absent.
    pub fn get(&mut self, obj: ObjectId, name: &str) -> AvmResult<Value> {
        let key = self.key(name);
        Ok(self.get_member(obj, &key)?.unwrap_or_default())
    }

    /// Reads a member by interned name; `undefined` when absent.
    pub fn get_by_key(&mut self, obj: ObjectId, name: StringKey) -> AvmResult<Value> {
        let key = self.key_of(name);
        Ok(self.get_member(obj, &key)?.unwrap_or_default())
    }

    /// Produces the value of `owner`'s property `key` as seen from
    /// `receiver`, running accessors with `receiver` as `this`.
    fn read_property(
        &mut self,
        owner: ObjectId,
        receiver: ObjectId,
        key: &PropertyKey,
    ) -> AvmResult<Value> {
        let Some(prop) = self.own_property(owner, key) else {
            return Ok(Value::Undefined);
        };
        match prop.binding.clone() {
            Binding::Value(v) => Ok(v),
            Binding::Accessor(Accessor::User {
                getter,
                cache,
                being_accessed,
                ..
            }) => {
                let Some(getter) = getter else {
                    return Ok(Value::Undefined);
                };
                if being_accessed {
                    return Ok(cache);
                }
                self.set_accessor_lock(owner, key, true);
                let result = self.call_function(getter, Some(receiver), Vec::new());
                self.set_accessor_lock(owner, key, false);
                if let Ok(v) = &result {
                    self.store_accessor_cache(owner, key, v.clone());
                }
                result
            }
            Binding::Accessor(Accessor::Native { getter, .. }) => {
                getter(self, &FnCall::new(Some(receiver), Vec::new()))
            }
            Binding::Destructive(getter) => {
                let value = getter(self, &FnCall::new(Some(receiver), Vec::new()))?;
                if let Some(prop) = self.own_property_mut(owner, key) {
                    prop.binding = Binding::Value(value.clone());
                }
                Ok(value)
            }
        }
    }

    fn set_accessor_lock(&mut self, owner: ObjectId, key: &PropertyKey, locked: bool) {
        if let Some(Property {
            binding: Binding::Accessor(Accessor::User { being_accessed, .. }),
            ..
        }) = self.own_property_mut(owner, key)
        {
            *being_accessed = locked;
        }
    }

    fn store_accessor_cache(&mut self, owner: ObjectId, key: &PropertyKey, value: Value) {
        if let Some(Property {
            binding: Binding::Accessor(Accessor::User { cache, .. }),
            ..
        }) = self.own_property_mut(owner, key)
        {
            *cache = value;
        }
    }

    /// Assigns a member as script assignment does.
    ///
    /// Read-only properties ignore the write. An inherited accessor or
    /// static property is written through rather than shadowed. Watches on
    /// `obj` see the old and new value and may replace the new one.
    pub fn set_member(&mut self, obj: ObjectId, key: &PropertyKey, value: Value) -> AvmResult<()> {
        let version = self.swf_version();
        if self.objects.get(obj).is_none() {
            coding_error!(self, "assignment to member of a dead object {}", obj);
            return Ok(());
        }

        if key.is_proto() {
            if let Some(o) = self.objects.get_mut(obj) {
                if o.proto_flags.is_read_only() {
                    return Ok(());
                }
                o.proto = value.as_object();
                o.proto_flags.clear_visible(version);
            }
            return Ok(());
        }

        let updatable = match self.own_property(obj, key) {
            Some(prop) => Some((obj, prop.flags)),
            None => match self.find_property(obj, key)? {
                Some(owner) => self
                    .own_property(owner, key)
                    .filter(|p| p.is_accessor() || p.flags.is_static())
                    .map(|p| (owner, p.flags)),
                None => None,
            },
        };

        match updatable {
            Some((owner, flags)) => {
                if flags.is_read_only() {
                    let name = self.string(key.name);
                    coding_error!(self, "attempt to write read-only property '{}'", name);
                    return Ok(());
                }
                let old = self
                    .own_property(owner, key)
                    .map(Property::cached_value)
                    .unwrap_or_default();
                let value = match self.fire_watch(obj, key, old, value.clone())? {
                    Some(new) => {
                        // The trigger may have deleted the property.
                        if self.own_property(owner, key).is_none() {
                            return Ok(());
                        }
                        new
                    }
                    None => value,
                };
                self.write_property(owner, obj, key, value)
            }
            None => {
                let value = self
                    .fire_watch(obj, key, Value::Undefined, value.clone())?
                    .unwrap_or(value);
                let case_sensitive = self.case_sensitive();
                if let Some(o) = self.objects.get_mut(obj) {
                    o.properties.insert(
                        Property::new(*key, Binding::Value(value), PropFlags::DEFAULT),
                        case_sensitive,
                    );
                }
                Ok(())
            }
        }
    }

    /// Assigns a member by name.
    pub fn set(&mut self, obj: ObjectId, name: &str, value: Value) -> AvmResult<()> {
        let key = self.key(name);
        self.set_member(obj, &key, value)
    }

    /// Updates an existing member of `obj` without creating one.
    ///
    /// # Returns
    ///
    /// Whether a property was found to update.
    pub fn update_member(&mut self, obj: ObjectId, key: &PropertyKey, value: Value) -> AvmResult<bool> {
        if key.is_proto() {
            self.set_member(obj, key, value)?;
            return Ok(true);
        }
        if self.find_property(obj, key)?.is_none() {
            return Ok(false);
        }
        self.set_member(obj, key, value)?;
        Ok(true)
    }

    fn write_property(
        &mut self,
        owner: ObjectId,
        receiver: ObjectId,
        key: &PropertyKey,
        value: Value,
    ) -> AvmResult<()> {
        let version = self.swf_version();
        let Some(prop) = self.own_property_mut(owner, key) else {
            return Ok(());
        };
        prop.flags.clear_visible(version);
        match prop.binding.clone() {
            Binding::Value(_) | Binding::Destructive(_) => {
                prop.binding = Binding::Value(value);
                Ok(())
            }
            Binding::Accessor(Accessor::User {
                setter,
                being_accessed,
                ..
            }) => {
                if being_accessed {
                    self.store_accessor_cache(owner, key, value);
                    return Ok(());
                }
                let Some(setter) = setter else {
                    return Ok(());
                };
                self.set_accessor_lock(owner, key, true);
                let result = self.call_function(setter, Some(receiver), vec![value]);
                self.set_accessor_lock(owner, key, false);
                result.map(|_| ())
            }
            Binding::Accessor(Accessor::Native { setter, .. }) => match setter {
                Some(setter) => setter(self, &FnCall::new(Some(receiver), vec![value])).map(|_| ()),
                None => Ok(()),
            },
        }
    }

    /// Runs the watch on `obj.key`, if any.
    ///
    /// # Returns
    ///
    /// The value to store, or `None` when no watch is installed.
    fn fire_watch(
        &mut self,
        obj: ObjectId,
        key: &PropertyKey,
        old: Value,
        new: Value,
    ) -> AvmResult<Option<Value>> {
        let case_sensitive = self.case_sensitive();
        let Some(o) = self.objects.get_mut(obj) else {
            return Ok(None);
        };
        let Some(pos) = o.watch_position(key, case_sensitive) else {
            return Ok(None);
        };
        let trigger = &mut o.watches[pos].1;
        if trigger.executing {
            return Ok(Some(new));
        }
        trigger.executing = true;
        let function = trigger.function;
        let user_data = trigger.user_data.clone();

        let name = Value::String(self.string(key.name));
        let result = self.call_function(function, Some(obj), vec![name, old, new, user_data]);

        if let Some(o) = self.objects.get_mut(obj) {
            if let Some(pos) = o.watch_position(key, case_sensitive) {
                o.watches[pos].1.executing = false;
            }
        }
        result.map(Some)
    }

    /// Installs or replaces the member `key` regardless of its flags.
    ///
    /// Used by native initialisation; never runs setters or watches.
    pub fn init_member(&mut self, obj: ObjectId, key: &PropertyKey, value: Value, flags: PropFlags) {
        let case_sensitive = self.case_sensitive();
        let Some(o) = self.objects.get_mut(obj) else {
            return;
        };
        if key.is_proto() {
            o.proto = value.as_object();
            o.proto_flags = flags;
            return;
        }
        o.properties
            .insert(Property::new(*key, Binding::Value(value), flags), case_sensitive);
    }

    /// [`init_member`](Self::init_member) by interned name.
    pub fn init_member_key(&mut self, obj: ObjectId, name: StringKey, value: Value, flags: PropFlags) {
        let key = self.key_of(name);
        self.init_member(obj, &key, value, flags);
    }

    /// Installs a native getter/setter pair.
    pub fn init_property(
        &mut self,
        obj: ObjectId,
        key: &PropertyKey,
        getter: NativeFn,
        setter: Option<NativeFn>,
        flags: PropFlags,
    ) {
        let case_sensitive = self.case_sensitive();
        if let Some(o) = self.objects.get_mut(obj) {
            let binding = Binding::Accessor(Accessor::Native { getter, setter });
            o.properties
                .insert(Property::new(*key, binding, flags), case_sensitive);
        }
    }

    /// Installs a property computed on first read, then stored.
    pub fn init_destructive_property(
        &mut self,
        obj: ObjectId,
        key: &PropertyKey,
        getter: NativeFn,
        flags: PropFlags,
    ) {
        let case_sensitive = self.case_sensitive();
        if let Some(o) = self.objects.get_mut(obj) {
            o.properties.insert(
                Property::new(*key, Binding::Destructive(getter), flags),
                case_sensitive,
            );
        }
    }

    /// Installs a script getter/setter pair, as `addProperty` does.
    ///
    /// An existing own property keeps its flags and position, and its
    /// value seeds the accessor cache.
    pub fn add_property(
        &mut self,
        obj: ObjectId,
        key: &PropertyKey,
        getter: ObjectId,
        setter: Option<ObjectId>,
    ) -> bool {
        let case_sensitive = self.case_sensitive();
        let Some(o) = self.objects.get_mut(obj) else {
            return false;
        };
        let (flags, cache) = match o.properties.get(key, case_sensitive) {
            Some(prop) => (prop.flags, prop.cached_value()),
            None => (PropFlags::DEFAULT, Value::Undefined),
        };
        let binding = Binding::Accessor(Accessor::User {
            getter: Some(getter),
            setter,
            cache,
            being_accessed: false,
        });
        o.properties
            .insert(Property::new(*key, binding, flags), case_sensitive);
        true
    }

    /// Deletes an own member.
    ///
    /// # Returns
    ///
    /// `(found, deleted)`: whether the member existed and whether it was
    /// removed. `dontDelete` members report `(true, false)`.
    pub fn delete_member(&mut self, obj: ObjectId, key: &PropertyKey) -> (bool, bool) {
        let case_sensitive = self.case_sensitive();
        let Some(o) = self.objects.get_mut(obj) else {
            return (false, false);
        };
        if key.is_proto() {
            if o.proto.is_none() {
                return (false, false);
            }
            if o.proto_flags.is_dont_delete() {
                return (true, false);
            }
            o.proto = None;
            return (true, true);
        }
        let outcome = o.properties.remove(key, case_sensitive);
        if outcome == Deletion::Protected {
            let name = self.string(key.name);
            coding_error!(self, "property '{}' is protected from deletion", name);
        }
        outcome.as_pair()
    }

    /// Whether `obj` has a visible own member `key`.
    pub fn has_own_property(&self, obj: ObjectId, key: &PropertyKey) -> bool {
        let version = self.swf_version();
        if key.is_proto() {
            return self
                .objects
                .get(obj)
                .is_some_and(|o| o.proto.is_some() && o.proto_flags.is_visible(version));
        }
        self.own_property(obj, key)
            .is_some_and(|p| p.flags.is_visible(version))
    }

    /// Whether `obj` has a visible, enumerable own member `key`.
    pub fn is_property_enumerable(&self, obj: ObjectId, key: &PropertyKey) -> bool {
        let version = self.swf_version();
        self.own_property(obj, key)
            .is_some_and(|p| p.flags.is_visible(version) && !p.flags.is_dont_enum())
    }

    /// Visible, enumerable own member names in insertion order.
    pub fn enumerate_own(&self, obj: ObjectId) -> Vec<AvmString> {
        let version = self.swf_version();
        let Some(o) = self.objects.get(obj) else {
            return Vec::new();
        };
        o.properties
            .iter()
            .filter(|p| p.flags.is_visible(version) && !p.flags.is_dont_enum())
            .map(|p| self.string(p.key.name))
            .collect()
    }

    /// Names a `for..in` loop visits, own members first, then inherited
    /// ones not shadowed by a nearer object.
    pub fn enumerate_keys(&self, obj: ObjectId) -> AvmResult<Vec<AvmString>> {
        let version = self.swf_version();
        let case_sensitive = self.case_sensitive();
        let limit = self.config().prototype_depth_for(version);

        let mut seen: HashSet<StringKey> = HashSet::new();
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        let mut current = Some(obj);
        let mut depth = 0usize;
        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            let Some(o) = self.objects.get(id) else {
                break;
            };
            for prop in o.properties.iter() {
                if prop.key.namespace != names::EMPTY {
                    continue;
                }
                let ident = if case_sensitive {
                    prop.key.name
                } else {
                    prop.key.folded
                };
                // Hidden members still shadow inherited ones.
                if !seen.insert(ident) {
                    continue;
                }
                if prop.flags.is_dont_enum() || !prop.flags.is_visible(version) {
                    continue;
                }
                out.push(self.string(prop.key.name));
            }
            current = o.proto;
            depth += 1;
            if depth > limit {
                return Err(AvmError::action_limit(format!(
                    "Lookup depth exceeded ({})",
                    limit
                )));
            }
        }
        Ok(out)
    }

    /// Applies `ASSetPropFlags` masks.
    ///
    /// `props` selects the members: `null` for all of them, a
    /// comma-separated string of names, or an array-like object of names.
    pub fn set_prop_flags(
        &mut self,
        obj: ObjectId,
        props: &Value,
        set_true: PropFlags,
        set_false: PropFlags,
    ) -> AvmResult<()> {
        let names_to_set: Vec<AvmString> = match props {
            Value::Null => {
                if let Some(o) = self.objects.get_mut(obj) {
                    o.properties.set_flags_all(set_true, set_false);
                    o.proto_flags.apply(set_true, set_false);
                }
                return Ok(());
            }
            Value::String(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(AvmString::from)
                .collect(),
            Value::Object(list) => {
                let len = self.get_by_key(*list, names::LENGTH)?;
                let len = self.to_number(&len)?;
                let len = if len.is_finite() && len > 0.0 { len as usize } else { 0 };
                let mut out = Vec::with_capacity(len);
                for i in 0..len {
                    let item = self.get(*list, &i.to_string())?;
                    out.push(self.to_string(&item)?);
                }
                out
            }
            _ => {
                coding_error!(self, "ASSetPropFlags: invalid property list");
                return Ok(());
            }
        };

        let case_sensitive = self.case_sensitive();
        for name in names_to_set {
            let key = self.key(&name);
            let Some(o) = self.objects.get_mut(obj) else {
                break;
            };
            if key.is_proto() {
                o.proto_flags.apply(set_true, set_false);
            } else {
                o.properties
                    .set_flags(&key, case_sensitive, set_true, set_false);
            }
        }
        Ok(())
    }

    /// Installs a watch on `obj.key`, replacing any existing one.
    pub fn watch(&mut self, obj: ObjectId, key: &PropertyKey, function: ObjectId, user_data: Value) -> bool {
        let case_sensitive = self.case_sensitive();
        let Some(o) = self.objects.get_mut(obj) else {
            return false;
        };
        let trigger = Trigger {
            function,
            user_data,
            executing: false,
        };
        match o.watch_position(key, case_sensitive) {
            Some(pos) => o.watches[pos].1 = trigger,
            None => o.watches.push((*key, trigger)),
        }
        true
    }

    /// Removes the watch on `obj.key`.
    ///
    /// # Returns
    ///
    /// Whether a watch was installed.
    pub fn unwatch(&mut self, obj: ObjectId, key: &PropertyKey) -> bool {
        let case_sensitive = self.case_sensitive();
        let Some(o) = self.objects.get_mut(obj) else {
            return false;
        };
        match o.watch_position(key, case_sensitive) {
            Some(pos) => {
                o.watches.remove(pos);
                true
            }
            None => false,
        }
    }
}
