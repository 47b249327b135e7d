//! Insertion-ordered collection of properties.

use crate::property::{Property, PropertyKey};
use crate::string_table::StringKey;
use core_types::PropFlags;
use memory_manager::{Trace, Tracer};
use std::collections::HashMap;

/// Outcome of [`PropertyList::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// No property with that key.
    NotFound,
    /// The property refused deletion.
    Protected,
    /// The property was removed.
    Deleted,
}

impl Deletion {
    /// `(found, deleted)` pair reported to scripts.
    pub fn as_pair(self) -> (bool, bool) {
        match self {
            Deletion::NotFound => (false, false),
            Deletion::Protected => (true, false),
            Deletion::Deleted => (true, true),
        }
    }
}

/// Properties of one object in insertion order.
///
/// Exact-case lookups go through a hash index; case-insensitive ones
/// scan, since they only happen for SWF6 and older content.
#[derive(Debug, Clone, Default)]
pub struct PropertyList {
    props: Vec<Property>,
    index: HashMap<(StringKey, StringKey), usize>,
}

impl PropertyList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the property matching `key`.
    pub fn position(&self, key: &PropertyKey, case_sensitive: bool) -> Option<usize> {
        if let Some(idx) = self.index.get(&(key.name, key.namespace)) {
            return Some(*idx);
        }
        if case_sensitive {
            return None;
        }
        self.props
            .iter()
            .position(|prop| prop.key.matches(key, false))
    }

    /// Property matching `key`.
    pub fn get(&self, key: &PropertyKey, case_sensitive: bool) -> Option<&Property> {
        self.position(key, case_sensitive).map(|idx| &self.props[idx])
    }

    /// Mutable property matching `key`.
    pub fn get_mut(&mut self, key: &PropertyKey, case_sensitive: bool) -> Option<&mut Property> {
        let idx = self.position(key, case_sensitive)?;
        Some(&mut self.props[idx])
    }

    /// Stores `prop`, replacing a property with a matching key in place.
    ///
    /// A replaced property keeps its position in enumeration order.
    pub fn insert(&mut self, prop: Property, case_sensitive: bool) {
        if let Some(idx) = self.position(&prop.key, case_sensitive) {
            self.props[idx].binding = prop.binding;
            self.props[idx].flags = prop.flags;
            return;
        }
        self.index
            .insert((prop.key.name, prop.key.namespace), self.props.len());
        self.props.push(prop);
    }

    /// Removes the property matching `key` unless it is `dontDelete`.
    pub fn remove(&mut self, key: &PropertyKey, case_sensitive: bool) -> Deletion {
        let Some(idx) = self.position(key, case_sensitive) else {
            return Deletion::NotFound;
        };
        if self.props[idx].flags.is_dont_delete() {
            return Deletion::Protected;
        }
        self.props.remove(idx);
        self.reindex();
        Deletion::Deleted
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (idx, prop) in self.props.iter().enumerate() {
            self.index.insert((prop.key.name, prop.key.namespace), idx);
        }
    }

    /// Applies a flag mask to one property.
    ///
    /// # Returns
    ///
    /// `false` if the property is missing or its flags are protected.
    pub fn set_flags(
        &mut self,
        key: &PropertyKey,
        case_sensitive: bool,
        set_true: PropFlags,
        set_false: PropFlags,
    ) -> bool {
        match self.get_mut(key, case_sensitive) {
            Some(prop) => prop.flags.apply(set_true, set_false),
            None => false,
        }
    }

    /// Applies a flag mask to every property.
    ///
    /// # Returns
    ///
    /// The number of properties whose flags changed.
    pub fn set_flags_all(&mut self, set_true: PropFlags, set_false: PropFlags) -> usize {
        self.props
            .iter_mut()
            .map(|prop| prop.flags.apply(set_true, set_false))
            .filter(|changed| *changed)
            .count()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.props.iter()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

impl Trace for PropertyList {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        for prop in &self.props {
            prop.trace(tracer);
        }
    }
}
