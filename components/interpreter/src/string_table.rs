//! Interned property names.
//!
//! Every property name is interned once and referred to by a [`StringKey`].
//! Each key also records the key of its lower-cased form, which is what
//! SWF6 and older compare when looking up members.

use core_types::AvmString;
use std::collections::HashMap;
use std::rc::Rc;

/// Interned string handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringKey(u32);

impl StringKey {
    /// Position in the table.
    pub const fn index(self) -> u32 {
        self.0
    }
}

macro_rules! predefined_names {
    ($($konst:ident = $text:expr),* $(,)?) => {
        /// Keys interned at startup, usable without a table lookup.
        pub mod names {
            use super::StringKey;

            predefined_names!(@consts 0u32; $($konst),*);

            pub(super) const ALL: &[&str] = &[$($text),*];
        }
    };
    (@consts $n:expr; $konst:ident $(, $rest:ident)*) => {
        #[allow(missing_docs)]
        pub const $konst: StringKey = StringKey($n);
        predefined_names!(@consts $n + 1u32; $($rest),*);
    };
    (@consts $n:expr;) => {};
}

predefined_names! {
    EMPTY = "",
    PROTO = "__proto__",
    CONSTRUCTOR = "constructor",
    UU_CONSTRUCTOR = "__constructor__",
    PROTOTYPE = "prototype",
    VALUE_OF = "valueOf",
    TO_STRING = "toString",
    LENGTH = "length",
    CALLEE = "callee",
    CALLER = "caller",
    THIS = "this",
    SUPER = "super",
    ARGUMENTS = "arguments",
    GLOBAL = "_global",
    ROOT = "_root",
    PARENT = "_parent",
    OBJECT = "Object",
    FUNCTION = "Function",
    ARRAY = "Array",
    STRING = "String",
    NUMBER = "Number",
    BOOLEAN = "Boolean",
    CALL = "call",
    APPLY = "apply",
    WATCH = "watch",
    UNWATCH = "unwatch",
    ADD_PROPERTY = "addProperty",
    HAS_OWN_PROPERTY = "hasOwnProperty",
    IS_PROTOTYPE_OF = "isPrototypeOf",
    IS_PROPERTY_ENUMERABLE = "isPropertyEnumerable",
    AS_SET_PROP_FLAGS = "ASSetPropFlags",
}

/// Table of interned strings.
///
/// # Example
///
/// ```
/// use interpreter::string_table::{names, StringTable};
///
/// let mut table = StringTable::new();
/// let key = table.intern("Foo");
/// assert_eq!(&**table.get(key), "Foo");
/// assert_eq!(table.folded(key), table.intern("foo"));
/// assert_eq!(table.intern("__proto__"), names::PROTO);
/// ```
#[derive(Debug, Clone)]
pub struct StringTable {
    strings: Vec<AvmString>,
    folded: Vec<StringKey>,
    lookup: HashMap<AvmString, StringKey>,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    /// Creates a table holding the predefined names.
    pub fn new() -> Self {
        let mut table = Self {
            strings: Vec::with_capacity(names::ALL.len() * 2),
            folded: Vec::with_capacity(names::ALL.len() * 2),
            lookup: HashMap::new(),
        };
        // Raw entries first so that predefined keys get consecutive indices.
        for text in names::ALL {
            let key = StringKey(table.strings.len() as u32);
            let s: AvmString = Rc::from(*text);
            table.strings.push(Rc::clone(&s));
            table.folded.push(key);
            table.lookup.insert(s, key);
        }
        for idx in 0..names::ALL.len() {
            let lower = names::ALL[idx].to_lowercase();
            if lower != names::ALL[idx] {
                let folded = table.intern(&lower);
                table.folded[idx] = folded;
            }
        }
        table
    }

    /// Interns `s`, returning the existing key if already present.
    pub fn intern(&mut self, s: &str) -> StringKey {
        if let Some(key) = self.lookup.get(s) {
            return *key;
        }
        let key = StringKey(self.strings.len() as u32);
        let text: AvmString = Rc::from(s);
        self.strings.push(Rc::clone(&text));
        self.folded.push(key);
        self.lookup.insert(text, key);

        let lower = s.to_lowercase();
        if lower != s {
            let folded = self.intern(&lower);
            self.folded[key.0 as usize] = folded;
        }
        key
    }

    /// Key of `s` if it has been interned.
    pub fn find(&self, s: &str) -> Option<StringKey> {
        self.lookup.get(s).copied()
    }

    /// Text behind `key`.
    ///
    /// Keys are only issued by this table, so every key resolves.
    pub fn get(&self, key: StringKey) -> &AvmString {
        &self.strings[key.0 as usize]
    }

    /// Key of the lower-cased form of `key`.
    pub fn folded(&self, key: StringKey) -> StringKey {
        self.folded[key.0 as usize]
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether the table is empty. Never true after construction.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
