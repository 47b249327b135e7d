//! Variable resolution.
//!
//! Names are looked up through the `with` scope chain, the function's
//! locals, the current target and finally `_global`. Names containing
//! `.`, `/` or `:` are paths resolved relative to the target.

use crate::property::PropertyKey;
use crate::string_table::names;
use crate::Interpreter;
use core_types::{AvmResult, ObjectId, PropFlags, Value};

/// Splits `a.b.c` or `/a/b:c` into the object path and the variable.
///
/// # Returns
///
/// `None` when the name is not a path: it has no `.` or `:`, the path part
/// is empty, or the path ends in more than one colon.
///
/// # Example
///
/// ```
/// use interpreter::environment::parse_path;
///
/// assert_eq!(parse_path("a.b.c"), Some(("a.b", "c")));
/// assert_eq!(parse_path("/clip:x"), Some(("/clip", "x")));
/// assert_eq!(parse_path("plain"), None);
/// ```
pub fn parse_path(name: &str) -> Option<(&str, &str)> {
    let split = name.rfind(['.', ':'])?;
    let (path, var) = (&name[..split], &name[split + 1..]);
    if path.is_empty() {
        return None;
    }
    let trailing_colons = path
        .bytes()
        .skip(1)
        .rev()
        .take_while(|b| *b == b':')
        .count();
    if trailing_colons > 1 {
        return None;
    }
    Some((path, var))
}

fn valid_raw_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') {
        return false;
    }
    if name.starts_with(':') && !name[1..].contains([':', '.']) {
        return false;
    }
    !name.contains(":::")
}

/// Position of the next path separator, treating `..` as part of a name.
fn next_separator(path: &str) -> Option<usize> {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'.' if bytes.get(i + 1) == Some(&b'.') => i += 1,
            b'.' | b'/' | b':' => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

impl Interpreter {
    /// Reads a variable or path.
    pub fn get_variable(&mut self, name: &str) -> AvmResult<Value> {
        if let Some((path, var)) = parse_path(name) {
            return match self.find_object(path)? {
                Some(obj) => self.get(obj, var),
                None => {
                    coding_error!(self, "path '{}' of '{}' not found", path, name);
                    Ok(Value::Undefined)
                }
            };
        }
        if name.contains('/') {
            if let Some(obj) = self.find_object(name)? {
                if self.objects.get(obj).is_some_and(|o| o.is_display_object()) {
                    return Ok(Value::Object(obj));
                }
            }
        }
        if !valid_raw_name(name) {
            coding_error!(self, "invalid variable name '{}'", name);
            return Ok(Value::Undefined);
        }
        let key = self.key(name);
        self.get_variable_key(&key)
    }

    /// Reads a plain variable name, without path parsing.
    pub fn get_variable_key(&mut self, key: &PropertyKey) -> AvmResult<Value> {
        let scope: Vec<ObjectId> = self.current_scope().nearest_first().collect();
        for obj in scope {
            if let Some(v) = self.get_member(obj, key)? {
                return Ok(v);
            }
        }

        if self.swf_version() < 6 {
            if let Some(v) = self.find_local(key)? {
                return Ok(v);
            }
        }

        if let Some(target) = self.target.or(self.original_target) {
            if let Some(v) = self.get_member(target, key)? {
                return Ok(v);
            }
        }

        let case_sensitive = self.case_sensitive();
        if key.matches(&self.key_of(names::THIS), case_sensitive) {
            return Ok(Value::from(self.original_target));
        }
        if self.swf_version() > 5 && key.matches(&self.key_of(names::GLOBAL), case_sensitive) {
            return Ok(Value::Object(self.global));
        }

        let global = self.global;
        if let Some(v) = self.get_member(global, key)? {
            return Ok(v);
        }

        let name = self.string(key.name);
        coding_error!(self, "reference to non-existent variable '{}'", name);
        Ok(Value::Undefined)
    }

    /// Assigns a variable or path.
    ///
    /// A plain name updates the nearest scope object that already has it
    /// (and, before SWF6, an existing local); otherwise it is created on
    /// the current target.
    pub fn set_variable(&mut self, name: &str, value: Value) -> AvmResult<()> {
        if let Some((path, var)) = parse_path(name) {
            match self.find_object(path)? {
                Some(obj) => return self.set(obj, var, value),
                None => {
                    coding_error!(self, "path '{}' not found while setting '{}'", path, name);
                    return Ok(());
                }
            }
        }
        if !valid_raw_name(name) {
            coding_error!(self, "invalid variable name '{}'", name);
            return Ok(());
        }
        let key = self.key(name);

        let scope: Vec<ObjectId> = self.current_scope().nearest_first().collect();
        for obj in scope {
            if self.update_member(obj, &key, value.clone())? {
                return Ok(());
            }
        }

        if self.swf_version() < 6 {
            if let Some(locals) = self.current_frame().map(|f| f.locals) {
                if self.own_property(locals, &key).is_some() {
                    return self.set_member(locals, &key, value);
                }
            }
        }

        match self.target.or(self.original_target) {
            Some(target) => self.set_member(target, &key, value),
            None => {
                tracing::error!("no target to set variable '{}' on", name);
                Ok(())
            }
        }
    }

    /// Deletes a variable or path member.
    ///
    /// # Returns
    ///
    /// Whether something was deleted.
    pub fn delete_variable(&mut self, name: &str) -> AvmResult<bool> {
        if let Some((path, var)) = parse_path(name) {
            return Ok(match self.find_object(path)? {
                Some(obj) => {
                    let key = self.key(var);
                    self.delete_member(obj, &key).1
                }
                None => false,
            });
        }
        let key = self.key(name);

        let scope: Vec<ObjectId> = self.current_scope().nearest_first().collect();
        for obj in scope {
            let (found, deleted) = self.delete_member(obj, &key);
            if found {
                return Ok(deleted);
            }
        }

        if let Some(locals) = self.current_frame().map(|f| f.locals) {
            if self.delete_member(locals, &key).1 {
                return Ok(true);
            }
        }

        if let Some(target) = self.target {
            let (found, deleted) = self.delete_member(target, &key);
            if found {
                return Ok(deleted);
            }
        }

        let global = self.global;
        Ok(self.delete_member(global, &key).1)
    }

    /// Local variable of the current frame.
    pub fn find_local(&mut self, key: &PropertyKey) -> AvmResult<Option<Value>> {
        let Some(locals) = self.current_frame().map(|f| f.locals) else {
            return Ok(None);
        };
        if self.own_property(locals, key).is_none() {
            return Ok(None);
        }
        self.get_member(locals, key)
    }

    /// Sets a local variable of the current frame, creating it if needed.
    ///
    /// Outside any function this assigns a variable instead.
    pub fn set_local(&mut self, name: &str, value: Value) -> AvmResult<()> {
        let Some(locals) = self.current_frame().map(|f| f.locals) else {
            coding_error!(self, "local '{}' set outside of a function", name);
            return self.set_variable(name, value);
        };
        let key = self.key(name);
        if self.own_property(locals, &key).is_some() {
            return self.set_member(locals, &key, value);
        }
        self.init_member(locals, &key, value, PropFlags::DEFAULT);
        Ok(())
    }

    /// Declares a local variable as `undefined` unless it already exists.
    pub fn declare_local(&mut self, name: &str) {
        let Some(locals) = self.current_frame().map(|f| f.locals) else {
            coding_error!(self, "local '{}' declared outside of a function", name);
            return;
        };
        let key = self.key(name);
        if self.own_property(locals, &key).is_none() {
            self.init_member(locals, &key, Value::Undefined, PropFlags::DEFAULT);
        }
    }

    /// Resolves an object path such as `a.b`, `/a/b` or `../c`.
    ///
    /// Relative paths start from the scope chain, the target or
    /// `_global`; absolute ones start at `_root`. The empty path is the
    /// current target.
    pub fn find_object(&mut self, path: &str) -> AvmResult<Option<ObjectId>> {
        if path.is_empty() {
            return Ok(self.target);
        }

        let mut rest = path;
        let mut current = self.target;
        let mut first_parsed = false;
        let mut dot_allowed = true;

        if let Some(after_root) = rest.strip_prefix('/') {
            let Some(root) = self.root else {
                return Ok(None);
            };
            if after_root.is_empty() {
                return Ok(Some(root));
            }
            current = Some(root);
            first_parsed = true;
            dot_allowed = false;
            rest = after_root;
        }

        loop {
            rest = rest.trim_start_matches(':');
            if rest.is_empty() {
                return Ok(current);
            }
            let sep = next_separator(rest);
            if sep == Some(0) {
                coding_error!(self, "invalid path '{}'", path);
                return Ok(None);
            }
            let part = match sep {
                Some(i) => {
                    match rest.as_bytes()[i] {
                        b'.' if !dot_allowed => {
                            coding_error!(self, "invalid path '{}': dot after slash", path);
                            return Ok(None);
                        }
                        b'/' => dot_allowed = false,
                        _ => {}
                    }
                    &rest[..i]
                }
                None => rest,
            };

            let element = if first_parsed {
                match current {
                    Some(obj) => self.path_element(obj, part)?,
                    None => None,
                }
            } else {
                first_parsed = true;
                self.first_path_element(part)?
            };
            let Some(element) = element else {
                return Ok(None);
            };
            current = Some(element);

            match sep {
                Some(i) => rest = &rest[i + 1..],
                None => return Ok(current),
            }
        }
    }

    fn first_path_element(&mut self, part: &str) -> AvmResult<Option<ObjectId>> {
        let scope: Vec<ObjectId> = self.current_scope().nearest_first().collect();
        for obj in scope {
            if let Some(element) = self.path_element(obj, part)? {
                return Ok(Some(element));
            }
        }
        if let Some(target) = self.target {
            if let Some(element) = self.path_element(target, part)? {
                return Ok(Some(element));
            }
        }
        let key = self.key(part);
        if self.swf_version() > 5 && key.matches(&self.key_of(names::GLOBAL), self.case_sensitive()) {
            return Ok(Some(self.global));
        }
        let global = self.global;
        self.path_element(global, part)
    }

    fn path_element(&mut self, obj: ObjectId, part: &str) -> AvmResult<Option<ObjectId>> {
        let name = if part == ".." { "_parent" } else { part };
        let key = self.key(name);
        Ok(self.get_member(obj, &key)?.and_then(|v| v.as_object()))
    }
}
