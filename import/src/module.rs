//! Modules and the module table.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

/// Shared handle to a module.
pub type ModuleRef = Rc<Module>;

/// A loaded module. Packages may contain submodules.
pub struct Module {
    name: String,
    is_package: bool,
    /// Names bound in the module's namespace (only submodules are modelled).
    attrs: RefCell<BTreeMap<String, ModuleRef>>,
}

impl Module {
    pub fn new(name: impl Into<String>, is_package: bool) -> Self {
        Self {
            name: name.into(),
            is_package,
            attrs: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_package(&self) -> bool {
        self.is_package
    }

    pub fn set_attr(&self, name: impl Into<String>, value: ModuleRef) {
        self.attrs.borrow_mut().insert(name.into(), value);
    }

    pub fn attr(&self, name: &str) -> Option<ModuleRef> {
        self.attrs.borrow().get(name).cloned()
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.borrow().contains_key(name)
    }

    pub fn attr_names(&self) -> Vec<String> {
        self.attrs.borrow().keys().cloned().collect()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("is_package", &self.is_package)
            .field("attrs", &self.attr_names())
            .finish()
    }
}

/// Parent package of a dotted name (`a.b.c` -> `a.b`).
pub fn parent_name(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(parent, _)| parent)
}

/// Last component of a dotted name (`a.b.c` -> `c`).
pub fn leaf_name(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, leaf)| leaf)
}

/// First component of a dotted name (`a.b.c` -> `a`).
pub fn top_name(name: &str) -> &str {
    name.split_once('.').map_or(name, |(top, _)| top)
}

/// Name -> module registry.
#[derive(Debug, Default)]
pub struct ModuleTable {
    modules: HashMap<String, ModuleRef>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<ModuleRef> {
        self.modules.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Insert or replace. Returns the previous entry.
    pub fn insert(&mut self, name: impl Into<String>, module: ModuleRef) -> Option<ModuleRef> {
        self.modules.insert(name.into(), module)
    }

    pub fn remove(&mut self, name: &str) -> Option<ModuleRef> {
        self.modules.remove(name)
    }

    /// Remove `name` only if it still maps to `module`.
    pub fn remove_if_same(&mut self, name: &str, module: &ModuleRef) -> bool {
        match self.modules.get(name) {
            Some(current) if Rc::ptr_eq(current, module) => {
                self.modules.remove(name);
                true
            }
            _ => false,
        }
    }

    /// Loaded module names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
