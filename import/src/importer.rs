//! The importer: module table plus finders.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{ImportError, ImportResult};
use crate::finder::{Finder, ModuleSpec};
use crate::module::{leaf_name, parent_name, top_name, Module, ModuleRef, ModuleTable};

/// Imports modules, importing parent packages first.
///
/// Each module import commits on its own: a module whose init code fails is
/// removed from the table, but modules imported by that init code (or by
/// its parents) stay loaded.
pub struct Importer {
    finders: Vec<Box<dyn Finder>>,
    modules: RefCell<ModuleTable>,
}

impl Importer {
    pub fn new() -> Self {
        Self {
            finders: Vec::new(),
            modules: RefCell::new(ModuleTable::new()),
        }
    }

    /// Add a finder; finders are consulted in the order they were added.
    pub fn with_finder(mut self, finder: impl Finder + 'static) -> Self {
        self.finders.push(Box::new(finder));
        self
    }

    /// Import `name` and return it.
    pub fn import_module(&self, name: &str) -> ImportResult<ModuleRef> {
        if name.is_empty() {
            return Err(ImportError::EmptyName);
        }
        if let Some(module) = self.get(name) {
            return Ok(module);
        }

        let parent = match parent_name(name) {
            Some(parent) => Some(self.import_module(parent)?),
            None => None,
        };

        // the parent's init code may have loaded us already
        if let Some(module) = self.get(name) {
            return Ok(module);
        }

        if let Some(parent) = &parent {
            if !parent.is_package() {
                return Err(ImportError::not_a_package(name, parent.name()));
            }
        }

        let spec = self
            .find_spec(name)
            .ok_or_else(|| ImportError::not_found(name))?;
        let module = self.load(spec)?;

        if let Some(parent) = parent {
            parent.set_attr(leaf_name(name), Rc::clone(&module));
        }
        Ok(self.get(name).unwrap_or(module))
    }

    /// `import a.b.c`: load the module and return the top-level package,
    /// importing the package again if it is no longer loaded.
    pub fn import(&self, name: &str) -> ImportResult<ModuleRef> {
        let module = self.import_module(name)?;
        let top = top_name(name);
        if top == name {
            return Ok(module);
        }
        self.import_module(top)
    }

    /// `from package import attr`: the bound attribute, or the submodule
    /// `package.attr` imported on demand.
    pub fn import_from(&self, package: &str, attr: &str) -> ImportResult<ModuleRef> {
        let parent = self.import_module(package)?;
        if let Some(bound) = parent.attr(attr) {
            return Ok(bound);
        }
        self.import_module(&format!("{package}.{attr}"))
    }

    /// Resolve a relative name against `package` and import it.
    ///
    /// Level 1 is the package itself, each extra level climbs one parent.
    pub fn import_relative(&self, name: &str, package: &str, level: usize) -> ImportResult<ModuleRef> {
        let resolved = resolve_relative(name, package, level)?;
        self.import_module(&resolved)
    }

    pub fn get(&self, name: &str) -> Option<ModuleRef> {
        self.modules.borrow().get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.borrow().contains(name)
    }

    /// Put a module in the table directly.
    pub fn insert(&self, name: &str, module: ModuleRef) -> Option<ModuleRef> {
        self.modules.borrow_mut().insert(name, module)
    }

    pub fn remove(&self, name: &str) -> Option<ModuleRef> {
        self.modules.borrow_mut().remove(name)
    }

    pub fn loaded(&self) -> Vec<String> {
        self.modules.borrow().names()
    }

    fn find_spec(&self, name: &str) -> Option<ModuleSpec> {
        self.finders.iter().find_map(|finder| finder.find_spec(name))
    }

    /// Create the module, publish it, and run its init code.
    fn load(&self, spec: ModuleSpec) -> ImportResult<ModuleRef> {
        let module = Rc::new(Module::new(spec.name.as_str(), spec.is_package));
        self.modules
            .borrow_mut()
            .insert(spec.name.as_str(), Rc::clone(&module));
        tracing::debug!(module = spec.name.as_str(), "loading");

        if let Some(init) = &spec.init {
            if let Err(failure) = init(self, &module) {
                self.modules.borrow_mut().remove_if_same(&spec.name, &module);
                let err = ImportError::from_init(spec.name.as_str(), failure);
                tracing::warn!(module = spec.name.as_str(), error = %err, "init failed");
                return Err(err);
            }
        }
        Ok(module)
    }
}

impl Default for Importer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Importer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Importer")
            .field("finders", &self.finders.len())
            .field("loaded", &self.loaded())
            .finish()
    }
}

/// Absolute name for a relative import of `name` at `level` from `package`.
pub fn resolve_relative(name: &str, package: &str, level: usize) -> ImportResult<String> {
    let components: Vec<&str> = package.split('.').collect();
    if level == 0 || package.is_empty() || level > components.len() {
        return Err(ImportError::beyond_top_level(package, level));
    }
    let base = components[..components.len() - (level - 1)].join(".");
    if name.is_empty() {
        Ok(base)
    } else {
        Ok(format!("{base}.{name}"))
    }
}
