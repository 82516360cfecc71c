//! Finders: where module specs come from.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::InitFailure;
use crate::importer::Importer;
use crate::module::ModuleRef;

/// Result returned by module init code.
pub type InitResult = Result<(), InitFailure>;

/// Init code run when a module is first imported.
///
/// The module is already in the table while it runs, and the code may import
/// other modules (including its own submodules) through the importer.
pub type InitFn = dyn Fn(&Importer, &ModuleRef) -> InitResult;

/// How to create a module.
#[derive(Clone)]
pub struct ModuleSpec {
    pub name: String,
    pub is_package: bool,
    pub init: Option<Rc<InitFn>>,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>, is_package: bool) -> Self {
        Self {
            name: name.into(),
            is_package,
            init: None,
        }
    }

    pub fn with_init<F>(mut self, init: F) -> Self
    where
        F: Fn(&Importer, &ModuleRef) -> InitResult + 'static,
    {
        self.init = Some(Rc::new(init));
        self
    }
}

impl fmt::Debug for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSpec")
            .field("name", &self.name)
            .field("is_package", &self.is_package)
            .field("has_init", &self.init.is_some())
            .finish()
    }
}

/// Locates module specs by full dotted name.
pub trait Finder {
    fn find_spec(&self, name: &str) -> Option<ModuleSpec>;
}

/// Finder over specs registered in memory.
#[derive(Debug, Default)]
pub struct MemoryFinder {
    specs: HashMap<String, ModuleSpec>,
}

impl MemoryFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spec(mut self, spec: ModuleSpec) -> Self {
        self.specs.insert(spec.name.clone(), spec);
        self
    }

    /// Register a package without init code.
    pub fn package(self, name: &str) -> Self {
        self.with_spec(ModuleSpec::new(name, true))
    }

    /// Register a plain module without init code.
    pub fn module(self, name: &str) -> Self {
        self.with_spec(ModuleSpec::new(name, false))
    }

    /// Attach init code to an already registered spec. Unknown names are
    /// registered as plain modules.
    pub fn with_init<F>(mut self, name: &str, init: F) -> Self
    where
        F: Fn(&Importer, &ModuleRef) -> InitResult + 'static,
    {
        let spec = self
            .specs
            .remove(name)
            .unwrap_or_else(|| ModuleSpec::new(name, false));
        self.with_spec(spec.with_init(init))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Finder for MemoryFinder {
    fn find_spec(&self, name: &str) -> Option<ModuleSpec> {
        self.specs.get(name).cloned()
    }
}
