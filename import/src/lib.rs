//! Lineage Import
//!
//! Module-table bookkeeping with parent-package auto-import.
//!
//! Responsibilities:
//! - Keep the name -> module table
//! - Import parent packages before their submodules
//! - Unload only the module whose init code failed; modules imported by that
//!   init code stay loaded
//! - Resolve relative imports

mod error;
mod finder;
mod importer;
mod module;

pub use error::{ImportError, ImportResult, InitFailure};
pub use finder::{Finder, InitFn, InitResult, MemoryFinder, ModuleSpec};
pub use importer::{resolve_relative, Importer};
pub use module::{leaf_name, parent_name, top_name, Module, ModuleRef, ModuleTable};
