//! Lineage Hierarchy
//!
//! Dynamic class hierarchy whose base lists can be reassigned after creation.
//!
//! Responsibilities:
//! - Own class nodes: strong edges to bases, weak edges to subclasses
//! - Compute MROs through a pluggable linearizer, optionally running hooks
//! - Reject cycles, both from declared bases and from computed MROs
//! - Run every base reassignment as a transaction that survives reentrant
//!   reassignments made by hooks, rolling back only its own tentative state
//!
//! # Module Structure
//!
//! - `class` - ClassNode, the Mro view and the stamped slots it is built from
//! - `registry` - Subclass registry maintenance and cycle-safe traversal
//! - `linearizer` - Linearizer trait, C3 implementation and the hook adapter
//! - `guard` - CycleGuard (declared-chain and linearization checks)
//! - `buffer` - Per-transaction undo log
//! - `mutator` - HierarchyMutator orchestrating set_bases / create_class
//! - `journal` - In-memory log of transaction begin/commit/abort events
//! - `config` - HierarchyConfig
//! - `hierarchy` - The Hierarchy facade

mod buffer;
mod class;
mod config;
mod guard;
mod hierarchy;
mod journal;
mod linearizer;
mod mutator;
mod registry;

pub use class::{ClassNode, ClassRef, Mro, WeakClassRef};
pub use config::HierarchyConfig;
pub use guard::CycleGuard;
pub use hierarchy::Hierarchy;
pub use journal::{Journal, JournalEntry};
pub use linearizer::{HookResult, HookedLinearizer, Linearizer, StandardLinearizer};
pub use mutator::HierarchyMutator;
pub use registry::transitive_subclasses;

pub use lineage_core::{ClassId, CycleKind, HierarchyError, HierarchyResult, HookFailure, TxnId};
