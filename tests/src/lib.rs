//! Lineage Integration Test Framework
//!
//! Provides a fluent API for writing scenarios against a class hierarchy.
//!
//! # Example
//!
//! ```ignore
//! use lineage_tests::prelude::*;
//!
//! pub fn scenario() -> Scenario {
//!     Scenario::new("reassign")
//!         .class("A", &[])
//!         .class("B", &["A"])
//!         .class("X", &[])
//!         .step("move_b", |w| w.set_bases("B", &["X"]), |a| {
//!             a.succeeds().mro("B", &["B", "X"]).consistent()
//!         })
//! }
//!
//! #[test]
//! fn test() {
//!     scenario().run().unwrap();
//! }
//! ```

mod assertion;
mod error;

pub use assertion::{Assertion, AssertionBuilder, ExpectedError};
pub use error::{ScenarioError, ScenarioResult};
pub use scenario::{Action, Scenario, Step};
pub use world::{names, World};

/// Install a test-writer subscriber honoring `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::assertion::{Assertion, AssertionBuilder, ExpectedError};
    pub use crate::error::{ScenarioError, ScenarioResult};
    pub use crate::init_tracing;
    pub use crate::scenario::Scenario;
    pub use crate::world::{names, World};
    pub use lineage_hierarchy::{
        ClassRef, CycleKind, Hierarchy, HierarchyConfig, HierarchyError, HookResult, HookedLinearizer,
        Mro,
    };
}
