//! Assertion types and builders for verifying step results.

use lineage_hierarchy::{CycleKind, HierarchyError, HierarchyResult};

use crate::error::{ScenarioError, ScenarioResult};
use crate::world::World;

/// The kind of error a step is expected to fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedError {
    /// Any cycle error.
    Cycle,
    CycleOf(CycleKind),
    NotLinearizable,
    Hook,
    IncompleteClass,
    EmptyBases,
    DuplicateBase,
    DepthLimit,
    /// Any error at all.
    Any,
}

impl ExpectedError {
    pub fn matches(&self, err: &HierarchyError) -> bool {
        match self {
            ExpectedError::Cycle => err.is_cycle(),
            ExpectedError::CycleOf(kind) => err.cycle_kind() == Some(*kind),
            ExpectedError::NotLinearizable => matches!(err, HierarchyError::NotLinearizable { .. }),
            ExpectedError::Hook => err.is_hook(),
            ExpectedError::IncompleteClass => matches!(err, HierarchyError::IncompleteClass { .. }),
            ExpectedError::EmptyBases => matches!(err, HierarchyError::EmptyBases { .. }),
            ExpectedError::DuplicateBase => matches!(err, HierarchyError::DuplicateBase { .. }),
            ExpectedError::DepthLimit => matches!(err, HierarchyError::DepthLimit { .. }),
            ExpectedError::Any => true,
        }
    }
}

/// A complete assertion for a step result.
#[derive(Debug, Default)]
pub struct Assertion {
    /// `Some(None)` = must succeed, `Some(Some(kind))` = must fail with kind.
    pub outcome: Option<Option<ExpectedError>>,
    /// Expected MROs; `None` means the MRO must be unset.
    pub mros: Vec<(String, Option<Vec<String>>)>,
    pub bases: Vec<(String, Vec<String>)>,
    pub subclasses: Vec<(String, Vec<String>)>,
    /// Run `Hierarchy::verify` after the step.
    pub consistent: bool,
}

impl Assertion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the step result and the world state after it.
    pub fn check(&self, step: &str, world: &World, result: &HierarchyResult<()>) -> ScenarioResult<()> {
        let fail = |message: String| Err(ScenarioError::assertion_failed(step, message));

        match (&self.outcome, result) {
            (Some(None), Err(err)) => return fail(format!("expected success, got error: {err}")),
            (Some(Some(kind)), Ok(())) => return fail(format!("expected {kind:?} error, got success")),
            (Some(Some(kind)), Err(err)) if !kind.matches(err) => {
                return fail(format!("expected {kind:?} error, got: {err}"))
            }
            _ => {}
        }

        for (class, expected) in &self.mros {
            let actual = world.mro(class);
            if &actual != expected {
                return fail(format!("mro of {class}: expected {expected:?}, got {actual:?}"));
            }
        }

        for (class, expected) in &self.bases {
            let actual = world.bases(class);
            if &actual != expected {
                return fail(format!("bases of {class}: expected {expected:?}, got {actual:?}"));
            }
        }

        for (class, expected) in &self.subclasses {
            let actual = world.subclasses(class);
            if &actual != expected {
                return fail(format!("subclasses of {class}: expected {expected:?}, got {actual:?}"));
            }
        }

        if self.consistent {
            if let Err(err) = world.hierarchy().verify() {
                return fail(format!("hierarchy is inconsistent: {err}"));
            }
        }
        Ok(())
    }
}

/// Fluent builder for assertions.
#[derive(Debug, Default)]
pub struct AssertionBuilder {
    assertion: Assertion,
}

impl AssertionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeeds(mut self) -> Self {
        self.assertion.outcome = Some(None);
        self
    }

    pub fn fails(self) -> Self {
        self.fails_with(ExpectedError::Any)
    }

    pub fn fails_with(mut self, kind: ExpectedError) -> Self {
        self.assertion.outcome = Some(Some(kind));
        self
    }

    pub fn mro(mut self, class: &str, expected: &[&str]) -> Self {
        self.assertion
            .mros
            .push((class.to_string(), Some(strings(expected))));
        self
    }

    pub fn unset(mut self, class: &str) -> Self {
        self.assertion.mros.push((class.to_string(), None));
        self
    }

    pub fn bases(mut self, class: &str, expected: &[&str]) -> Self {
        self.assertion
            .bases
            .push((class.to_string(), strings(expected)));
        self
    }

    pub fn subclasses(mut self, class: &str, expected: &[&str]) -> Self {
        self.assertion
            .subclasses
            .push((class.to_string(), strings(expected)));
        self
    }

    pub fn consistent(mut self) -> Self {
        self.assertion.consistent = true;
        self
    }

    pub fn build(self) -> Assertion {
        self.assertion
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
