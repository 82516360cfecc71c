//! Common error types for lineage.

use std::fmt;
use thiserror::Error;

/// An arbitrary error raised by user code running inside a linearization hook.
pub type HookFailure = Box<dyn std::error::Error + 'static>;

/// How a cycle was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    /// Found by walking declared base lists before anything was mutated.
    Declared,
    /// Only visible once MROs were computed, typically introduced by a hook.
    Linearization,
    /// Met while traversing the subclass registry.
    Registry,
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleKind::Declared => write!(f, "declared bases"),
            CycleKind::Linearization => write!(f, "linearization"),
            CycleKind::Registry => write!(f, "subclass registry"),
        }
    }
}

/// Errors that can occur while creating classes or reassigning their bases.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// A base list would make a class its own ancestor.
    #[error("a base of {class} causes an inheritance cycle (detected through {kind})")]
    Cycle { class: String, kind: CycleKind },

    /// No order satisfies the precedence constraints of the bases.
    #[error("cannot create a consistent method resolution order for {class}: {reason}")]
    NotLinearizable { class: String, reason: String },

    /// The linearizer returned a sequence that is not a valid MRO.
    #[error("invalid method resolution order for {class}: {reason}")]
    InvalidMro { class: String, reason: String },

    /// A hook raised an error while the class was being linearized.
    #[error("hook failed while linearizing {class}: {source}")]
    Hook {
        class: String,
        #[source]
        source: HookFailure,
    },

    /// The class has no completed MRO yet.
    #[error("class {class} is not fully initialized (its MRO is unset)")]
    IncompleteClass { class: String },

    #[error("can only assign a non-empty base list to {class}")]
    EmptyBases { class: String },

    #[error("duplicate base class {base} in the bases of {class}")]
    DuplicateBase { class: String, base: String },

    /// Configured reentrancy limit exceeded.
    #[error("reentrancy depth limit of {limit} exceeded")]
    DepthLimit { limit: usize },

    /// A structural invariant does not hold (reported by verification).
    #[error("hierarchy invariant violated at {class}: {reason}")]
    Inconsistent { class: String, reason: String },
}

impl HierarchyError {
    pub fn cycle(class: impl Into<String>, kind: CycleKind) -> Self {
        Self::Cycle {
            class: class.into(),
            kind,
        }
    }

    pub fn declared_cycle(class: impl Into<String>) -> Self {
        Self::cycle(class, CycleKind::Declared)
    }

    pub fn linearization_cycle(class: impl Into<String>) -> Self {
        Self::cycle(class, CycleKind::Linearization)
    }

    pub fn registry_cycle(class: impl Into<String>) -> Self {
        Self::cycle(class, CycleKind::Registry)
    }

    pub fn not_linearizable(class: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotLinearizable {
            class: class.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_mro(class: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMro {
            class: class.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an error raised by a hook.
    ///
    /// Errors that already are `HierarchyError`s came from a nested engine call
    /// made by the hook and are passed through untouched.
    pub fn from_hook(class: impl Into<String>, failure: HookFailure) -> Self {
        match failure.downcast::<HierarchyError>() {
            Ok(inner) => *inner,
            Err(source) => Self::Hook {
                class: class.into(),
                source,
            },
        }
    }

    pub fn incomplete(class: impl Into<String>) -> Self {
        Self::IncompleteClass {
            class: class.into(),
        }
    }

    pub fn empty_bases(class: impl Into<String>) -> Self {
        Self::EmptyBases {
            class: class.into(),
        }
    }

    pub fn duplicate_base(class: impl Into<String>, base: impl Into<String>) -> Self {
        Self::DuplicateBase {
            class: class.into(),
            base: base.into(),
        }
    }

    pub fn depth_limit(limit: usize) -> Self {
        Self::DepthLimit { limit }
    }

    pub fn inconsistent(class: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Inconsistent {
            class: class.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for any cycle error.
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle { .. })
    }

    /// The cycle kind, if this is a cycle error.
    pub fn cycle_kind(&self) -> Option<CycleKind> {
        match self {
            Self::Cycle { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns true if a hook raised this error.
    pub fn is_hook(&self) -> bool {
        matches!(self, Self::Hook { .. })
    }
}

/// Result type for hierarchy operations.
pub type HierarchyResult<T> = Result<T, HierarchyError>;
