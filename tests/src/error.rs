//! Error types for the scenario harness.

use lineage_hierarchy::HierarchyError;
use thiserror::Error;

/// Result type for scenario operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors that can occur when running scenarios.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A class name was used before it was defined.
    #[error("unknown class '{name}'")]
    UnknownClass { name: String },

    /// Defining a class during setup failed.
    #[error("failed to define class '{class}': {source}")]
    Setup {
        class: String,
        #[source]
        source: HierarchyError,
    },

    /// Assertion failed.
    #[error("assertion failed for step '{step}': {message}")]
    AssertionFailed { step: String, message: String },
}

impl ScenarioError {
    pub fn unknown_class(name: impl Into<String>) -> Self {
        Self::UnknownClass { name: name.into() }
    }

    pub fn setup(class: impl Into<String>, source: HierarchyError) -> Self {
        Self::Setup {
            class: class.into(),
            source,
        }
    }

    pub fn assertion_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            step: step.into(),
            message: message.into(),
        }
    }
}
