//! Import error types.

use thiserror::Error;

/// An arbitrary error raised by module init code.
pub type InitFailure = Box<dyn std::error::Error + 'static>;

/// Import errors.
#[derive(Debug, Error)]
pub enum ImportError {
    /// No finder knows the module, or its parent cannot contain submodules.
    #[error("no module named {name}{}", suffix(.reason))]
    NotFound { name: String, reason: Option<String> },

    /// The module's init code raised.
    #[error("error while executing module {name}: {source}")]
    ExecFailed {
        name: String,
        #[source]
        source: InitFailure,
    },

    /// A relative import climbed above the top-level package.
    #[error("attempted relative import beyond top-level package (level {level} from {package})")]
    BeyondTopLevel { package: String, level: usize },

    #[error("empty module name")]
    EmptyName,
}

impl ImportError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            name: name.into(),
            reason: None,
        }
    }

    pub fn not_a_package(name: impl Into<String>, parent: &str) -> Self {
        Self::NotFound {
            name: name.into(),
            reason: Some(format!("{parent} is not a package")),
        }
    }

    /// Wrap an error raised by init code.
    ///
    /// `ImportError`s raised by nested imports inside the init code pass
    /// through unchanged, so they keep naming the module that actually failed.
    pub fn from_init(name: impl Into<String>, failure: InitFailure) -> Self {
        match failure.downcast::<ImportError>() {
            Ok(inner) => *inner,
            Err(source) => Self::ExecFailed {
                name: name.into(),
                source,
            },
        }
    }

    pub fn beyond_top_level(package: impl Into<String>, level: usize) -> Self {
        Self::BeyondTopLevel {
            package: package.into(),
            level,
        }
    }

    /// The module the error is about, when there is one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::NotFound { name, .. } | Self::ExecFailed { name, .. } => Some(name),
            Self::BeyondTopLevel { .. } | Self::EmptyName => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The init failure, downcast to `E`.
    pub fn init_failure<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::ExecFailed { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

fn suffix(reason: &Option<String>) -> String {
    reason.as_ref().map(|r| format!(" ({r})")).unwrap_or_default()
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;
