//! Configuration for a hierarchy.

/// Configuration for a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyConfig {
    /// Maximum nesting of `set_bases`/`create_class` calls made from hooks.
    /// `None` means unbounded.
    pub max_depth: Option<usize>,
    /// Re-check computed MROs for cycles after every propagation.
    pub verify_linearization: bool,
    /// Number of journal entries retained (0 disables the journal).
    pub journal_limit: usize,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            verify_linearization: true,
            journal_limit: 1024,
        }
    }
}

impl HierarchyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_verify_linearization(mut self, verify: bool) -> Self {
        self.verify_linearization = verify;
        self
    }

    pub fn with_journal_limit(mut self, limit: usize) -> Self {
        self.journal_limit = limit;
        self
    }

    /// No journal, no post-linearization check.
    pub fn minimal() -> Self {
        Self {
            max_depth: None,
            verify_linearization: false,
            journal_limit: 0,
        }
    }
}
