//! Cycle detection.
//!
//! Two independent checks, because either view can be stale while hooks are
//! running: the declared base graph (before anything is mutated) and the
//! computed MROs (after linearization).

use std::collections::HashSet;

use lineage_core::{HierarchyError, HierarchyResult};

use crate::class::ClassRef;

/// Validates base-list changes against inheritance cycles.
pub struct CycleGuard;

impl CycleGuard {
    /// Fails if `class` is reachable from any of `new_bases`.
    ///
    /// Walks current bases plus every base list an in-flight transaction may
    /// still restore, so a later rollback cannot close a cycle either. Works
    /// when MROs are unset.
    pub fn check_declared(class: &ClassRef, new_bases: &[ClassRef]) -> HierarchyResult<()> {
        if Self::reaches(new_bases, class, true) {
            return Err(HierarchyError::declared_cycle(class.name()));
        }
        Ok(())
    }

    /// True if `target` is reachable from `start` through declared bases.
    ///
    /// Visited classes are tracked, so a malformed graph still terminates.
    pub fn reaches(start: &[ClassRef], target: &ClassRef, include_pending: bool) -> bool {
        let mut visited = HashSet::new();
        let mut stack: Vec<ClassRef> = start.to_vec();

        while let Some(next) = stack.pop() {
            if next.id() == target.id() {
                return true;
            }
            if !visited.insert(next.id()) {
                continue;
            }
            stack.extend(next.bases());
            if include_pending {
                stack.extend(next.pending_bases());
            }
        }
        false
    }

    /// Checks the classes touched by a transaction once their MROs are
    /// computed.
    ///
    /// A class must not be an ancestor of one of its own ancestors, and its
    /// current declared bases must not lead back to it. Either would mean a
    /// hook introduced a cycle the pre-check could not see.
    pub fn check_linearized(touched: &[ClassRef]) -> HierarchyResult<()> {
        for class in touched {
            if Self::reaches(&class.bases(), class, false) {
                return Err(HierarchyError::linearization_cycle(class.name()));
            }

            let Some(ancestors) = class.ancestors() else {
                continue;
            };
            for ancestor in ancestors.iter() {
                if ancestor.id() == class.id() {
                    return Err(HierarchyError::linearization_cycle(class.name()));
                }
                let loops_back = ancestor
                    .ancestors()
                    .map(|theirs| theirs.iter().any(|c| c.id() == class.id()))
                    .unwrap_or(false);
                if loops_back {
                    return Err(HierarchyError::linearization_cycle(class.name()));
                }
            }
        }
        Ok(())
    }
}
