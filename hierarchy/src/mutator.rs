//! Base-list reassignment and class creation.
//!
//! Every call is its own transaction. Writes go straight to the classes and
//! are recorded in a `TransactionBuffer`; hooks run with those tentative
//! values in place and may start nested transactions on any class. A nested
//! transaction commits independently: when the outer one later finishes, it
//! keeps a slot only if no nested commit has written it since, and on failure
//! it restores only the slots that still hold its own writes.

use std::collections::HashSet;
use std::rc::Rc;

use lineage_core::{HierarchyError, HierarchyResult, TxnId};

use crate::buffer::TransactionBuffer;
use crate::class::{ClassRef, MroSlot};
use crate::guard::CycleGuard;
use crate::hierarchy::Hierarchy;
use crate::linearizer::{validate, Linearizer};
use crate::registry::{linearization_order, reconcile, relink};

/// Mutates a hierarchy. Obtained from [`Hierarchy::mutator`].
pub struct HierarchyMutator<'h> {
    hierarchy: &'h Hierarchy,
}

impl<'h> HierarchyMutator<'h> {
    pub fn new(hierarchy: &'h Hierarchy) -> Self {
        Self { hierarchy }
    }

    /// Replace the bases of `class` and recompute the MROs of the class and
    /// every live transitive subclass.
    ///
    /// On error the class keeps its previous bases and MRO, except where a
    /// nested call made by a hook committed a newer value.
    pub fn set_bases(&self, class: &ClassRef, new_bases: &[ClassRef]) -> HierarchyResult<()> {
        let depth = self.hierarchy.enter()?;
        validate_bases(class, new_bases)?;
        CycleGuard::check_declared(class, new_bases)?;

        let txn = self.hierarchy.begin_txn(class, depth.level());
        tracing::debug!(
            txn = %txn,
            class = class.name(),
            depth = depth.level(),
            "set_bases begin"
        );

        let new: Rc<[ClassRef]> = Rc::from(new_bases);
        let mut buffer = TransactionBuffer::new();

        let displaced = class.write_bases(Rc::clone(&new));
        let old = Rc::clone(&displaced.old);
        class.push_pending(Rc::clone(&old));
        relink(class, &old, &new);
        buffer.track_bases(class, displaced);

        let cleared = class.write_mro(MroSlot::Unset);
        buffer.track_mro(class, cleared);

        let result = self.propagate(class, &mut buffer);
        class.pop_pending(&old);

        match result {
            Ok(()) => {
                reconcile(class, &old);
                self.commit(txn, buffer);
                Ok(())
            }
            Err(err) => {
                let restored = buffer.rollback();
                reconcile(class, &new);
                self.abort(txn, restored, &err);
                Err(err)
            }
        }
    }

    /// Create a class and compute its MRO.
    ///
    /// Without an explicit linearizer the class inherits the one of its first
    /// base, or the hierarchy default for a root class.
    pub fn create_class(
        &self,
        name: &str,
        bases: &[ClassRef],
        linearizer: Option<Rc<dyn Linearizer>>,
    ) -> HierarchyResult<ClassRef> {
        let depth = self.hierarchy.enter()?;
        check_duplicates(name, bases)?;
        if let Some(base) = bases.iter().find(|b| !b.is_resolved()) {
            return Err(HierarchyError::incomplete(base.name()));
        }

        let linearizer = linearizer
            .or_else(|| bases.first().map(|b| b.linearizer()))
            .unwrap_or_else(|| self.hierarchy.default_linearizer());
        let class = self.hierarchy.allocate(name, Rc::from(bases), linearizer);
        relink(&class, &[], bases);

        let txn = self.hierarchy.begin_txn(&class, depth.level());
        tracing::debug!(
            txn = %txn,
            class = name,
            depth = depth.level(),
            "create_class begin"
        );

        let mut buffer = TransactionBuffer::new();
        match self.propagate(&class, &mut buffer) {
            Ok(()) => {
                self.commit(txn, buffer);
                Ok(class)
            }
            Err(err) => {
                let restored = buffer.rollback();
                relink(&class, &class.bases_rc(), &[]);
                self.hierarchy.untrack(&class);
                self.abort(txn, restored, &err);
                Err(err)
            }
        }
    }

    /// Relinearize `root`, then every live transitive subclass with all of its
    /// affected bases handled first.
    ///
    /// The subclass set is collected after the root's linearizer has run, so
    /// subclasses registered or removed by its hook are accounted for.
    fn propagate(&self, root: &ClassRef, buffer: &mut TransactionBuffer) -> HierarchyResult<()> {
        self.relinearize(root, buffer)?;

        let order = linearization_order(root)?;
        let mut touched = Vec::with_capacity(order.len());
        touched.push(Rc::clone(root));

        for weak in order.iter().skip(1) {
            let Some(class) = weak.upgrade() else {
                continue;
            };
            self.relinearize(&class, buffer)?;
            touched.push(class);
        }

        if self.hierarchy.config().verify_linearization {
            CycleGuard::check_linearized(&touched)?;
        }
        Ok(())
    }

    /// Run the class's linearizer and store the result, unless a nested
    /// transaction committed a newer MRO while the linearizer was running.
    fn relinearize(&self, class: &ClassRef, buffer: &mut TransactionBuffer) -> HierarchyResult<()> {
        let expected = class.mro_stamp();
        tracing::trace!(class = class.name(), "linearizing");

        let sequence = class.linearizer().linearize(self.hierarchy, class)?;

        if class.mro_stamp() != expected {
            let retired = buffer.retire(class);
            tracing::trace!(class = class.name(), retired, "mro superseded by nested commit");
            return Ok(());
        }

        let ancestors = validate(class, sequence)?;
        let displaced = class.write_mro(MroSlot::Resolved(ancestors));
        buffer.track_mro(class, displaced);
        Ok(())
    }

    fn commit(&self, txn: TxnId, buffer: TransactionBuffer) {
        let writes = buffer.commit();
        self.hierarchy.commit_txn(txn);
        tracing::debug!(txn = %txn, writes, "commit");
    }

    fn abort(&self, txn: TxnId, restored: usize, err: &HierarchyError) {
        self.hierarchy.abort_txn(txn, err);
        tracing::warn!(txn = %txn, restored, error = %err, "rolled back");
    }
}

/// Empty lists are only accepted for a class that already has no bases.
fn validate_bases(class: &ClassRef, new_bases: &[ClassRef]) -> HierarchyResult<()> {
    if new_bases.is_empty() && class.has_bases() {
        return Err(HierarchyError::empty_bases(class.name()));
    }
    check_duplicates(class.name(), new_bases)
}

fn check_duplicates(name: &str, bases: &[ClassRef]) -> HierarchyResult<()> {
    let mut seen = HashSet::with_capacity(bases.len());
    for base in bases {
        if !seen.insert(base.id()) {
            return Err(HierarchyError::duplicate_base(name, base.name()));
        }
    }
    Ok(())
}
