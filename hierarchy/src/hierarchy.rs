//! The `Hierarchy` facade.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use lineage_core::{ClassId, HierarchyError, HierarchyResult, TxnId};

use crate::class::{ClassNode, ClassRef, Mro, WeakClassRef};
use crate::config::HierarchyConfig;
use crate::guard::CycleGuard;
use crate::journal::{Journal, JournalEntry};
use crate::linearizer::{Linearizer, StandardLinearizer};
use crate::mutator::HierarchyMutator;
use crate::registry::transitive_subclasses;

/// A set of classes sharing one configuration, journal and reentrancy depth.
///
/// Classes are owned by whoever holds their `ClassRef` (and by their
/// subclasses, through bases). The hierarchy itself only tracks them weakly.
pub struct Hierarchy {
    config: HierarchyConfig,
    default_linearizer: Rc<dyn Linearizer>,
    classes: RefCell<Vec<(ClassId, WeakClassRef)>>,
    next_class_id: Cell<u64>,
    depth: Cell<usize>,
    journal: RefCell<Journal>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::with_config(HierarchyConfig::default())
    }

    pub fn with_config(config: HierarchyConfig) -> Self {
        let journal = Journal::new(config.journal_limit);
        Self {
            config,
            default_linearizer: Rc::new(StandardLinearizer),
            classes: RefCell::new(Vec::new()),
            next_class_id: Cell::new(1),
            depth: Cell::new(0),
            journal: RefCell::new(journal),
        }
    }

    /// Linearizer used for root classes created without an explicit one.
    pub fn with_linearizer(mut self, linearizer: Rc<dyn Linearizer>) -> Self {
        self.default_linearizer = linearizer;
        self
    }

    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    pub fn default_linearizer(&self) -> Rc<dyn Linearizer> {
        Rc::clone(&self.default_linearizer)
    }

    pub fn mutator(&self) -> HierarchyMutator<'_> {
        HierarchyMutator::new(self)
    }

    // ========== Mutation ==========

    /// Create a class inheriting its linearizer from its first base.
    pub fn create_class(&self, name: &str, bases: &[ClassRef]) -> HierarchyResult<ClassRef> {
        self.mutator().create_class(name, bases, None)
    }

    /// Create a class bound to `linearizer`.
    pub fn create_class_with(
        &self,
        name: &str,
        bases: &[ClassRef],
        linearizer: Rc<dyn Linearizer>,
    ) -> HierarchyResult<ClassRef> {
        self.mutator().create_class(name, bases, Some(linearizer))
    }

    pub fn set_bases(&self, class: &ClassRef, bases: &[ClassRef]) -> HierarchyResult<()> {
        self.mutator().set_bases(class, bases)
    }

    // ========== Queries ==========

    /// Current MRO; never triggers computation.
    pub fn mro(&self, class: &ClassRef) -> Mro {
        class.mro()
    }

    /// Direct subclasses in registration order.
    pub fn subclasses(&self, class: &ClassRef) -> Vec<ClassRef> {
        class.subclasses()
    }

    /// Transitive subclasses, depth-first in registration order.
    pub fn all_subclasses(&self, class: &ClassRef) -> HierarchyResult<Vec<ClassRef>> {
        transitive_subclasses(class)
    }

    /// True if `class` is `base` or derives from it.
    ///
    /// Uses the MRO when it is resolved and the declared bases otherwise.
    pub fn is_subclass(&self, class: &ClassRef, base: &ClassRef) -> bool {
        if class.id() == base.id() {
            return true;
        }
        match class.ancestors() {
            Some(ancestors) => ancestors.iter().any(|c| c.id() == base.id()),
            None => CycleGuard::reaches(&class.bases(), base, false),
        }
    }

    /// The class following `after` in the MRO of `class` (super-style lookup).
    ///
    /// `None` if `after` is last or not part of the MRO at all.
    pub fn next_in_mro(&self, class: &ClassRef, after: &ClassRef) -> HierarchyResult<Option<ClassRef>> {
        let Mro::Resolved(mro) = class.mro() else {
            return Err(HierarchyError::incomplete(class.name()));
        };
        let next = mro
            .iter()
            .position(|c| c.id() == after.id())
            .and_then(|idx| mro.get(idx + 1))
            .cloned();
        Ok(next)
    }

    /// Most recently created live class with this name.
    pub fn find(&self, name: &str) -> Option<ClassRef> {
        self.classes
            .borrow()
            .iter()
            .rev()
            .filter_map(|(_, weak)| weak.upgrade())
            .find(|c| c.name() == name)
    }

    /// Live classes in creation order.
    pub fn classes(&self) -> Vec<ClassRef> {
        self.classes
            .borrow()
            .iter()
            .filter_map(|(_, weak)| weak.upgrade())
            .collect()
    }

    /// Check every live class: MRO resolved and headed by the class, no
    /// declared cycle, and registries exactly inverse to bases.
    ///
    /// MROs are not compared against the current MROs of their bases. A
    /// nested call that committed during an enclosing call keeps the MRO it
    /// computed from that call's tentative bases, even after the enclosing
    /// call rolls back; such an MRO still passes this check.
    pub fn verify(&self) -> HierarchyResult<()> {
        for class in self.classes() {
            let Some(ancestors) = class.ancestors() else {
                return Err(HierarchyError::inconsistent(class.name(), "mro is unset"));
            };
            if ancestors.iter().any(|c| c.id() == class.id()) {
                return Err(HierarchyError::linearization_cycle(class.name()));
            }
            if CycleGuard::reaches(&class.bases(), &class, false) {
                return Err(HierarchyError::declared_cycle(class.name()));
            }

            for base in class.bases() {
                if !base.has_subclass(class.id()) {
                    return Err(HierarchyError::inconsistent(
                        class.name(),
                        format!("not registered as a subclass of {}", base.name()),
                    ));
                }
            }
            for sub in class.subclasses() {
                if !sub.bases().iter().any(|b| b.id() == class.id()) {
                    return Err(HierarchyError::inconsistent(
                        class.name(),
                        format!("lists {} as a subclass but is not among its bases", sub.name()),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn journal(&self) -> Vec<JournalEntry> {
        self.journal.borrow().entries()
    }

    /// Transactions committed so far (within the retained journal).
    pub fn committed(&self) -> Vec<TxnId> {
        self.journal.borrow().committed()
    }

    pub fn clear_journal(&self) {
        self.journal.borrow_mut().clear();
    }

    /// Number of mutation calls currently on the stack.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    // ========== Crate-internal ==========

    /// Enter one level of mutation nesting.
    pub(crate) fn enter(&self) -> HierarchyResult<DepthGuard<'_>> {
        let level = self.depth.get() + 1;
        if let Some(limit) = self.config.max_depth {
            if level > limit {
                return Err(HierarchyError::depth_limit(limit));
            }
        }
        self.depth.set(level);
        Ok(DepthGuard {
            depth: &self.depth,
            level,
        })
    }

    /// Build a new node and start tracking it. Its MRO is unset.
    pub(crate) fn allocate(
        &self,
        name: &str,
        bases: Rc<[ClassRef]>,
        linearizer: Rc<dyn Linearizer>,
    ) -> ClassRef {
        let id = ClassId::new(self.next_class_id.get());
        self.next_class_id.set(id.raw() + 1);

        let class = Rc::new(ClassNode::new(id, name, bases, linearizer));
        let mut classes = self.classes.borrow_mut();
        classes.retain(|(_, weak)| weak.strong_count() > 0);
        classes.push((id, Rc::downgrade(&class)));
        class
    }

    pub(crate) fn untrack(&self, class: &ClassRef) {
        self.classes
            .borrow_mut()
            .retain(|(id, weak)| *id != class.id() && weak.strong_count() > 0);
    }

    pub(crate) fn begin_txn(&self, class: &ClassRef, depth: usize) -> TxnId {
        let mut journal = self.journal.borrow_mut();
        let txn = journal.alloc_txn();
        journal.append(JournalEntry::Begin {
            txn,
            class: class.id(),
            name: class.name().to_string(),
            depth,
        });
        txn
    }

    pub(crate) fn commit_txn(&self, txn: TxnId) {
        self.journal.borrow_mut().append(JournalEntry::Commit { txn });
    }

    pub(crate) fn abort_txn(&self, txn: TxnId, err: &HierarchyError) {
        self.journal.borrow_mut().append(JournalEntry::Abort {
            txn,
            reason: err.to_string(),
        });
    }
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hierarchy")
            .field("config", &self.config)
            .field("classes", &self.classes())
            .field("depth", &self.depth.get())
            .finish()
    }
}

/// One level of mutation nesting; leaving it decrements the depth.
pub(crate) struct DepthGuard<'h> {
    depth: &'h Cell<usize>,
    level: usize,
}

impl DepthGuard<'_> {
    pub fn level(&self) -> usize {
        self.level
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.level - 1);
    }
}
