//! Class nodes and their stamped slots.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use lineage_core::{ClassId, Stamp};

use crate::linearizer::Linearizer;

/// Shared owning handle to a class.
pub type ClassRef = Rc<ClassNode>;

/// Non-owning handle to a class (used for subclass back-references).
pub type WeakClassRef = Weak<ClassNode>;

/// A method resolution order as seen from outside the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Mro {
    /// Linearization is in progress or has not run yet.
    Unset,
    /// Completed MRO. The first entry is always the class itself.
    Resolved(Vec<ClassRef>),
}

impl Mro {
    pub fn is_unset(&self) -> bool {
        matches!(self, Mro::Unset)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Mro::Resolved(_))
    }

    /// The classes in order, if resolved.
    pub fn classes(&self) -> Option<&[ClassRef]> {
        match self {
            Mro::Unset => None,
            Mro::Resolved(classes) => Some(classes),
        }
    }

    pub fn into_classes(self) -> Option<Vec<ClassRef>> {
        match self {
            Mro::Unset => None,
            Mro::Resolved(classes) => Some(classes),
        }
    }

    /// Class names in order, if resolved.
    pub fn names(&self) -> Option<Vec<String>> {
        self.classes()
            .map(|classes| classes.iter().map(|c| c.name().to_string()).collect())
    }

    pub fn contains(&self, class: &ClassNode) -> bool {
        self.classes()
            .map(|classes| classes.iter().any(|c| c.id() == class.id()))
            .unwrap_or(false)
    }
}

/// Stored MRO. Resolved holds the ancestors only; the class itself is implied
/// as the head so a node never owns a strong reference to itself.
#[derive(Clone)]
pub(crate) enum MroSlot {
    Unset,
    Resolved(Rc<[ClassRef]>),
}

/// A value together with the stamp of the write that produced it.
struct Stamped<T> {
    value: T,
    stamp: Stamp,
}

/// What a write displaced, and the stamp it was given.
pub(crate) struct Displaced<T> {
    pub old: T,
    pub old_stamp: Stamp,
    pub new_stamp: Stamp,
}

/// One class of the hierarchy.
///
/// Bases, MRO and the subclass registry are the only mutable state. They are
/// written exclusively by the mutator; every borrow is released before any
/// linearizer or hook runs.
pub struct ClassNode {
    id: ClassId,
    name: String,
    linearizer: Rc<dyn Linearizer>,
    bases: RefCell<Stamped<Rc<[ClassRef]>>>,
    mro: RefCell<Stamped<MroSlot>>,
    /// Direct subclasses in registration order.
    pub(crate) subclasses: RefCell<Vec<(ClassId, WeakClassRef)>>,
    /// Base lists that in-flight transactions may still restore.
    pending_bases: RefCell<Vec<Rc<[ClassRef]>>>,
    next_stamp: Cell<u64>,
}

impl ClassNode {
    pub(crate) fn new(
        id: ClassId,
        name: impl Into<String>,
        bases: Rc<[ClassRef]>,
        linearizer: Rc<dyn Linearizer>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            linearizer,
            bases: RefCell::new(Stamped {
                value: bases,
                stamp: Stamp::INITIAL,
            }),
            mro: RefCell::new(Stamped {
                value: MroSlot::Unset,
                stamp: Stamp::INITIAL,
            }),
            subclasses: RefCell::new(Vec::new()),
            pending_bases: RefCell::new(Vec::new()),
            next_stamp: Cell::new(Stamp::INITIAL.raw() + 1),
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The linearizer bound at creation.
    pub fn linearizer(&self) -> Rc<dyn Linearizer> {
        Rc::clone(&self.linearizer)
    }

    /// Current declared bases, in declaration order.
    pub fn bases(&self) -> Vec<ClassRef> {
        self.bases.borrow().value.to_vec()
    }

    pub fn has_bases(&self) -> bool {
        !self.bases.borrow().value.is_empty()
    }

    /// Current MRO, with the class itself first. Never triggers computation.
    pub fn mro(self: &Rc<Self>) -> Mro {
        match &self.mro.borrow().value {
            MroSlot::Unset => Mro::Unset,
            MroSlot::Resolved(ancestors) => {
                let mut classes = Vec::with_capacity(ancestors.len() + 1);
                classes.push(Rc::clone(self));
                classes.extend(ancestors.iter().cloned());
                Mro::Resolved(classes)
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.mro.borrow().value, MroSlot::Resolved(_))
    }

    // ========== Crate-internal slot access ==========

    pub(crate) fn bases_rc(&self) -> Rc<[ClassRef]> {
        Rc::clone(&self.bases.borrow().value)
    }

    pub(crate) fn bases_stamp(&self) -> Stamp {
        self.bases.borrow().stamp
    }

    pub(crate) fn mro_stamp(&self) -> Stamp {
        self.mro.borrow().stamp
    }

    /// Ancestors (MRO without the head), if resolved.
    pub(crate) fn ancestors(&self) -> Option<Rc<[ClassRef]>> {
        match &self.mro.borrow().value {
            MroSlot::Unset => None,
            MroSlot::Resolved(ancestors) => Some(Rc::clone(ancestors)),
        }
    }

    fn fresh_stamp(&self) -> Stamp {
        let raw = self.next_stamp.get();
        self.next_stamp.set(raw + 1);
        Stamp::new(raw)
    }

    pub(crate) fn write_bases(&self, value: Rc<[ClassRef]>) -> Displaced<Rc<[ClassRef]>> {
        let new_stamp = self.fresh_stamp();
        let previous = std::mem::replace(
            &mut *self.bases.borrow_mut(),
            Stamped {
                value,
                stamp: new_stamp,
            },
        );
        Displaced {
            old: previous.value,
            old_stamp: previous.stamp,
            new_stamp,
        }
    }

    /// Put back a displaced base list, unless a later write replaced ours.
    /// Returns the list that was removed when the restore happened.
    pub(crate) fn restore_bases(
        &self,
        expected: Stamp,
        old: Rc<[ClassRef]>,
        old_stamp: Stamp,
    ) -> Option<Rc<[ClassRef]>> {
        if self.bases_stamp() != expected {
            return None;
        }
        let previous = std::mem::replace(
            &mut *self.bases.borrow_mut(),
            Stamped {
                value: old,
                stamp: old_stamp,
            },
        );
        Some(previous.value)
    }

    pub(crate) fn write_mro(&self, value: MroSlot) -> Displaced<MroSlot> {
        let new_stamp = self.fresh_stamp();
        let previous = std::mem::replace(
            &mut *self.mro.borrow_mut(),
            Stamped {
                value,
                stamp: new_stamp,
            },
        );
        Displaced {
            old: previous.value,
            old_stamp: previous.stamp,
            new_stamp,
        }
    }

    pub(crate) fn restore_mro(&self, expected: Stamp, old: MroSlot, old_stamp: Stamp) -> bool {
        if self.mro_stamp() != expected {
            return false;
        }
        let previous = std::mem::replace(
            &mut *self.mro.borrow_mut(),
            Stamped {
                value: old,
                stamp: old_stamp,
            },
        );
        drop(previous);
        true
    }

    pub(crate) fn push_pending(&self, bases: Rc<[ClassRef]>) {
        self.pending_bases.borrow_mut().push(bases);
    }

    pub(crate) fn pop_pending(&self, bases: &Rc<[ClassRef]>) {
        let removed = {
            let mut pending = self.pending_bases.borrow_mut();
            pending
                .iter()
                .rposition(|p| Rc::ptr_eq(p, bases))
                .map(|idx| pending.remove(idx))
        };
        drop(removed);
    }

    /// Bases that an in-flight transaction may still restore.
    pub(crate) fn pending_bases(&self) -> Vec<ClassRef> {
        self.pending_bases
            .borrow()
            .iter()
            .flat_map(|list| list.iter().cloned())
            .collect()
    }
}

impl Drop for ClassNode {
    fn drop(&mut self) {
        let bases = Rc::clone(&self.bases.get_mut().value);
        for base in bases.iter() {
            base.forget_subclass(self.id);
        }
    }
}

impl PartialEq for ClassNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassNode {}

impl Hash for ClassNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ClassNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ClassNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
