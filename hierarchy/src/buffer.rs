//! Transaction buffer for undoing tentative writes.

use std::rc::Rc;

use crate::class::{ClassRef, Displaced, MroSlot};
use crate::registry::relink;

/// A tentative write made by the current transaction.
enum PendingWrite {
    /// A base list replaced by `set_bases`.
    Bases {
        class: ClassRef,
        displaced: Displaced<Rc<[ClassRef]>>,
    },
    /// An MRO cleared or replaced during propagation.
    Mro {
        class: ClassRef,
        displaced: Displaced<MroSlot>,
    },
}

/// Transaction buffer that tracks uncommitted writes.
///
/// Writes go straight to the classes; the buffer only remembers what they
/// displaced. Rolling back undoes them in reverse order, skipping any slot a
/// nested transaction has since committed over.
#[derive(Default)]
pub(crate) struct TransactionBuffer {
    writes: Vec<PendingWrite>,
}

impl TransactionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a base-list write.
    pub fn track_bases(&mut self, class: &ClassRef, displaced: Displaced<Rc<[ClassRef]>>) {
        self.writes.push(PendingWrite::Bases {
            class: Rc::clone(class),
            displaced,
        });
    }

    /// Track an MRO write.
    pub fn track_mro(&mut self, class: &ClassRef, displaced: Displaced<MroSlot>) {
        self.writes.push(PendingWrite::Mro {
            class: Rc::clone(class),
            displaced,
        });
    }

    /// Forget the MRO writes made to `class`.
    ///
    /// Used once a nested transaction has committed a newer MRO for the class:
    /// those entries can never be restored, and keeping them would pin the
    /// displaced ancestor lists until this transaction ends.
    pub fn retire(&mut self, class: &ClassRef) -> usize {
        let before = self.writes.len();
        self.writes.retain(|write| match write {
            PendingWrite::Mro { class: written, .. } => written.id() != class.id(),
            PendingWrite::Bases { .. } => true,
        });
        before - self.writes.len()
    }

    /// Undo every tracked write, newest first. Returns how many slots were
    /// actually restored.
    pub fn rollback(self) -> usize {
        let mut restored = 0;
        for write in self.writes.into_iter().rev() {
            match write {
                PendingWrite::Mro { class, displaced } => {
                    if class.restore_mro(displaced.new_stamp, displaced.old, displaced.old_stamp) {
                        restored += 1;
                    }
                }
                PendingWrite::Bases { class, displaced } => {
                    let old = Rc::clone(&displaced.old);
                    if let Some(removed) =
                        class.restore_bases(displaced.new_stamp, displaced.old, displaced.old_stamp)
                    {
                        relink(&class, &removed, &old);
                        restored += 1;
                    }
                }
            }
        }
        restored
    }

    /// Keep every write. Returns how many were tracked.
    pub fn commit(self) -> usize {
        self.writes.len()
    }
}
