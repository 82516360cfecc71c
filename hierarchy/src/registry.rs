//! Subclass registry.
//!
//! Each class keeps weak references to its direct subclasses. The registry is
//! updated together with every base write, so `B ∈ A.subclasses ⟺ A ∈ B.bases`
//! holds even while a transaction is in flight.

use std::collections::HashSet;
use std::rc::Rc;

use lineage_core::{ClassId, HierarchyError, HierarchyResult};

use crate::class::{ClassNode, ClassRef, WeakClassRef};

impl ClassNode {
    /// Live direct subclasses, in registration order.
    pub fn subclasses(&self) -> Vec<ClassRef> {
        self.subclasses
            .borrow()
            .iter()
            .filter_map(|(_, weak)| weak.upgrade())
            .collect()
    }

    /// Register `child` as a direct subclass. Idempotent.
    pub(crate) fn add_subclass(&self, child: &ClassRef) {
        let mut registry = self.subclasses.borrow_mut();
        registry.retain(|(_, weak)| weak.strong_count() > 0);
        if registry.iter().any(|(id, _)| *id == child.id()) {
            return;
        }
        registry.push((child.id(), Rc::downgrade(child)));
    }

    /// Unregister a direct subclass. Idempotent.
    pub(crate) fn remove_subclass(&self, child: ClassId) {
        self.subclasses
            .borrow_mut()
            .retain(|(id, weak)| *id != child && weak.strong_count() > 0);
    }

    /// Called while a subclass is being destroyed. Skips silently if the
    /// registry is currently borrowed; dead entries are pruned on next write.
    pub(crate) fn forget_subclass(&self, child: ClassId) {
        if let Ok(mut registry) = self.subclasses.try_borrow_mut() {
            registry.retain(|(id, weak)| *id != child && weak.strong_count() > 0);
        }
    }

    pub(crate) fn has_subclass(&self, child: ClassId) -> bool {
        self.subclasses
            .borrow()
            .iter()
            .any(|(id, weak)| *id == child && weak.strong_count() > 0)
    }
}

/// Move `child` from the registries of `old` to those of `new`.
///
/// Classes present in both lists are left untouched. Safe to repeat.
pub(crate) fn relink(child: &ClassRef, old: &[ClassRef], new: &[ClassRef]) {
    for base in old {
        if !new.iter().any(|b| b.id() == base.id()) {
            base.remove_subclass(child.id());
        }
    }
    for base in new {
        base.add_subclass(child);
    }
}

/// Bring the registries in line with the class's current bases, dropping
/// registrations left on `displaced` bases.
pub(crate) fn reconcile(child: &ClassRef, displaced: &[ClassRef]) {
    let current = child.bases_rc();
    relink(child, displaced, &current);
}

/// Result of a depth-first walk over the registry.
struct Walk {
    preorder: Vec<ClassRef>,
    postorder: Vec<ClassRef>,
}

/// Depth-first walk from `root` over direct subclasses in registration order.
///
/// Tracks the current path and finished nodes explicitly: shared subclasses
/// (diamonds) are visited once, and a class met again on the current path is
/// reported as a registry cycle instead of looping.
fn walk(root: &ClassRef) -> HierarchyResult<Walk> {
    let mut on_path: HashSet<ClassId> = HashSet::new();
    let mut finished: HashSet<ClassId> = HashSet::new();
    let mut preorder = Vec::new();
    let mut postorder = Vec::new();
    let mut stack: Vec<(ClassRef, Vec<ClassRef>, usize)> = Vec::new();

    on_path.insert(root.id());
    preorder.push(Rc::clone(root));
    stack.push((Rc::clone(root), root.subclasses(), 0));

    loop {
        let next = match stack.last_mut() {
            None => break,
            Some((_, children, cursor)) => {
                if *cursor < children.len() {
                    *cursor += 1;
                    Some(Rc::clone(&children[*cursor - 1]))
                } else {
                    None
                }
            }
        };

        match next {
            Some(child) => {
                if on_path.contains(&child.id()) {
                    return Err(HierarchyError::registry_cycle(child.name()));
                }
                if finished.contains(&child.id()) {
                    continue;
                }
                on_path.insert(child.id());
                preorder.push(Rc::clone(&child));
                let grandchildren = child.subclasses();
                stack.push((child, grandchildren, 0));
            }
            None => {
                if let Some((node, _, _)) = stack.pop() {
                    on_path.remove(&node.id());
                    finished.insert(node.id());
                    postorder.push(node);
                }
            }
        }
    }

    Ok(Walk {
        preorder,
        postorder,
    })
}

/// All live transitive subclasses of `root` (excluding `root`), in
/// depth-first registration order. Fails on a cyclic registry.
pub fn transitive_subclasses(root: &ClassRef) -> HierarchyResult<Vec<ClassRef>> {
    let mut walk = walk(root)?;
    walk.preorder.remove(0);
    Ok(walk.preorder)
}

/// `root` followed by its transitive subclasses, ordered so that every class
/// comes after all of its bases within the set (reverse post-order).
pub(crate) fn linearization_order(root: &ClassRef) -> HierarchyResult<Vec<WeakClassRef>> {
    let walk = walk(root)?;
    Ok(walk.postorder.iter().rev().map(Rc::downgrade).collect())
}
