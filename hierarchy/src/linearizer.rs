//! Linearizers: compute an MRO from a class's bases.

use std::rc::Rc;

use lineage_core::{HierarchyError, HierarchyResult, HookFailure};

use crate::class::{ClassRef, Mro};
use crate::hierarchy::Hierarchy;

/// Result returned by a linearization hook.
pub type HookResult = Result<(), HookFailure>;

/// Strategy producing the MRO of a class.
///
/// Implementations may call back into the hierarchy (including
/// `set_bases` on any class) before returning. The engine re-reads state
/// after every call, so implementations need not guard against that.
pub trait Linearizer {
    /// Compute the full MRO of `class`, starting with `class` itself.
    fn linearize(&self, hierarchy: &Hierarchy, class: &ClassRef) -> HierarchyResult<Vec<ClassRef>>;
}

/// C3 linearization over the current bases and their current MROs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLinearizer;

impl Linearizer for StandardLinearizer {
    fn linearize(&self, _hierarchy: &Hierarchy, class: &ClassRef) -> HierarchyResult<Vec<ClassRef>> {
        let bases = class.bases();

        let mut sequences: Vec<Vec<ClassRef>> = Vec::with_capacity(bases.len() + 1);
        for base in &bases {
            match base.mro() {
                Mro::Resolved(mro) => sequences.push(mro),
                Mro::Unset => return Err(HierarchyError::incomplete(base.name())),
            }
        }
        sequences.push(bases);

        let mut result = vec![Rc::clone(class)];
        merge(class, sequences, &mut result)?;
        Ok(result)
    }
}

/// Monotonic merge: repeatedly take the first head (in base order) that is
/// not in the tail of any other sequence.
fn merge(
    class: &ClassRef,
    mut sequences: Vec<Vec<ClassRef>>,
    result: &mut Vec<ClassRef>,
) -> HierarchyResult<()> {
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(());
        }

        let candidate = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|head| !sequences.iter().any(|seq| seq[1..].contains(*head)))
            .cloned();

        let Some(next) = candidate else {
            let heads: Vec<&str> = sequences.iter().map(|seq| seq[0].name()).collect();
            return Err(HierarchyError::not_linearizable(
                class.name(),
                format!("conflicting precedence among bases {}", heads.join(", ")),
            ));
        };

        for seq in sequences.iter_mut() {
            if seq[0] == next {
                seq.remove(0);
            }
        }
        result.push(next);
    }
}

/// Linearizer that runs a hook before delegating to an inner linearizer.
///
/// The hook sees the class as it currently is (its MRO may be unset) and may
/// mutate the hierarchy freely. Errors it raises abort the linearization.
pub struct HookedLinearizer<F> {
    hook: F,
    inner: Rc<dyn Linearizer>,
}

impl<F> HookedLinearizer<F>
where
    F: Fn(&Hierarchy, &ClassRef) -> HookResult,
{
    /// Hook in front of the C3 linearizer.
    pub fn new(hook: F) -> Self {
        Self::with_inner(hook, Rc::new(StandardLinearizer))
    }

    pub fn with_inner(hook: F, inner: Rc<dyn Linearizer>) -> Self {
        Self { hook, inner }
    }
}

impl<F> Linearizer for HookedLinearizer<F>
where
    F: Fn(&Hierarchy, &ClassRef) -> HookResult,
{
    fn linearize(&self, hierarchy: &Hierarchy, class: &ClassRef) -> HierarchyResult<Vec<ClassRef>> {
        (self.hook)(hierarchy, class).map_err(|e| HierarchyError::from_hook(class.name(), e))?;
        self.inner.linearize(hierarchy, class)
    }
}

/// Check a linearizer's output and strip the head.
///
/// The head must be the class itself; any class listed twice (the class
/// included) means the computed order describes a cycle.
pub(crate) fn validate(class: &ClassRef, sequence: Vec<ClassRef>) -> HierarchyResult<Rc<[ClassRef]>> {
    match sequence.first() {
        Some(head) if head.id() == class.id() => {}
        Some(head) => {
            return Err(HierarchyError::invalid_mro(
                class.name(),
                format!("starts with {} instead of the class itself", head.name()),
            ))
        }
        None => return Err(HierarchyError::invalid_mro(class.name(), "empty sequence")),
    }

    let mut seen = std::collections::HashSet::with_capacity(sequence.len());
    for entry in &sequence {
        if !seen.insert(entry.id()) {
            return Err(HierarchyError::linearization_cycle(class.name()));
        }
    }

    Ok(Rc::from(&sequence[1..]))
}
