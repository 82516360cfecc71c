//! Property tests: random base reassignments over a small fixed pool.
//!
//! Whatever sequence of requests is applied, a failed request leaves no
//! trace and a successful one leaves every MRO equal to a C3 computed from
//! scratch over the current bases.

use std::collections::{HashMap, HashSet};

use lineage_hierarchy::JournalEntry;
use lineage_tests::prelude::*;
use proptest::prelude::*;

const POOL: [(&str, &[&str]); 6] = [
    ("C0", &[]),
    ("C1", &[]),
    ("C2", &["C0"]),
    ("C3", &["C1"]),
    ("C4", &["C2", "C3"]),
    ("C5", &["C0"]),
];

fn pool() -> World {
    let mut world = World::new();
    for (name, bases) in POOL {
        world.define(name, bases).unwrap();
    }
    world
}

/// Bases, MRO and (unordered) subclasses of every class.
type Snapshot = Vec<(String, Vec<String>, Option<Vec<String>>, Vec<String>)>;

fn snapshot(world: &World) -> Snapshot {
    world
        .names()
        .into_iter()
        .map(|name| {
            let mut subclasses = world.subclasses(&name);
            subclasses.sort();
            let bases = world.bases(&name);
            let mro = world.mro(&name);
            (name, bases, mro, subclasses)
        })
        .collect()
}

/// Textbook C3 over the world's current bases.
fn reference_mro(world: &World, name: &str, memo: &mut HashMap<String, Option<Vec<String>>>) -> Option<Vec<String>> {
    if let Some(known) = memo.get(name) {
        return known.clone();
    }
    let bases = world.bases(name);
    let mut sequences: Vec<Vec<String>> = Vec::new();
    for base in &bases {
        sequences.push(reference_mro(world, base, memo)?);
    }
    sequences.push(bases);

    let mut result = vec![name.to_string()];
    loop {
        sequences.retain(|s| !s.is_empty());
        if sequences.is_empty() {
            break;
        }
        let head = sequences
            .iter()
            .map(|s| &s[0])
            .find(|candidate| !sequences.iter().any(|s| s[1..].contains(*candidate)))
            .cloned();
        let head = match head {
            Some(head) => head,
            None => {
                memo.insert(name.to_string(), None);
                return None;
            }
        };
        for seq in sequences.iter_mut() {
            if seq[0] == head {
                seq.remove(0);
            }
        }
        result.push(head);
    }
    memo.insert(name.to_string(), Some(result.clone()));
    Some(result)
}

fn request() -> impl Strategy<Value = Vec<(usize, Vec<usize>)>> {
    prop::collection::vec((0..6usize, prop::collection::vec(0..6usize, 0..3)), 1..25)
}

proptest! {
    #[test]
    fn prop_failed_requests_leave_no_trace(ops in request()) {
        let world = pool();
        for (target, bases) in ops {
            let target = POOL[target].0;
            let bases: Vec<&str> = bases.iter().map(|i| POOL[*i].0).collect();

            let before = snapshot(&world);
            let result = world.set_bases(target, &bases);

            prop_assert!(world.hierarchy().verify().is_ok());
            prop_assert_eq!(world.hierarchy().depth(), 0);
            if result.is_err() {
                prop_assert_eq!(snapshot(&world), before);
            }
        }
    }

    #[test]
    fn prop_successful_requests_match_c3(ops in request()) {
        let world = pool();
        for (target, bases) in ops {
            let target = POOL[target].0;
            let bases: Vec<&str> = bases.iter().map(|i| POOL[*i].0).collect();

            if world.set_bases(target, &bases).is_err() {
                continue;
            }
            let expected: Vec<String> = bases.iter().map(|b| b.to_string()).collect();
            prop_assert_eq!(world.bases(target), expected);

            let mut memo = HashMap::new();
            for name in world.names() {
                let reference = reference_mro(&world, &name, &mut memo);
                prop_assert!(reference.is_some(), "{} has no C3 linearization", name);
                prop_assert_eq!(world.mro(&name), reference);
            }
        }
    }

    #[test]
    fn prop_every_transaction_closes_once(ops in request()) {
        let world = pool();
        for (target, bases) in ops {
            let bases: Vec<&str> = bases.iter().map(|i| POOL[*i].0).collect();
            let _ = world.set_bases(POOL[target].0, &bases);
        }

        let journal = world.hierarchy().journal();
        let begun: HashSet<_> = journal.iter().filter(|e| e.is_begin()).map(JournalEntry::txn).collect();
        let mut closed = HashSet::new();
        for entry in journal.iter().filter(|e| !e.is_begin()) {
            prop_assert!(begun.contains(&entry.txn()));
            prop_assert!(closed.insert(entry.txn()), "{} closed twice", entry.txn());
        }
        prop_assert_eq!(closed, begun);
    }
}
