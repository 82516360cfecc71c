//! Package import scenarios.
//!
//! Each module import commits on its own, so a failure deep in a dotted name
//! unloads only the module whose init code failed.

use std::cell::Cell;
use std::rc::Rc;

use lineage_import::{Importer, InitResult, MemoryFinder, ModuleRef, ModuleSpec};
use lineage_tests::init_tracing;
use pretty_assertions::assert_eq;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("division by zero")]
struct DivisionByZero;

fn raise() -> InitResult {
    Err(Box::new(DivisionByZero))
}

fn loaded(importer: &Importer) -> Vec<String> {
    let mut names = importer.loaded();
    names.sort();
    names
}

// ========== TEST: deep_chain_binds_every_level ==========
#[test]
fn test_deep_chain_binds_every_level() {
    // GIVEN three nested packages and a leaf module
    init_tracing();
    let finder = MemoryFinder::new()
        .package("a")
        .package("a.b")
        .package("a.b.c")
        .module("a.b.c.d");
    let importer = Importer::new().with_finder(finder);

    // WHEN importing the leaf
    let top = importer.import("a.b.c.d").unwrap();

    // THEN every level is loaded and bound on its parent
    assert_eq!(top.name(), "a");
    assert_eq!(loaded(&importer), vec!["a", "a.b", "a.b.c", "a.b.c.d"]);
    let d = top
        .attr("b")
        .and_then(|b| b.attr("c"))
        .and_then(|c| c.attr("d"))
        .unwrap();
    assert!(Rc::ptr_eq(&d, &importer.get("a.b.c.d").unwrap()));
}

// ========== TEST: failure_in_middle_keeps_ancestors ==========
#[test]
fn test_failure_in_middle_keeps_ancestors() {
    // GIVEN a.b whose init fails
    init_tracing();
    let finder = MemoryFinder::new()
        .package("a")
        .package("a.b")
        .module("a.b.c")
        .with_init("a.b", |_: &Importer, _: &ModuleRef| raise());
    let importer = Importer::new().with_finder(finder);

    // WHEN importing below it
    let err = importer.import("a.b.c").unwrap_err();

    // THEN the error names a.b, and only a stays loaded and unbound
    assert_eq!(err.name(), Some("a.b"));
    assert!(err.init_failure::<DivisionByZero>().is_some());
    assert_eq!(loaded(&importer), vec!["a"]);
    assert!(!importer.get("a").unwrap().has_attr("b"));
}

// ========== TEST: nested_failure_passes_through ==========
#[test]
fn test_nested_failure_passes_through() {
    // GIVEN a package whose init imports a failing submodule
    let finder = MemoryFinder::new()
        .package("a")
        .module("a.x")
        .with_init("a", |imp: &Importer, _: &ModuleRef| {
            imp.import_module("a.x")?;
            Ok(())
        })
        .with_init("a.x", |_: &Importer, _: &ModuleRef| raise());
    let importer = Importer::new().with_finder(finder);

    // WHEN
    let err = importer.import("a").unwrap_err();

    // THEN the submodule's error reaches the caller unchanged
    assert_eq!(err.name(), Some("a.x"));
    assert!(err.init_failure::<DivisionByZero>().is_some());
    assert!(loaded(&importer).is_empty());
}

// ========== TEST: first_finder_wins ==========
#[test]
fn test_first_finder_wins() {
    let importer = Importer::new()
        .with_finder(MemoryFinder::new().package("m"))
        .with_finder(MemoryFinder::new().module("m").module("n"));

    assert!(importer.import_module("m").unwrap().is_package());
    assert!(!importer.import_module("n").unwrap().is_package());
    assert!(importer.import_module("o").unwrap_err().is_not_found());
}

// ========== TEST: removed_module_runs_init_again ==========
#[test]
fn test_removed_module_runs_init_again() {
    // GIVEN a module counting its init runs
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    let spec = ModuleSpec::new("m", false).with_init(move |_: &Importer, _: &ModuleRef| {
        counter.set(counter.get() + 1);
        Ok(())
    });
    let importer = Importer::new().with_finder(MemoryFinder::new().with_spec(spec));

    // WHEN importing twice, removing, and importing again
    let first = importer.import_module("m").unwrap();
    let again = importer.import_module("m").unwrap();
    assert!(Rc::ptr_eq(&first, &again));
    assert_eq!(runs.get(), 1);

    importer.remove("m");
    let fresh = importer.import_module("m").unwrap();

    // THEN init ran once more and produced a new module
    assert_eq!(runs.get(), 2);
    assert!(!Rc::ptr_eq(&first, &fresh));
}

// ========== TEST: relative_import_from_subpackage ==========
#[test]
fn test_relative_import_from_subpackage() {
    let finder = MemoryFinder::new()
        .package("a")
        .package("a.b")
        .module("a.sibling")
        .with_init("a.b", |imp: &Importer, _: &ModuleRef| {
            imp.import_relative("sibling", "a.b", 2)?;
            Ok(())
        });
    let importer = Importer::new().with_finder(finder);

    importer.import("a.b").unwrap();

    assert_eq!(loaded(&importer), vec!["a", "a.b", "a.sibling"]);
    assert!(importer.get("a").unwrap().has_attr("sibling"));
    assert!(importer.import_relative("x", "a.b", 3).is_err());
}
