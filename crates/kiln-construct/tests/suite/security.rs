use pretty_assertions::assert_eq;

use kiln_construct::{forbidden_base, is_forbidden, ConstructError, Instantiator};
use kiln_model::{TypeDescriptor, TypeStore, Visibility};

use super::fixtures::{call_log, calls, succeeding_ctor};

#[test]
fn every_deny_list_entry_is_forbidden() {
    let store = TypeStore::new();
    for ty in store.well_known().denied() {
        assert!(is_forbidden(&store, ty), "{} should be denied", store.path(ty));
    }
    assert!(!is_forbidden(&store, store.well_known().string));
}

#[test]
fn subclasses_of_deny_list_entries_are_refused_without_invoking_constructors() {
    let mut store = TypeStore::new();
    let log = call_log();
    let process = store.well_known().process;
    // A perfectly constructible type; the gate must still win.
    let sneaky = store.register(
        TypeDescriptor::class("app.Sneaky")
            .extends(process)
            .with_constructor(succeeding_ctor(Vec::new(), Visibility::Public, &log, "ctor")),
    );

    let resolver = Instantiator::new();
    let err = resolver.instantiate(&store, sneaky).unwrap_err();
    match err {
        // The error names the deny-list base, not the subclass.
        ConstructError::SecurityDenied { type_path } => assert_eq!(type_path, "process.Child"),
        other => panic!("expected SecurityDenied, got {other}"),
    }
    assert_eq!(calls(&log), Vec::<&str>::new());
    assert_eq!(forbidden_base(&store, sneaky), Some(process));
}

#[test]
fn the_hidden_process_implementation_is_denied() {
    let store = TypeStore::new();
    let hidden = store.find("process.ChildImpl").unwrap();
    assert!(is_forbidden(&store, hidden));

    let resolver = Instantiator::new();
    let err = resolver.instantiate(&store, hidden).unwrap_err();
    assert!(matches!(err, ConstructError::SecurityDenied { .. }));
}

#[test]
fn reflective_capability_types_are_denied_even_with_raw_alloc_enabled() {
    let store = TypeStore::new();
    let wk = store.well_known();

    let resolver = Instantiator::new();
    resolver.set_allow_raw_alloc(true);
    for ty in [wk.constructor_handle, wk.method_handle, wk.field_handle, wk.class_loader] {
        let err = resolver.instantiate(&store, ty).unwrap_err();
        assert!(
            matches!(err, ConstructError::SecurityDenied { .. }),
            "{} should be denied",
            store.path(ty)
        );
    }
}
