use std::sync::Arc;

use pretty_assertions::assert_eq;

use kiln_construct::{ConstructError, FieldCatalog, Instantiator};
use kiln_model::{FieldDecl, TypeDescriptor, TypeStore, Value};

use super::fixtures::{register_widget, Widget};

#[test]
fn catalog_flattens_the_superclass_chain_most_derived_first() {
    let mut store = TypeStore::new();
    let wk = *store.well_known();
    let long = store.find("long").unwrap();
    let double = store.find("double").unwrap();

    let base = store.register(
        TypeDescriptor::class("geom.Base")
            .extends(wk.object)
            .with_field(FieldDecl::new("id", long))
            .with_field(FieldDecl::new("created", wk.date)),
    );
    let circle = store.register(
        TypeDescriptor::class("geom.Circle")
            .extends(base)
            .with_field(FieldDecl::new("id", double))
            .with_field(FieldDecl::new("radius", double)),
    );

    let catalog = FieldCatalog::new();
    let fields = catalog.fields(&store, circle);
    let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
    // The subclass claims the plain name; the shadowed ancestor field is
    // filed under its owner's simple name.
    assert_eq!(keys, vec!["id", "radius", "Base.id", "created"]);

    let shadowed = &fields["Base.id"];
    assert_eq!(shadowed.name, "id");
    assert_eq!(shadowed.declaring, base);
    assert_eq!(shadowed.ty, long);
    assert_eq!(fields["id"].declaring, circle);
}

#[test]
fn static_and_runtime_internal_fields_are_excluded() {
    let mut store = TypeStore::new();
    let wk = *store.well_known();
    let int = store.find("int").unwrap();

    let meta_ty = store.register(TypeDescriptor::class("script.MetaClass").extends(wk.object));
    let status = store.register(
        TypeDescriptor::enumeration("app.Status")
            .extends(wk.object)
            .with_field(FieldDecl::new("ordinal", int))
            .with_field(FieldDecl::new("hash", int))
            .with_field(FieldDecl::new("internal", int))
            .with_field(FieldDecl::new("code", int))
            .with_field(FieldDecl::new("ALL", int).static_())
            .with_field(FieldDecl::new("metaClass", meta_ty)),
    );

    let catalog = FieldCatalog::new();
    let fields = catalog.fields(&store, status);
    let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["code"]);
}

#[test]
fn script_metadata_exclusion_requires_the_declared_type_to_match() {
    let mut store = TypeStore::new();
    let wk = *store.well_known();
    // A field merely named `metaClass` with an unrelated type is ordinary
    // data and stays in the catalog.
    let ty = store.register(
        TypeDescriptor::class("app.Template")
            .extends(wk.object)
            .with_field(FieldDecl::new("metaClass", wk.string)),
    );

    let catalog = FieldCatalog::new();
    let fields = catalog.fields(&store, ty);
    assert_eq!(fields.len(), 1);
    assert!(fields.contains_key("metaClass"));
}

#[test]
fn assignment_writes_through_the_store_thunk() {
    let mut store = TypeStore::new();
    let ty = register_widget(&mut store);
    let catalog = FieldCatalog::new();
    let resolver = Instantiator::new();

    let Value::Object(mut obj) = resolver.instantiate(&store, ty).unwrap() else {
        panic!("expected object");
    };

    let id = catalog.field(&store, ty, "id").unwrap();
    assert!(id.is_accessible());
    id.assign(&store, &mut obj, Value::I64(41)).unwrap();

    // Non-public field opened through its store thunk.
    let label = catalog.field(&store, ty, "label").unwrap();
    assert!(label.is_accessible());
    label
        .assign(&store, &mut obj, Value::Str("lamp".to_string()))
        .unwrap();

    assert_eq!(
        obj.downcast_ref::<Widget>(),
        Some(&Widget {
            id: 41,
            label: "lamp".to_string(),
        })
    );
}

#[test]
fn fields_without_store_thunks_stay_closed() {
    let mut store = TypeStore::new();
    let wk = *store.well_known();
    let ty = store.register(
        TypeDescriptor::class("app.Sealed")
            .extends(wk.object)
            .with_field(FieldDecl::new("secret", wk.string).non_public()),
    );

    let catalog = FieldCatalog::new();
    let entry = catalog.field(&store, ty, "secret").unwrap();
    assert!(!entry.is_accessible());

    let mut obj = kiln_model::Object::opaque(ty);
    let err = entry
        .assign(&store, &mut obj, Value::Str("x".to_string()))
        .unwrap_err();
    match err {
        ConstructError::FieldAssignmentDenied { type_path, field } => {
            assert_eq!(type_path, "app.Sealed");
            assert_eq!(field, "secret");
        }
        other => panic!("expected FieldAssignmentDenied, got {other}"),
    }
}

#[test]
fn a_mismatched_store_write_is_reported_as_denied() {
    let mut store = TypeStore::new();
    let ty = register_widget(&mut store);
    let catalog = FieldCatalog::new();
    let resolver = Instantiator::new();

    let Value::Object(mut obj) = resolver.instantiate(&store, ty).unwrap() else {
        panic!("expected object");
    };
    let id = catalog.field(&store, ty, "id").unwrap();
    let err = id
        .assign(&store, &mut obj, Value::Str("not a number".to_string()))
        .unwrap_err();
    assert!(matches!(err, ConstructError::FieldAssignmentDenied { .. }));
}

#[test]
fn field_maps_are_computed_once_and_shared() {
    let mut store = TypeStore::new();
    let ty = register_widget(&mut store);
    let catalog = FieldCatalog::new();

    let first = catalog.fields(&store, ty);
    let second = catalog.fields(&store, ty);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn a_type_with_no_fields_yields_an_empty_map() {
    let mut store = TypeStore::new();
    let object = store.well_known().object;
    let ty = store.register(TypeDescriptor::class("app.Marker").extends(object));
    let catalog = FieldCatalog::new();
    assert!(catalog.fields(&store, ty).is_empty());
}
