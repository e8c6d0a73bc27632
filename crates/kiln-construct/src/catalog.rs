//! Per-type, inheritance-flattened field catalogs.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use kiln_model::{
    FieldDecl, FieldStoreFn, Object, TypeDescriptor, TypeId, TypeKind, TypeStore, Value,
    SCRIPT_META_FIELD, SCRIPT_META_TYPE,
};

use crate::ConstructError;

/// Ordered field-name → entry map for one type: most-derived level first, in
/// declaration order within each level.
pub type FieldMap = IndexMap<String, FieldEntry>;

/// Resolved view of one declared field.
#[derive(Clone)]
pub struct FieldEntry {
    /// Declared field name. The map key differs when a subclass shadows it:
    /// the ancestor's entry is keyed `"<OwningTypeSimpleName>.<name>"`.
    pub name: String,
    /// Type that declares the field.
    pub declaring: TypeId,
    /// Declared field type.
    pub ty: TypeId,
    store: Option<FieldStoreFn>,
    accessible: bool,
}

impl FieldEntry {
    /// Whether direct writes are open for this field. Non-public fields are
    /// opened best-effort during catalog construction; when the host
    /// registered no store thunk the entry stays closed, silently.
    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    /// Write `value` directly into the field's storage on `target`,
    /// bypassing any setter logic.
    pub fn assign(
        &self,
        store: &TypeStore,
        target: &mut Object,
        value: Value,
    ) -> Result<(), ConstructError> {
        let denied = || ConstructError::FieldAssignmentDenied {
            type_path: store.path(self.declaring).to_string(),
            field: self.name.clone(),
        };
        let Some(thunk) = self.store.as_ref().filter(|_| self.accessible) else {
            return Err(denied());
        };
        thunk(target.data_mut(), value).map_err(|_| denied())
    }
}

/// Shared catalog of inheritance-flattened field maps, built lazily per type
/// and cached for the life of the catalog.
///
/// Concurrent first-time population for the same type is tolerated: both
/// threads compute the same pure function of the type and either result is
/// kept. Cached maps are immutable and shared by `Arc`; callers never see
/// the authoritative entry mutably.
pub struct FieldCatalog {
    cache: RwLock<HashMap<TypeId, Arc<FieldMap>>>,
}

impl FieldCatalog {
    pub fn new() -> Self {
        FieldCatalog {
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// All settable fields of `ty`, walking the superclass chain (never
    /// interfaces) from `ty` to the root. A type with no fields yields an
    /// empty map.
    pub fn fields(&self, store: &TypeStore, ty: TypeId) -> Arc<FieldMap> {
        if let Some(hit) = self.cache.read().get(&ty) {
            return Arc::clone(hit);
        }
        let built = Arc::new(build_field_map(store, ty));
        self.cache.write().insert(ty, Arc::clone(&built));
        built
    }

    /// Single-field lookup by catalog key.
    pub fn field(&self, store: &TypeStore, ty: TypeId, name: &str) -> Option<FieldEntry> {
        self.fields(store, ty).get(name).cloned()
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn build_field_map(store: &TypeStore, ty: TypeId) -> FieldMap {
    let mut map = FieldMap::new();

    let mut current = Some(ty);
    while let Some(id) = current {
        let Some(desc) = store.get(id) else {
            break;
        };
        for field in &desc.fields {
            if field.is_static {
                continue;
            }
            if is_runtime_internal(store, desc, field) {
                continue;
            }

            // Access opening is best-effort: a field is open exactly when the
            // host registered a store thunk for it. A missing thunk degrades
            // the entry instead of erroring.
            let entry = FieldEntry {
                name: field.name.clone(),
                declaring: id,
                ty: field.ty,
                store: field.store.clone(),
                accessible: field.store.is_some(),
            };

            if map.contains_key(field.name.as_str()) {
                // A more-derived class already claimed the plain name; file
                // this ancestor's field under its owner's simple name.
                map.insert(format!("{}.{}", desc.simple_name, field.name), entry);
            } else {
                map.insert(field.name.clone(), entry);
            }
        }
        current = desc.superclass;
    }

    map
}

/// Runtime bookkeeping fields excluded from every catalog: enum
/// ordinal/hash internals and the scripting-engine metadata field.
fn is_runtime_internal(store: &TypeStore, desc: &TypeDescriptor, field: &FieldDecl) -> bool {
    if desc.kind == TypeKind::Enum
        && matches!(field.name.as_str(), "ordinal" | "hash" | "internal")
    {
        return true;
    }
    field.name == SCRIPT_META_FIELD && store.path(field.ty) == SCRIPT_META_TYPE
}
