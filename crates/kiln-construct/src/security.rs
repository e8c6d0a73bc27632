//! Instantiation deny-list gate.
//!
//! Consulted unconditionally before any construction strategy, including
//! cached replays; never bypassed.

use kiln_model::{TypeId, TypeStore};

use crate::ConstructError;

/// Type paths denied by exact match, independent of whether the registered
/// lattice links them to a deny-list base.
const DENIED_TYPE_PATHS: &[&str] = &["process.ChildImpl"];

/// The deny-list entry `ty` is assignable to, if any.
pub fn forbidden_base(store: &TypeStore, ty: TypeId) -> Option<TypeId> {
    for base in store.well_known().denied() {
        if store.is_assignable(base, ty) {
            return Some(base);
        }
    }
    if DENIED_TYPE_PATHS.contains(&store.path(ty)) {
        return Some(ty);
    }
    None
}

pub fn is_forbidden(store: &TypeStore, ty: TypeId) -> bool {
    forbidden_base(store, ty).is_some()
}

/// Fail with [`ConstructError::SecurityDenied`] when `ty` is on the
/// deny-list. The error names the denied base type, as that is the security
/// concern being reported.
pub fn check(store: &TypeStore, ty: TypeId) -> Result<(), ConstructError> {
    match forbidden_base(store, ty) {
        Some(base) => Err(ConstructError::SecurityDenied {
            type_path: store.path(base).to_string(),
        }),
        None => Ok(()),
    }
}
