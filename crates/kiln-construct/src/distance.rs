//! Inheritance/interface distance between two registered types.
//!
//! The result ranks candidate handlers for a concrete runtime type: the
//! smallest non-`None` distance is the most specific. Ties are broken by the
//! caller, not here.

use kiln_model::{TypeId, TypeKind, TypeStore};

/// Number of hierarchy edges from `concrete` up to `ancestor`, or `None`
/// when the two types are unrelated.
///
/// For a class ancestor this walks `concrete`'s superclass chain. For an
/// interface ancestor it explores the full multi-inheritance lattice (every
/// directly implemented interface that can reach `ancestor`, plus the
/// superclass when it qualifies) and takes the minimum path.
pub fn distance(store: &TypeStore, ancestor: TypeId, concrete: TypeId) -> Option<u32> {
    if matches!(store.get(ancestor)?.kind, TypeKind::Interface) {
        return interface_distance(store, ancestor, concrete);
    }

    let mut current = concrete;
    let mut steps = 0u32;
    while current != ancestor {
        steps += 1;
        current = store.get(current)?.superclass?;
    }
    Some(steps)
}

fn interface_distance(store: &TypeStore, to: TypeId, from: TypeId) -> Option<u32> {
    let desc = store.get(from)?;

    let mut candidates = Vec::new();
    for iface in &desc.interfaces {
        if *iface == to {
            return Some(1);
        }
        // Multi-inheritance: a more specific interface may reach `to`
        // through its own parents.
        if store.is_assignable(to, *iface) {
            candidates.push(*iface);
        }
    }
    if let Some(superclass) = desc.superclass {
        if store.is_assignable(to, superclass) {
            candidates.push(superclass);
        }
    }

    candidates
        .into_iter()
        .filter_map(|candidate| interface_distance(store, to, candidate))
        .min()
        .map(|steps| steps + 1)
}
