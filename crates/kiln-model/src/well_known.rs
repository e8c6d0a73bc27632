use serde::{Deserialize, Serialize};

use crate::TypeId;

/// Container kind a read-only wrapper type corresponds to.
///
/// The constructor resolver maps types carrying (or inheriting) one of these
/// marks to a fresh mutable container value instead of attempting reflective
/// construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerShape {
    /// Insertion-ordered map.
    Map,
    /// Key-sorted map.
    SortedMap,
    /// Hash-ordered set.
    Set,
    /// Sorted set.
    SortedSet,
    /// Generic ordered collection.
    Collection,
    /// The canonical empty list. Under value semantics the shared singleton
    /// collapses to a fresh empty list.
    EmptyList,
}

/// Type ids for the fixed universe every [`crate::TypeStore`] registers at
/// construction: the placeholder catalog the argument synthesizer recognizes,
/// the collection interfaces, and the instantiation deny-list.
#[derive(Clone, Copy, Debug)]
pub struct WellKnownTypes {
    pub object: TypeId,
    /// The "type-of-types" value (`core.Type`).
    pub class_type: TypeId,
    pub string: TypeId,
    /// Root of the numeric tower; wide numbers and the numeric atomics hang
    /// off it.
    pub number: TypeId,

    pub date: TypeId,
    pub timestamp: TypeId,
    pub local_date: TypeId,
    pub local_date_time: TypeId,
    pub zoned_date_time: TypeId,
    pub zone_id: TypeId,
    pub calendar: TypeId,
    pub time_zone: TypeId,

    pub big_integer: TypeId,
    pub big_decimal: TypeId,
    pub string_builder: TypeId,
    pub string_buffer: TypeId,
    pub locale: TypeId,
    pub url: TypeId,
    pub atomic_bool: TypeId,
    pub atomic_int: TypeId,
    pub atomic_long: TypeId,

    pub collection: TypeId,
    pub list: TypeId,
    pub set: TypeId,
    pub sorted_set: TypeId,
    pub map: TypeId,
    pub sorted_map: TypeId,

    // Instantiation deny-list: process control and reflective capability
    // types. Consulted by the security gate, never bypassed.
    pub process: TypeId,
    pub process_builder: TypeId,
    pub class_loader: TypeId,
    pub constructor_handle: TypeId,
    pub method_handle: TypeId,
    pub field_handle: TypeId,
}

impl WellKnownTypes {
    /// All deny-list entries, in the order the security gate consults them.
    pub fn denied(&self) -> [TypeId; 6] {
        [
            self.process_builder,
            self.process,
            self.class_loader,
            self.constructor_handle,
            self.method_handle,
            self.field_handle,
        ]
    }
}
