//! Generic object construction for the kiln object-graph codec.
//!
//! Everything the deserializer needs to turn parsed data back into typed
//! instances without compile-time knowledge of the target types: field
//! catalogs flattened over inheritance, constructor resolution with cached
//! strategies, scalar coercion, hierarchy distance ranking, and the
//! instantiation deny-list.
//!
//! All state lives in the structs callers create ([`FieldCatalog`],
//! [`Instantiator`]); there are no globals. The [`kiln_model::TypeStore`]
//! holding the registered type universe is passed in by reference.

mod catalog;
mod coerce;
mod distance;
mod error;
mod instantiate;
mod security;

pub use catalog::{FieldCatalog, FieldEntry, FieldMap};
pub use coerce::{coerce, default_for};
pub use distance::distance;
pub use error::{ConstructError, Result};
pub use instantiate::Instantiator;
pub use security::{check as security_check, forbidden_base, is_forbidden};
