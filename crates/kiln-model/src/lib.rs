//! Type-metadata model for the kiln object-graph codec.
//!
//! Rust has no runtime reflection, so the codec works against an explicit
//! capability surface: hosts register the types the codec may materialize into
//! a [`TypeStore`], describing each one's place in the inheritance lattice,
//! its declared fields and constructors, and (where the host can provide them)
//! thunks for constructor invocation, direct field stores, and bare
//! allocation. The construction layer (`kiln-construct`) consumes this model
//! and never inspects concrete Rust types on its own.
//!
//! Instances and synthesized constructor arguments travel as dynamic
//! [`Value`]s; host-defined objects ride inside [`Object`], an `Any` box
//! tagged with its registered [`TypeId`].

mod store;
mod value;
mod well_known;

pub use store::{
    ConstructorDecl, FieldDecl, PrimitiveKind, TypeDescriptor, TypeId, TypeKind, TypeStore,
    Visibility, SCRIPT_META_FIELD, SCRIPT_META_TYPE,
};
pub use value::{InvokeError, Object, Value};
pub use well_known::{ContainerShape, WellKnownTypes};

use std::any::Any;
use std::sync::Arc;

/// Host-registered constructor thunk.
///
/// Failures are expected during brute-force constructor search and are
/// swallowed by the resolver; they only become an error once every candidate
/// is exhausted.
pub type InvokeFn =
    Arc<dyn Fn(&[Value]) -> Result<Box<dyn Any + Send>, InvokeError> + Send + Sync>;

/// Host-registered direct field store. Writes the value into the field's
/// storage on the target instance, bypassing any setter logic.
pub type FieldStoreFn =
    Arc<dyn Fn(&mut (dyn Any + Send), Value) -> Result<(), InvokeError> + Send + Sync>;

/// Host-registered bare allocation thunk: produces an instance without
/// running any constructor. Gated behind the resolver's raw-allocation
/// capability toggle.
pub type AllocFn = Arc<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>;
