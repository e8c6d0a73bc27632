use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use url::Url;

use crate::TypeId;

/// Error raised by a host-registered thunk (constructor invocation, field
/// store, allocation helper) when the supplied values cannot land in the
/// target slot.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct InvokeError(pub String);

impl InvokeError {
    pub fn new(message: impl Into<String>) -> Self {
        InvokeError(message.into())
    }
}

/// A host-defined instance: an `Any` box tagged with its registered type.
pub struct Object {
    ty: TypeId,
    data: Box<dyn Any + Send>,
}

impl Object {
    pub fn new(ty: TypeId, data: Box<dyn Any + Send>) -> Self {
        Object { ty, data }
    }

    /// A placeholder instance carrying no host data (used for the root object
    /// type, whose identity is all that matters).
    pub fn opaque(ty: TypeId) -> Self {
        Object {
            ty,
            data: Box::new(()),
        }
    }

    pub fn ty(&self) -> TypeId {
        self.ty
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.data.downcast_mut::<T>()
    }

    pub fn data_mut(&mut self) -> &mut (dyn Any + Send) {
        self.data.as_mut()
    }

    pub fn into_data(self) -> Box<dyn Any + Send> {
        self.data
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({:?})", self.ty)
    }
}

/// Dynamic value passed between the codec, constructor thunks, and field
/// stores.
///
/// The variants cover the catalog of shapes the construction layer knows how
/// to synthesize: the primitive kinds, text, the date/time family, wide
/// numbers, containers by declared interface, and host objects. Containers
/// hold codec values directly; set semantics (dedup) are owned by the codec
/// layer that hydrates them, so the set variants are insertion-ordered here.
#[derive(Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    /// Wide integer; arbitrary precision beyond `i128` is owned by the codec
    /// layer.
    BigInt(i128),
    /// Decimal digits; precision is owned by the codec layer.
    BigDecimal(String),
    Instant(OffsetDateTime),
    Date(Date),
    DateTime(PrimitiveDateTime),
    ZoneOffset(UtcOffset),
    Url(Url),
    /// A reference to a registered type (the "type-of-types" value).
    Type(TypeId),
    Array(Vec<Value>),
    List(Vec<Value>),
    Set(Vec<Value>),
    SortedSet(Vec<Value>),
    Map(IndexMap<String, Value>),
    SortedMap(BTreeMap<String, Value>),
    Object(Object),
}

impl Value {
    /// Short shape name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Str(_) => "str",
            Value::BigInt(_) => "bigint",
            Value::BigDecimal(_) => "bigdecimal",
            Value::Instant(_) => "instant",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::ZoneOffset(_) => "zone-offset",
            Value::Url(_) => "url",
            Value::Type(_) => "type",
            Value::Array(_) => "array",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::SortedSet(_) => "sorted-set",
            Value::Map(_) => "map",
            Value::SortedMap(_) => "sorted-map",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}
