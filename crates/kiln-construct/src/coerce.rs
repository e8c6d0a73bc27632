//! Default-value synthesis and string/scalar coercion.
//!
//! `default_for` produces the argument values the constructor resolver feeds
//! into candidate constructors: zero values for primitive parameters always,
//! and either `Null` (null-preferring policy) or a concrete placeholder from
//! the well-known catalog (populate policy) for everything else. `coerce`
//! parses raw codec scalars into a requested primitive kind.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use url::Url;

use kiln_model::{Object, PrimitiveKind, TypeId, TypeKind, TypeStore, Value};

use crate::ConstructError;

/// Synthesize a value for a parameter (or field) of type `ty`.
///
/// Primitive kinds get their designated zero value regardless of policy.
/// With `prefer_null` every non-primitive gets `Value::Null`; otherwise the
/// well-known catalog supplies a concrete, usable placeholder and only
/// unrecognized types fall back to `Null`.
pub fn default_for(store: &TypeStore, ty: TypeId, prefer_null: bool) -> Value {
    if let Some(kind) = store.primitive_kind(ty) {
        return kind.zero();
    }
    if prefer_null {
        return Value::Null;
    }

    let wk = store.well_known();
    if ty == wk.string {
        return Value::Str(String::new());
    }
    if ty == wk.date {
        return Value::Instant(OffsetDateTime::now_utc());
    }
    if store.is_assignable(wk.list, ty) {
        return Value::List(Vec::new());
    }
    if store.is_assignable(wk.sorted_set, ty) {
        return Value::SortedSet(Vec::new());
    }
    if store.is_assignable(wk.set, ty) {
        return Value::Set(Vec::new());
    }
    if store.is_assignable(wk.sorted_map, ty) {
        return Value::SortedMap(BTreeMap::new());
    }
    if store.is_assignable(wk.map, ty) {
        return Value::Map(IndexMap::new());
    }
    if store.is_assignable(wk.collection, ty) {
        return Value::List(Vec::new());
    }
    if store.is_assignable(wk.calendar, ty) {
        return Value::Instant(OffsetDateTime::now_utc());
    }
    if store.is_assignable(wk.time_zone, ty) {
        return Value::ZoneOffset(UtcOffset::UTC);
    }
    if ty == wk.big_integer {
        return Value::BigInt(10);
    }
    if ty == wk.big_decimal {
        return Value::BigDecimal("10".to_string());
    }
    if ty == wk.string_builder || ty == wk.string_buffer {
        return Value::Str(String::new());
    }
    if ty == wk.locale {
        // Arbitrary concrete locale; real data overwrites it after
        // construction.
        return Value::Str("fr-FR".to_string());
    }
    if ty == wk.class_type {
        return Value::Type(wk.string);
    }
    if ty == wk.timestamp {
        return Value::Instant(OffsetDateTime::now_utc());
    }
    if ty == wk.local_date {
        return Value::Date(OffsetDateTime::now_utc().date());
    }
    if ty == wk.local_date_time {
        let now = OffsetDateTime::now_utc();
        return Value::DateTime(PrimitiveDateTime::new(now.date(), now.time()));
    }
    if ty == wk.zoned_date_time {
        return Value::Instant(OffsetDateTime::now_utc());
    }
    if ty == wk.zone_id {
        return Value::ZoneOffset(UtcOffset::UTC);
    }
    if ty == wk.atomic_bool {
        return Value::Bool(true);
    }
    if ty == wk.atomic_int {
        return Value::I32(7);
    }
    if ty == wk.atomic_long {
        return Value::I64(7);
    }
    if ty == wk.url {
        return Url::parse("http://localhost")
            .map(Value::Url)
            .unwrap_or(Value::Null);
    }
    if ty == wk.object {
        return Value::Object(Object::opaque(ty));
    }
    if matches!(store.get(ty).map(|d| d.kind), Some(TypeKind::Array { .. })) {
        return Value::Array(Vec::new());
    }

    Value::Null
}

/// Parse a raw textual or numeric codec value into the requested primitive
/// kind.
///
/// Textual input is stripped of a single layer of surrounding double quotes;
/// an empty string after stripping coerces to the kind's zero value rather
/// than failing, and a lone `"` coerces to the quote character itself for
/// `Char`. Numeric input is narrowed through its numeric value. `Null`
/// coerces to zero.
pub fn coerce(kind: PrimitiveKind, raw: &Value) -> Result<Value, ConstructError> {
    let fail = || ConstructError::CoercionFailed {
        target: kind.name(),
        raw: format!("{raw:?}"),
    };

    match kind {
        PrimitiveKind::Bool => match raw {
            Value::Null => Ok(Value::Bool(false)),
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::Str(s) => {
                let s = strip_quotes(s);
                Ok(Value::Bool(s.eq_ignore_ascii_case("true")))
            }
            _ => Err(fail()),
        },
        PrimitiveKind::Char => match raw {
            Value::Null => Ok(Value::Char('\0')),
            Value::Char(c) => Ok(Value::Char(*c)),
            Value::Str(s) => {
                if s == "\"" {
                    return Ok(Value::Char('"'));
                }
                let s = strip_quotes(s);
                Ok(Value::Char(s.chars().next().unwrap_or('\0')))
            }
            _ => Err(fail()),
        },
        PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64 => {
            match raw {
                Value::Null => Ok(kind.zero()),
                Value::Str(s) => {
                    let s = strip_quotes(s);
                    if s.is_empty() {
                        return Ok(kind.zero());
                    }
                    let wide: i128 = s.parse().map_err(|_| fail())?;
                    narrow_checked(kind, wide).ok_or_else(fail)
                }
                other => {
                    let wide = integer_of(other).ok_or_else(fail)?;
                    Ok(narrow_wrapping(kind, wide))
                }
            }
        }
        PrimitiveKind::F32 | PrimitiveKind::F64 => match raw {
            Value::Null => Ok(kind.zero()),
            Value::Str(s) => {
                let s = strip_quotes(s);
                if s.is_empty() {
                    return Ok(kind.zero());
                }
                let parsed: f64 = s.parse().map_err(|_| fail())?;
                Ok(float_value(kind, parsed))
            }
            other => {
                let parsed = float_of(other).ok_or_else(fail)?;
                Ok(float_value(kind, parsed))
            }
        },
    }
}

/// Strip one layer of leading/trailing double quotes.
fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix('"').unwrap_or(s);
    s.strip_suffix('"').unwrap_or(s)
}

fn integer_of(raw: &Value) -> Option<i128> {
    match raw {
        Value::I8(n) => Some(i128::from(*n)),
        Value::I16(n) => Some(i128::from(*n)),
        Value::I32(n) => Some(i128::from(*n)),
        Value::I64(n) => Some(i128::from(*n)),
        Value::BigInt(n) => Some(*n),
        Value::F32(n) => Some(*n as i128),
        Value::F64(n) => Some(*n as i128),
        _ => None,
    }
}

fn float_of(raw: &Value) -> Option<f64> {
    match raw {
        Value::I8(n) => Some(f64::from(*n)),
        Value::I16(n) => Some(f64::from(*n)),
        Value::I32(n) => Some(f64::from(*n)),
        Value::I64(n) => Some(*n as f64),
        Value::BigInt(n) => Some(*n as f64),
        Value::F32(n) => Some(f64::from(*n)),
        Value::F64(n) => Some(*n),
        _ => None,
    }
}

/// Narrowing for parsed text: out-of-range input is a coercion failure.
fn narrow_checked(kind: PrimitiveKind, wide: i128) -> Option<Value> {
    match kind {
        PrimitiveKind::I8 => i8::try_from(wide).ok().map(Value::I8),
        PrimitiveKind::I16 => i16::try_from(wide).ok().map(Value::I16),
        PrimitiveKind::I32 => i32::try_from(wide).ok().map(Value::I32),
        PrimitiveKind::I64 => i64::try_from(wide).ok().map(Value::I64),
        _ => None,
    }
}

/// Narrowing for numeric input: the input's own numeric value is truncated,
/// matching two's-complement narrowing.
fn narrow_wrapping(kind: PrimitiveKind, wide: i128) -> Value {
    match kind {
        PrimitiveKind::I8 => Value::I8(wide as i8),
        PrimitiveKind::I16 => Value::I16(wide as i16),
        PrimitiveKind::I32 => Value::I32(wide as i32),
        _ => Value::I64(wide as i64),
    }
}

fn float_value(kind: PrimitiveKind, value: f64) -> Value {
    match kind {
        PrimitiveKind::F32 => Value::F32(value as f32),
        _ => Value::F64(value),
    }
}
