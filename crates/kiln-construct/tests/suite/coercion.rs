use pretty_assertions::assert_eq;

use kiln_construct::{coerce, default_for, ConstructError};
use kiln_model::{PrimitiveKind, TypeDescriptor, TypeStore, Value};

#[test]
fn integers_parse_quoted_and_bare_text() {
    let v = coerce(PrimitiveKind::I32, &Value::Str("\"45\"".to_string())).unwrap();
    assert!(matches!(v, Value::I32(45)));
    let v = coerce(PrimitiveKind::I64, &Value::Str("-7".to_string())).unwrap();
    assert!(matches!(v, Value::I64(-7)));
}

#[test]
fn empty_text_and_null_coerce_to_zero() {
    assert!(matches!(
        coerce(PrimitiveKind::I16, &Value::Str(String::new())).unwrap(),
        Value::I16(0)
    ));
    assert!(matches!(
        coerce(PrimitiveKind::I16, &Value::Str("\"\"".to_string())).unwrap(),
        Value::I16(0)
    ));
    assert!(matches!(
        coerce(PrimitiveKind::I64, &Value::Null).unwrap(),
        Value::I64(0)
    ));
    assert!(matches!(
        coerce(PrimitiveKind::F64, &Value::Null).unwrap(),
        Value::F64(f) if f == 0.0
    ));
    assert!(matches!(
        coerce(PrimitiveKind::Bool, &Value::Null).unwrap(),
        Value::Bool(false)
    ));
    assert!(matches!(
        coerce(PrimitiveKind::Char, &Value::Null).unwrap(),
        Value::Char('\0')
    ));
}

#[test]
fn textual_overflow_fails_while_numeric_input_narrows() {
    let err = coerce(PrimitiveKind::I8, &Value::Str("300".to_string())).unwrap_err();
    match err {
        ConstructError::CoercionFailed { target, .. } => assert_eq!(target, "i8"),
        other => panic!("expected CoercionFailed, got {other}"),
    }
    // Numeric input narrows through its numeric value instead of failing.
    assert!(matches!(
        coerce(PrimitiveKind::I8, &Value::I32(300)).unwrap(),
        Value::I8(44)
    ));
    assert!(matches!(
        coerce(PrimitiveKind::I32, &Value::F64(3.9)).unwrap(),
        Value::I32(3)
    ));
}

#[test]
fn bool_text_is_case_insensitive() {
    for raw in ["true", "TRUE", "\"True\""] {
        assert!(matches!(
            coerce(PrimitiveKind::Bool, &Value::Str(raw.to_string())).unwrap(),
            Value::Bool(true)
        ));
    }
    assert!(matches!(
        coerce(PrimitiveKind::Bool, &Value::Str("yes".to_string())).unwrap(),
        Value::Bool(false)
    ));
}

#[test]
fn char_handles_the_quote_edge_cases() {
    assert!(matches!(
        coerce(PrimitiveKind::Char, &Value::Str("\"".to_string())).unwrap(),
        Value::Char('"')
    ));
    assert!(matches!(
        coerce(PrimitiveKind::Char, &Value::Str("\"x\"".to_string())).unwrap(),
        Value::Char('x')
    ));
    assert!(matches!(
        coerce(PrimitiveKind::Char, &Value::Str(String::new())).unwrap(),
        Value::Char('\0')
    ));
}

#[test]
fn floats_parse_text_and_widen_integers() {
    assert!(matches!(
        coerce(PrimitiveKind::F32, &Value::Str("2.5".to_string())).unwrap(),
        Value::F32(f) if f == 2.5
    ));
    assert!(matches!(
        coerce(PrimitiveKind::F64, &Value::I64(3)).unwrap(),
        Value::F64(f) if f == 3.0
    ));
    assert!(coerce(PrimitiveKind::F64, &Value::Str("abc".to_string())).is_err());
}

#[test]
fn non_scalar_input_is_a_coercion_failure() {
    let err = coerce(PrimitiveKind::I32, &Value::List(Vec::new())).unwrap_err();
    assert!(matches!(err, ConstructError::CoercionFailed { .. }));
}

#[test]
fn primitives_default_to_zero_under_both_policies() {
    let store = TypeStore::new();
    let int = store.primitive(PrimitiveKind::I32);
    assert!(matches!(default_for(&store, int, true), Value::I32(0)));
    assert!(matches!(default_for(&store, int, false), Value::I32(0)));
    let b = store.primitive(PrimitiveKind::Bool);
    assert!(matches!(default_for(&store, b, true), Value::Bool(false)));
}

#[test]
fn null_preferring_policy_nulls_every_non_primitive() {
    let store = TypeStore::new();
    let wk = store.well_known();
    for ty in [wk.string, wk.date, wk.big_integer, wk.list, wk.locale] {
        assert!(default_for(&store, ty, true).is_null());
    }
}

#[test]
fn populate_policy_draws_from_the_placeholder_catalog() {
    let mut store = TypeStore::new();
    let wk = *store.well_known();

    assert!(matches!(default_for(&store, wk.string, false), Value::Str(s) if s.is_empty()));
    assert!(matches!(default_for(&store, wk.date, false), Value::Instant(_)));
    assert!(matches!(default_for(&store, wk.list, false), Value::List(v) if v.is_empty()));
    assert!(matches!(default_for(&store, wk.sorted_set, false), Value::SortedSet(_)));
    assert!(matches!(default_for(&store, wk.map, false), Value::Map(m) if m.is_empty()));
    assert!(matches!(default_for(&store, wk.sorted_map, false), Value::SortedMap(_)));
    assert!(matches!(default_for(&store, wk.big_integer, false), Value::BigInt(10)));
    assert!(matches!(default_for(&store, wk.big_decimal, false), Value::BigDecimal(s) if s == "10"));
    assert!(matches!(default_for(&store, wk.locale, false), Value::Str(s) if s == "fr-FR"));
    assert!(matches!(default_for(&store, wk.class_type, false), Value::Type(t) if t == wk.string));
    assert!(matches!(default_for(&store, wk.local_date, false), Value::Date(_)));
    assert!(matches!(default_for(&store, wk.local_date_time, false), Value::DateTime(_)));
    assert!(matches!(default_for(&store, wk.zone_id, false), Value::ZoneOffset(_)));
    assert!(matches!(default_for(&store, wk.atomic_bool, false), Value::Bool(true)));
    assert!(matches!(default_for(&store, wk.atomic_int, false), Value::I32(7)));
    assert!(matches!(default_for(&store, wk.atomic_long, false), Value::I64(7)));
    assert!(matches!(default_for(&store, wk.url, false), Value::Url(_)));

    // Array parameters get an empty array.
    let arr = store.array_of(wk.string);
    assert!(matches!(default_for(&store, arr, false), Value::Array(v) if v.is_empty()));

    // Unrecognized host types still fall back to null.
    let plain = store.register(TypeDescriptor::class("app.Plain").extends(wk.object));
    assert!(default_for(&store, plain, false).is_null());
}
