//! Integration tests for Value types
//!
//! Tests Value variants, truthiness, equality, hashing, display, and ordering.

use beatline_foundation::{SharedMap, Opaque, Type, Value};
use std::collections::HashSet;
use std::sync::Arc;

// =============================================================================
// Value Construction
// =============================================================================

#[test]
fn value_nil() {
    let v = Value::Nil;
    assert!(v.is_nil());
    assert!(!v.is_truthy());
    assert_eq!(Value::default(), Value::Nil);
}

#[test]
fn value_bool() {
    assert!(Value::Bool(true).is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert_eq!(Value::Bool(false).as_bool(), Some(false));
}

#[test]
fn value_int() {
    let v = Value::Int(42);
    assert!(v.is_truthy());
    assert_eq!(v.as_int(), Some(42));
    assert_eq!(v.as_float(), None);
    assert_eq!(v.as_number(), Some(42.0));
}

#[test]
fn value_float() {
    let v = Value::Float(1.5);
    assert_eq!(v.as_float(), Some(1.5));
    assert_eq!(v.as_int(), None);
}

#[test]
fn value_string() {
    let v = Value::String(Arc::from("hello"));
    assert_eq!(v.as_str(), Some("hello"));
    assert_eq!(v, Value::from("hello"));
}

// =============================================================================
// Truthiness
// =============================================================================

#[test]
fn only_nil_and_false_are_falsy() {
    let truthy = [
        Value::Int(0),
        Value::Float(0.0),
        Value::from(""),
        Value::list([]),
        Value::map::<&str, _>([]),
        Value::Bool(true),
    ];
    for v in truthy {
        assert!(v.is_truthy(), "{v:?} should be truthy");
    }
    assert!(!Value::Nil.is_truthy());
    assert!(!Value::Bool(false).is_truthy());
}

// =============================================================================
// Equality & Hashing
// =============================================================================

#[test]
fn int_and_float_are_distinct_values() {
    // Structural equality; numeric-aware `==` lives in the prelude.
    assert_ne!(Value::Int(1), Value::Float(1.0));
}

#[test]
fn nan_equals_itself_structurally() {
    assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
}

#[test]
fn values_work_as_set_members() {
    let mut set = HashSet::new();
    set.insert(Value::from("a"));
    set.insert(Value::from("a"));
    set.insert(Value::Int(1));
    set.insert(Value::list([Value::Int(1), Value::Int(2)]));
    set.insert(Value::list([Value::Int(1), Value::Int(2)]));
    assert_eq!(set.len(), 3);
}

#[test]
fn opaque_compares_by_identity() {
    let a = Opaque::new(String::from("lamp"));
    let b = Opaque::new(String::from("lamp"));
    assert_eq!(Value::Opaque(a.clone()), Value::Opaque(a.clone()));
    assert_ne!(Value::Opaque(a.clone()), Value::Opaque(b));
    assert_eq!(a.downcast_ref::<String>().map(String::as_str), Some("lamp"));
    assert!(a.downcast_ref::<i64>().is_none());
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn mixed_numeric_ordering() {
    assert!(Value::Int(1) < Value::Float(1.5));
    assert!(Value::Float(2.5) > Value::Int(2));
}

#[test]
fn strings_order_lexically() {
    assert!(Value::from("apple") < Value::from("banana"));
}

#[test]
fn unrelated_types_are_unordered() {
    assert_eq!(Value::Int(1).partial_cmp(&Value::from("1")), None);
    assert_eq!(Value::Nil.partial_cmp(&Value::Bool(false)), None);
}

// =============================================================================
// Types & Display
// =============================================================================

#[test]
fn value_types() {
    assert_eq!(Value::Nil.value_type(), Type::Nil);
    assert_eq!(Value::Float(0.5).value_type(), Type::Float);
    assert_eq!(Value::list([]).value_type(), Type::List);
    assert_eq!(Value::Opaque(Opaque::new(1u8)).value_type(), Type::Opaque);
}

#[test]
fn display_is_plain_text() {
    assert_eq!(Value::Nil.to_string(), "nil");
    assert_eq!(Value::from("hi").to_string(), "hi");
    assert_eq!(
        Value::list([Value::Int(1), Value::from("x")]).to_string(),
        "[1, x]"
    );
}

#[test]
fn debug_quotes_strings() {
    assert_eq!(format!("{:?}", Value::from("hi")), "\"hi\"");
    assert_eq!(format!("{:?}", Value::Float(1.0)), "1.0");
}

#[test]
fn conversions() {
    assert_eq!(Value::from(3i32), Value::Int(3));
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(None::<i64>), Value::Nil);
    assert_eq!(
        Value::from(vec![1i64, 2]),
        Value::list([Value::Int(1), Value::Int(2)])
    );
}

#[test]
fn nested_map_lookup() {
    let inner = Value::map([("hp", Value::Int(10))]);
    let outer = Value::map([("player", inner.clone())]);
    let player = outer
        .as_map()
        .and_then(|m: &SharedMap<Value, Value>| m.get(&Value::from("player")));
    assert_eq!(player, Some(&inner));
}
