//! Integration tests for the persistent collections behind list and map values.

use std::sync::Arc;

use beatline_foundation::{SharedList, SharedMap, Value};

// =============================================================================
// SharedList
// =============================================================================

#[test]
fn pushed_keeps_original() {
    let a: SharedList<Value> = SharedList::new().pushed(Value::Int(1));
    let b = a.pushed(Value::Int(2));

    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 2);
    assert_eq!(b.get(1), Some(&Value::Int(2)));
}

#[test]
fn replaced_in_and_out_of_bounds() {
    let v: SharedList<Value> = [Value::Int(1), Value::Int(2)].into_iter().collect();
    let updated = v.replaced(0, Value::from("x")).expect("in bounds");

    assert_eq!(updated.get(0), Some(&Value::from("x")));
    assert_eq!(v.get(0), Some(&Value::Int(1)));
    assert!(v.replaced(2, Value::Nil).is_none());
}

#[test]
fn iteration_keeps_order() {
    let v: SharedList<i64> = (0..5).collect();
    let collected: Vec<i64> = v.iter().copied().collect();
    assert_eq!(collected, vec![0, 1, 2, 3, 4]);
}

// =============================================================================
// SharedMap
// =============================================================================

#[test]
fn inserted_then_without() {
    let m: SharedMap<Value, Value> = SharedMap::new()
        .inserted(Value::from("a"), Value::Int(1))
        .inserted(Value::from("b"), Value::Int(2));
    let trimmed = m.without(&Value::from("a"));

    assert_eq!(m.len(), 2);
    assert_eq!(trimmed.len(), 1);
    assert!(!trimmed.contains_key(&Value::from("a")));
}

#[test]
fn lookup_by_borrowed_key() {
    let m: SharedMap<Arc<str>, i64> = SharedMap::new().inserted("gold".into(), 5);
    assert_eq!(m.get("gold"), Some(&5));
}

#[test]
fn map_values_ignore_insertion_order() {
    let a: SharedMap<Value, Value> = [(Value::Int(1), Value::Nil), (Value::Int(2), Value::Nil)]
        .into_iter()
        .collect();
    let b: SharedMap<Value, Value> = [(Value::Int(2), Value::Nil), (Value::Int(1), Value::Nil)]
        .into_iter()
        .collect();
    assert_eq!(Value::Map(a), Value::Map(b));
}
