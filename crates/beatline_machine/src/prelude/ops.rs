//! Value operations shared by the prelude and the embedded evaluator.

#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]

use std::cmp::Ordering;

use beatline_foundation::{Error, ErrorKind, Result, Type, Value};

/// Folds evaluated arguments left to right with `op`.
///
/// An empty argument list is an arity mismatch.
pub(crate) fn reduce(
    name: &str,
    values: Vec<Value>,
    op: fn(Value, Value) -> Result<Value>,
) -> Result<Value> {
    let mut iter = values.into_iter();
    let Some(first) = iter.next() else {
        return Err(Error::arity_mismatch(format!("at least 1 for {name}"), 0));
    };
    iter.try_fold(first, op)
}

/// Checks an exact argument count.
pub(crate) fn expect_arity(name: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::arity_mismatch(format!("{expected} for {name}"), actual))
    }
}

fn numeric_mismatch(a: &Value, b: &Value) -> Error {
    let actual = if matches!(a, Value::Int(_) | Value::Float(_)) {
        b.value_type()
    } else {
        a.value_type()
    };
    Error::type_mismatch(Type::Number, actual)
}

// =============================================================================
// Math
// =============================================================================

/// Adds two numbers, or concatenates when either side is a string.
pub(crate) fn add_values(a: Value, b: Value) -> Result<Value> {
    match (&a, &b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x.wrapping_add(*y))),
        (Value::Float(x), Value::Float(y)) => Ok(Value::Float(x + y)),
        (Value::Int(x), Value::Float(y)) => Ok(Value::Float(*x as f64 + y)),
        (Value::Float(x), Value::Int(y)) => Ok(Value::Float(x + *y as f64)),
        (Value::String(_), _) | (_, Value::String(_)) => Ok(Value::from(format!("{a}{b}"))),
        _ => Err(numeric_mismatch(&a, &b)),
    }
}

/// Subtracts two numbers.
pub(crate) fn sub_values(a: Value, b: Value) -> Result<Value> {
    match (&a, &b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x.wrapping_sub(*y))),
        (Value::Float(x), Value::Float(y)) => Ok(Value::Float(x - y)),
        (Value::Int(x), Value::Float(y)) => Ok(Value::Float(*x as f64 - y)),
        (Value::Float(x), Value::Int(y)) => Ok(Value::Float(x - *y as f64)),
        _ => Err(numeric_mismatch(&a, &b)),
    }
}

/// Multiplies two numbers.
pub(crate) fn mul_values(a: Value, b: Value) -> Result<Value> {
    match (&a, &b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x.wrapping_mul(*y))),
        (Value::Float(x), Value::Float(y)) => Ok(Value::Float(x * y)),
        (Value::Int(x), Value::Float(y)) => Ok(Value::Float(*x as f64 * y)),
        (Value::Float(x), Value::Int(y)) => Ok(Value::Float(x * *y as f64)),
        _ => Err(numeric_mismatch(&a, &b)),
    }
}

/// Divides two numbers. Integer division truncates.
pub(crate) fn div_values(a: Value, b: Value) -> Result<Value> {
    match (&a, &b) {
        (Value::Int(_) | Value::Float(_), Value::Int(0)) => {
            Err(Error::new(ErrorKind::DivisionByZero))
        }
        (Value::Int(_) | Value::Float(_), Value::Float(y)) if *y == 0.0 => {
            Err(Error::new(ErrorKind::DivisionByZero))
        }
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x.wrapping_div(*y))),
        (Value::Float(x), Value::Float(y)) => Ok(Value::Float(x / y)),
        (Value::Int(x), Value::Float(y)) => Ok(Value::Float(*x as f64 / y)),
        (Value::Float(x), Value::Int(y)) => Ok(Value::Float(x / *y as f64)),
        _ => Err(numeric_mismatch(&a, &b)),
    }
}

/// Remainder of two numbers, with the sign of the dividend.
pub(crate) fn mod_values(a: Value, b: Value) -> Result<Value> {
    match (&a, &b) {
        (Value::Int(_) | Value::Float(_), Value::Int(0)) => {
            Err(Error::new(ErrorKind::DivisionByZero))
        }
        (Value::Int(_) | Value::Float(_), Value::Float(y)) if *y == 0.0 => {
            Err(Error::new(ErrorKind::DivisionByZero))
        }
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x.wrapping_rem(*y))),
        (Value::Float(x), Value::Float(y)) => Ok(Value::Float(x % y)),
        (Value::Int(x), Value::Float(y)) => Ok(Value::Float(*x as f64 % y)),
        (Value::Float(x), Value::Int(y)) => Ok(Value::Float(x % *y as f64)),
        _ => Err(numeric_mismatch(&a, &b)),
    }
}

/// Absolute value of a number.
pub(crate) fn abs_value(v: Value) -> Result<Value> {
    match v {
        Value::Int(n) => Ok(Value::Int(n.wrapping_abs())),
        Value::Float(n) => Ok(Value::Float(n.abs())),
        other => Err(Error::type_mismatch(Type::Number, other.value_type())),
    }
}

// =============================================================================
// Bitwise
// =============================================================================

fn int_pair(a: &Value, b: &Value) -> Result<(i64, i64)> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok((*x, *y)),
        (Value::Int(_), other) | (other, _) => {
            Err(Error::type_mismatch(Type::Int, other.value_type()))
        }
    }
}

/// Bitwise AND of two integers.
pub(crate) fn bit_and(a: Value, b: Value) -> Result<Value> {
    int_pair(&a, &b).map(|(x, y)| Value::Int(x & y))
}

/// Bitwise OR of two integers.
pub(crate) fn bit_or(a: Value, b: Value) -> Result<Value> {
    int_pair(&a, &b).map(|(x, y)| Value::Int(x | y))
}

/// Bitwise XOR of two integers.
pub(crate) fn bit_xor(a: Value, b: Value) -> Result<Value> {
    int_pair(&a, &b).map(|(x, y)| Value::Int(x ^ y))
}

// =============================================================================
// Comparison
// =============================================================================

/// Equality with numeric promotion: `1 == 1.0`.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
        (Value::Float(x), Value::Float(y)) => x == y,
        _ => a == b,
    }
}

/// Orders two numbers or two strings.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Result<Ordering> {
    match (a, b) {
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_))
        | (Value::String(_), Value::String(_)) => a.partial_cmp(b).ok_or_else(|| {
            Error::host(format!("cannot order {a:?} and {b:?}"))
        }),
        (Value::String(_), other) => Err(Error::type_mismatch(Type::String, other.value_type())),
        _ => Err(numeric_mismatch(a, b)),
    }
}

// =============================================================================
// Property Access
// =============================================================================

/// Looks up one key in a container.
///
/// Missing keys and out-of-range indices yield `Nil`.
pub(crate) fn property(base: &Value, key: &Value) -> Result<Value> {
    match base {
        Value::Map(map) => Ok(map.get(key).cloned().unwrap_or_default()),
        Value::List(list) => match key {
            Value::Int(index) => Ok(usize::try_from(*index)
                .ok()
                .and_then(|i| list.get(i))
                .cloned()
                .unwrap_or_default()),
            other => Err(Error::type_mismatch(Type::Int, other.value_type())),
        },
        Value::String(s) => match key {
            Value::Int(index) => Ok(usize::try_from(*index)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Nil, |c| Value::from(c.to_string()))),
            other => Err(Error::type_mismatch(Type::Int, other.value_type())),
        },
        other => Err(Error::type_mismatch(Type::Map, other.value_type())),
    }
}
