//! Comparisons and logic.
//!
//! `and` and `or` evaluate left to right and return the value that decided
//! the result, not a coerced boolean.

use std::cmp::Ordering;

use beatline_foundation::{Error, Result, Value};

use super::evaluate_exact;
use super::ops::{compare_values, values_equal};
use crate::engine::Engine;
use crate::instruction::Operand;

fn compare(
    name: &str,
    engine: &Engine,
    args: &[Operand],
    accept: fn(Ordering) -> bool,
) -> Result<Value> {
    let [a, b] = evaluate_exact::<2>(name, engine, args)?;
    compare_values(&a, &b).map(|ordering| Value::Bool(accept(ordering)))
}

pub(super) fn lt(engine: &Engine, args: &[Operand]) -> Result<Value> {
    compare("<", engine, args, Ordering::is_lt)
}

pub(super) fn gt(engine: &Engine, args: &[Operand]) -> Result<Value> {
    compare(">", engine, args, Ordering::is_gt)
}

pub(super) fn le(engine: &Engine, args: &[Operand]) -> Result<Value> {
    compare("<=", engine, args, Ordering::is_le)
}

pub(super) fn ge(engine: &Engine, args: &[Operand]) -> Result<Value> {
    compare(">=", engine, args, Ordering::is_ge)
}

pub(super) fn eq(engine: &Engine, args: &[Operand]) -> Result<Value> {
    let [a, b] = evaluate_exact::<2>("==", engine, args)?;
    Ok(Value::Bool(values_equal(&a, &b)))
}

pub(super) fn ne(engine: &Engine, args: &[Operand]) -> Result<Value> {
    let [a, b] = evaluate_exact::<2>("!=", engine, args)?;
    Ok(Value::Bool(!values_equal(&a, &b)))
}

pub(super) fn and(engine: &Engine, args: &[Operand]) -> Result<Value> {
    short_circuit("and", engine, args, false)
}

pub(super) fn or(engine: &Engine, args: &[Operand]) -> Result<Value> {
    short_circuit("or", engine, args, true)
}

// Stops at the first argument whose truthiness equals `stop_on`.
fn short_circuit(name: &str, engine: &Engine, args: &[Operand], stop_on: bool) -> Result<Value> {
    if args.is_empty() {
        return Err(Error::arity_mismatch(format!("at least 1 for {name}"), 0));
    }
    let mut last = Value::Nil;
    for arg in args {
        last = engine.evaluate(arg)?;
        if last.is_truthy() == stop_on {
            break;
        }
    }
    Ok(last)
}

pub(super) fn not(engine: &Engine, args: &[Operand]) -> Result<Value> {
    let [value] = evaluate_exact::<1>("not", engine, args)?;
    Ok(Value::Bool(!value.is_truthy()))
}
