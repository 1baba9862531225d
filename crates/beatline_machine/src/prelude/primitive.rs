//! Variable reads and property access.

use std::sync::Arc;

use beatline_foundation::{Error, Result, Type, Value};

use super::evaluate_exact;
use super::ops::property;
use crate::engine::Engine;
use crate::instruction::Operand;

fn variable_name(name: &str, engine: &Engine, args: &[Operand]) -> Result<Arc<str>> {
    let [value] = evaluate_exact::<1>(name, engine, args)?;
    match value {
        Value::String(s) => Ok(s),
        other => Err(Error::type_mismatch(Type::String, other.value_type())),
    }
}

/// `#VAR(name)`: the static value, or `Nil`.
pub(super) fn static_var(engine: &Engine, args: &[Operand]) -> Result<Value> {
    let name = variable_name("#VAR", engine, args)?;
    Ok(engine.static_value(&name))
}

/// `$VAR(name)`: the current reactive value, or `Nil`.
pub(super) fn reactive_var(engine: &Engine, args: &[Operand]) -> Result<Value> {
    let name = variable_name("$VAR", engine, args)?;
    Ok(engine
        .reactive_variable(&name)
        .map(|variable| variable.value())
        .unwrap_or_default())
}

/// `.(base, keys...)`: chained property access.
pub(super) fn get(engine: &Engine, args: &[Operand]) -> Result<Value> {
    let Some((base, keys)) = args.split_first() else {
        return Err(Error::arity_mismatch("at least 1 for .", 0));
    };
    let mut current = engine.evaluate(base)?;
    for key in keys {
        let key = engine.evaluate(key)?;
        current = property(&current, &key)?;
    }
    Ok(current)
}
