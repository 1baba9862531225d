//! `+ - * / % ABS`

use beatline_foundation::{Result, Value};

use super::ops::{abs_value, add_values, div_values, mod_values, mul_values, reduce, sub_values};
use super::{evaluate_all, evaluate_exact};
use crate::engine::Engine;
use crate::instruction::Operand;

pub(super) fn add(engine: &Engine, args: &[Operand]) -> Result<Value> {
    reduce("+", evaluate_all(engine, args)?, add_values)
}

pub(super) fn sub(engine: &Engine, args: &[Operand]) -> Result<Value> {
    reduce("-", evaluate_all(engine, args)?, sub_values)
}

pub(super) fn mul(engine: &Engine, args: &[Operand]) -> Result<Value> {
    reduce("*", evaluate_all(engine, args)?, mul_values)
}

pub(super) fn div(engine: &Engine, args: &[Operand]) -> Result<Value> {
    reduce("/", evaluate_all(engine, args)?, div_values)
}

pub(super) fn rem(engine: &Engine, args: &[Operand]) -> Result<Value> {
    reduce("%", evaluate_all(engine, args)?, mod_values)
}

pub(super) fn abs(engine: &Engine, args: &[Operand]) -> Result<Value> {
    let [value] = evaluate_exact::<1>("ABS", engine, args)?;
    abs_value(value)
}
