//! `& | ^`

use beatline_foundation::{Result, Value};

use super::evaluate_all;
use super::ops::{bit_and, bit_or, bit_xor, reduce};
use crate::engine::Engine;
use crate::instruction::Operand;

pub(super) fn and(engine: &Engine, args: &[Operand]) -> Result<Value> {
    reduce("&", evaluate_all(engine, args)?, bit_and)
}

pub(super) fn or(engine: &Engine, args: &[Operand]) -> Result<Value> {
    reduce("|", evaluate_all(engine, args)?, bit_or)
}

pub(super) fn xor(engine: &Engine, args: &[Operand]) -> Result<Value> {
    reduce("^", evaluate_all(engine, args)?, bit_xor)
}
