//! Built-in extern functions.
//!
//! The prelude is split into four groups that can be installed together with
//! [`install`] or individually with [`install_group`]:
//!
//! | Group | Functions |
//! |---|---|
//! | [`MATH`] | `+ - * / % ABS` |
//! | [`BITWISE`] | `& \| ^` |
//! | [`CONDITION`] | `< > <= >= == != and or not` |
//! | [`PRIMITIVE`] | `#VAR $VAR .` |
//!
//! Every function receives unevaluated operands and evaluates them through
//! the engine, so `and`/`or` only evaluate what they need.

mod bitwise;
mod condition;
mod math;
pub(crate) mod ops;
mod primitive;

use beatline_foundation::{Result, Value};

use crate::engine::Engine;
use crate::instruction::Operand;
use crate::registry::NativeExtern;

/// Variadic arithmetic and `ABS`.
pub const MATH: &[NativeExtern] = &[
    NativeExtern::new("+", math::add),
    NativeExtern::new("-", math::sub),
    NativeExtern::new("*", math::mul),
    NativeExtern::new("/", math::div),
    NativeExtern::new("%", math::rem),
    NativeExtern::new("ABS", math::abs),
];

/// Variadic integer bit operations.
pub const BITWISE: &[NativeExtern] = &[
    NativeExtern::new("&", bitwise::and),
    NativeExtern::new("|", bitwise::or),
    NativeExtern::new("^", bitwise::xor),
];

/// Comparisons and short-circuit logic.
pub const CONDITION: &[NativeExtern] = &[
    NativeExtern::new("<", condition::lt),
    NativeExtern::new(">", condition::gt),
    NativeExtern::new("<=", condition::le),
    NativeExtern::new(">=", condition::ge),
    NativeExtern::new("==", condition::eq),
    NativeExtern::new("!=", condition::ne),
    NativeExtern::new("and", condition::and),
    NativeExtern::new("or", condition::or),
    NativeExtern::new("not", condition::not),
];

/// Variable reads and property access.
pub const PRIMITIVE: &[NativeExtern] = &[
    NativeExtern::new("#VAR", primitive::static_var),
    NativeExtern::new("$VAR", primitive::reactive_var),
    NativeExtern::new(".", primitive::get),
];

/// Registers every prelude group on the engine.
pub fn install(engine: &mut Engine) {
    for group in [MATH, BITWISE, CONDITION, PRIMITIVE] {
        install_group(engine, group);
    }
}

/// Registers one group of functions on the engine.
pub fn install_group(engine: &mut Engine, group: &[NativeExtern]) {
    for function in group {
        engine.register_extern_function(*function);
    }
}

/// Evaluates every operand in order.
///
/// # Errors
///
/// Returns the first evaluation error.
pub fn evaluate_all(engine: &Engine, args: &[Operand]) -> Result<Vec<Value>> {
    args.iter().map(|arg| engine.evaluate(arg)).collect()
}

/// Evaluates exactly `N` operands, for fixed-arity extern functions.
///
/// # Errors
///
/// Returns `ArityMismatch` naming `name` when `args` has the wrong length,
/// or the first evaluation error.
pub fn evaluate_exact<const N: usize>(
    name: &str,
    engine: &Engine,
    args: &[Operand],
) -> Result<[Value; N]> {
    ops::expect_arity(name, N, args.len())?;
    let mut values: [Value; N] = std::array::from_fn(|_| Value::Nil);
    for (slot, arg) in values.iter_mut().zip(args) {
        *slot = engine.evaluate(arg)?;
    }
    Ok(values)
}
