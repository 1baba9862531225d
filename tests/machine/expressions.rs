//! Integration tests for operand evaluation
//!
//! The structured path through the prelude, custom extern functions, and the
//! embedded script path.

use beatline_foundation::{ErrorKind, Result, Value};
use beatline_machine::{
    Engine, ExternFunction, NativeExtern, Operand, ProgramBuilder, ScriptEvaluator, prelude,
};

use crate::common::engine;

fn lit(v: impl Into<Value>) -> Operand {
    Operand::lit(v)
}

// =============================================================================
// Structured Path
// =============================================================================

#[test]
fn addition_reduces_left_to_right() {
    let engine = engine();
    let sum = Operand::expr("+", vec![lit(2i64), lit(3i64), lit(4i64)]);
    assert_eq!(engine.evaluate(&sum).unwrap(), Value::Int(9));
}

#[test]
fn property_chain() {
    let engine = engine();
    let obj = Value::map([("a", Value::map([("b", Value::Int(7))]))]);
    let get = Operand::expr(".", vec![lit(obj), lit("a"), lit("b")]);
    assert_eq!(engine.evaluate(&get).unwrap(), Value::Int(7));
}

#[test]
fn property_misses_are_nil() {
    let engine = engine();
    let map = Value::map([("a", Value::Int(1))]);
    let list = Value::list([Value::Int(1)]);

    let missing_key = Operand::expr(".", vec![lit(map), lit("nope")]);
    let out_of_range = Operand::expr(".", vec![lit(list.clone()), lit(5i64)]);
    let negative = Operand::expr(".", vec![lit(list), lit(-1i64)]);

    assert_eq!(engine.evaluate(&missing_key).unwrap(), Value::Nil);
    assert_eq!(engine.evaluate(&out_of_range).unwrap(), Value::Nil);
    assert_eq!(engine.evaluate(&negative).unwrap(), Value::Nil);
}

#[test]
fn property_on_scalar_is_a_type_error() {
    let engine = engine();
    let get = Operand::expr(".", vec![lit(3i64), lit("a")]);
    let err = engine.evaluate(&get).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn missing_static_reads_nil() {
    let engine = engine();
    let read = Operand::expr("#VAR", vec![lit("missing")]);
    assert_eq!(engine.evaluate(&read).unwrap(), Value::Nil);
}

#[test]
fn short_circuit_skips_unknown_operators() {
    let engine = engine();
    let boom = Operand::expr("explode", Vec::new());
    let and = Operand::expr("and", vec![lit(false), boom.clone()]);
    let or = Operand::expr("or", vec![lit(1i64), boom.clone()]);

    assert_eq!(engine.evaluate(&and).unwrap(), Value::Bool(false));
    assert_eq!(engine.evaluate(&or).unwrap(), Value::Int(1));

    let err = engine.evaluate(&boom).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownExternFunction(ref n) if n == "explode"));
}

#[test]
fn empty_variadic_is_an_arity_error() {
    let engine = engine();
    for op in ["+", "*", "&", "and"] {
        let err = engine.evaluate(&Operand::expr(op, Vec::new())).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ArityMismatch { .. }), "{op}");
    }
}

#[test]
fn division_by_zero_aborts_the_instruction() {
    let mut engine = engine();
    engine.load_program(
        ProgramBuilder::new()
            .set_static("x", Operand::expr("/", vec![lit(1i64), lit(0i64)]))
            .build(),
    );
    let err = engine.step().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DivisionByZero));
    assert_eq!(engine.current_position(), 0);

    let context = err.context.expect("context");
    assert_eq!(context.instruction.as_deref(), Some("SET_STATIC_VAR"));
    assert!(context.operand.is_some());
}

#[test]
fn groups_install_independently() {
    let mut engine = Engine::new();
    prelude::install_group(&mut engine, prelude::MATH);

    assert!(engine.extern_functions().iter().any(|n| &**n == "+"));
    assert!(!engine.extern_functions().iter().any(|n| &**n == "=="));
}

// =============================================================================
// Custom Extern Functions
// =============================================================================

struct Greeting;

impl ExternFunction for Greeting {
    fn name(&self) -> &str {
        "greet"
    }

    fn call(&self, engine: &Engine, args: &[Operand]) -> Result<Value> {
        let who = match args.first() {
            Some(arg) => engine.evaluate(arg)?,
            None => Value::from("stranger"),
        };
        Ok(Value::from(format!("hello, {who}")))
    }
}

fn shout(engine: &Engine, args: &[Operand]) -> Result<Value> {
    let [value] = prelude::evaluate_exact::<1>("shout", engine, args)?;
    Ok(Value::from(value.to_string().to_uppercase()))
}

#[test]
fn host_extern_functions_compose_with_the_prelude() {
    let mut engine = engine();
    engine.register_extern_function(Greeting);
    engine.register_extern_function(NativeExtern::new("shout", shout));

    let nested = Operand::expr(
        "shout",
        vec![Operand::expr("greet", vec![Operand::expr("#VAR", vec![lit("name")])])],
    );
    engine.set_static_value("name", "ada");
    assert_eq!(engine.evaluate(&nested).unwrap(), Value::from("HELLO, ADA"));
}

// =============================================================================
// Embedded Path
// =============================================================================

#[test]
fn embedded_reads_both_namespaces() {
    let mut engine = engine();
    engine.set_static_value("gold", 4i64);
    engine.declare_reactive("bonus", 3i64);
    engine.load_program(
        ProgramBuilder::new()
            .set_static_eval("total", "(* (+ $$gold $bonus) 2)")
            .build(),
    );

    engine.run().unwrap();
    assert_eq!(engine.static_value("total"), Value::Int(14));
}

#[test]
fn embedded_is_off_without_an_evaluator() {
    let mut engine = Engine::new();
    engine.load_program(ProgramBuilder::new().set_static_eval("x", "1").build());

    let err = engine.step().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::EmbeddedUnavailable));
}

#[test]
fn embedded_parse_errors_carry_a_column() {
    let mut engine = Engine::new();
    engine.install_embedded_evaluator(ScriptEvaluator::new());
    engine.load_program(ProgramBuilder::new().set_static_eval("x", "(+ 1 2").build());

    let err = engine.step().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ParseError { .. }));
}

#[test]
fn embedded_cannot_call_host_functions() {
    let mut engine = engine();
    engine.register_extern_function(Greeting);
    engine.load_program(ProgramBuilder::new().set_static_eval("x", "(greet 1)").build());

    let err = engine.step().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ParseError { .. }));
}

#[test]
fn embedded_operand_must_be_a_string() {
    let mut engine = engine();
    engine.load_program(vec![beatline_machine::Instruction::SetStaticVar {
        name: "x".into(),
        value: lit(5i64),
        eval: true,
    }]);

    let err = engine.step().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}
