//! Integration tests for instruction dispatch
//!
//! Each opcode's effect on position, stacks, and variables.

use beatline_foundation::{ErrorKind, Value};
use beatline_machine::{ComponentArgs, Instruction, Operand, ProgramBuilder, StepOutcome};

use crate::common::{engine, with_speech};

// =============================================================================
// Straight-line Programs
// =============================================================================

#[test]
fn set_static_then_read() {
    let mut engine = engine();
    engine.load_program(ProgramBuilder::new().set_static("x", Value::Int(5)).build());

    assert_eq!(engine.run().unwrap(), StepOutcome::Halted);
    assert_eq!(engine.static_value("x"), Value::Int(5));
}

#[test]
fn goto_skips_instructions() {
    let mut engine = engine();
    let said = with_speech(&mut engine);
    engine.register_component(beatline_machine::FnComponent::new("done", |_, _| {
        Ok(beatline_machine::Pacing::Continue)
    }));
    engine.load_program(
        ProgramBuilder::new()
            .set_static("x", Value::Int(1))
            .goto(3)
            .set_static("x", Value::Int(2))
            .call_component("done", ComponentArgs::new())
            .build(),
    );

    engine.run().unwrap();
    assert_eq!(engine.static_value("x"), Value::Int(1));
    assert!(said.borrow().is_empty());
}

#[test]
fn empty_program_halts_immediately() {
    let mut engine = engine();
    assert!(engine.is_halted());
    assert_eq!(engine.step().unwrap(), StepOutcome::Halted);
}

#[test]
fn goto_past_the_end_halts() {
    let mut engine = engine();
    engine.load_program(ProgramBuilder::new().goto(100).build());
    assert_eq!(engine.run().unwrap(), StepOutcome::Halted);
    assert_eq!(engine.current_position(), 100);
}

// =============================================================================
// Conditional Jumps
// =============================================================================

#[test]
fn cond_goto_uses_the_value_as_target() {
    let mut engine = engine();
    engine.load_program(vec![
        Instruction::CondGoto {
            // Carried for tooling only.
            target: 1,
            condition: Operand::expr("+", vec![Operand::lit(1i64), Operand::lit(2i64)]),
            eval: false,
        },
        Instruction::SetStaticVar {
            name: "skipped".into(),
            value: Operand::lit(true),
            eval: false,
        },
        Instruction::Return,
        Instruction::SetStaticVar {
            name: "landed".into(),
            value: Operand::lit(true),
            eval: false,
        },
    ]);

    engine.run().unwrap();
    assert_eq!(engine.static_value("landed"), Value::Bool(true));
    assert_eq!(engine.static_value("skipped"), Value::Nil);
}

#[test]
fn cond_goto_rejects_non_positions() {
    for bad in [
        Value::Int(-1),
        Value::Bool(true),
        Value::Nil,
        Value::Float(1.0),
        Value::from("3"),
    ] {
        let mut engine = engine();
        engine.load_program(ProgramBuilder::new().cond_goto(bad.clone()).build());

        let err = engine.step().unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::InvalidJumpTarget(_)),
            "{bad:?} gave {err}"
        );
        assert_eq!(engine.current_position(), 0);
    }
}

#[test]
fn cond_goto_with_embedded_branch() {
    let mut engine = engine();
    engine.set_static_value("gold", 10i64);
    engine.load_program(
        ProgramBuilder::new()
            .cond_goto_eval("(or (and (>= $$gold 5) 3) 2)")
            .goto(99)
            .set_static("rich", Value::Bool(false))
            .set_static("rich", Value::Bool(true))
            .build(),
    );

    engine.run().unwrap();
    assert_eq!(engine.static_value("rich"), Value::Bool(true));
}

// =============================================================================
// Call / Return
// =============================================================================

#[test]
fn call_returns_to_the_following_instruction() {
    let mut engine = engine();
    let said = with_speech(&mut engine);
    engine.load_program(
        ProgramBuilder::new()
            .call(3)
            .say("log", "after")
            .goto(5)
            .say("log", "inside")
            .ret()
            .build(),
    );

    engine.run().unwrap();
    assert_eq!(*said.borrow(), vec!["inside", "after"]);
    assert_eq!(engine.call_depth(), 0);
}

#[test]
fn nested_calls_unwind_in_order() {
    let mut engine = engine();
    let said = with_speech(&mut engine);
    engine.load_program(
        ProgramBuilder::new()
            // 0
            .call(3)
            // 1
            .say("log", "main")
            // 2
            .goto(9)
            // 3
            .say("log", "outer")
            // 4
            .call(7)
            // 5
            .say("log", "outer again")
            // 6
            .ret()
            // 7
            .say("log", "inner")
            // 8
            .ret()
            .build(),
    );

    engine.run().unwrap();
    assert_eq!(
        *said.borrow(),
        vec!["outer", "inner", "outer again", "main"]
    );
}

#[test]
fn return_without_call_is_fatal() {
    let mut engine = engine();
    engine.load_program(ProgramBuilder::new().set_static("x", 1i64).ret().build());

    let err = engine.run().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ReturnWithoutCall));
    assert_eq!(engine.current_position(), 1);
    assert_eq!(engine.static_value("x"), Value::Int(1));
}

// =============================================================================
// Components
// =============================================================================

#[test]
fn pause_ends_the_burst_after_advancing() {
    let mut engine = engine();
    let said = with_speech(&mut engine);
    engine.load_program(
        ProgramBuilder::new()
            .say("say", "one")
            .say("say", "two")
            .build(),
    );

    assert_eq!(engine.step().unwrap(), StepOutcome::Paused);
    assert_eq!(engine.current_position(), 1);
    assert_eq!(engine.step().unwrap(), StepOutcome::Paused);
    assert_eq!(engine.step().unwrap(), StepOutcome::Halted);
    assert_eq!(*said.borrow(), vec!["one", "two"]);
}

#[test]
fn unknown_component_is_fatal_and_keeps_position() {
    let mut engine = engine();
    engine.load_program(
        ProgramBuilder::new()
            .set_static("x", 1i64)
            .say("nobody", "hello")
            .build(),
    );

    let err = engine.step().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownComponent(ref n) if n == "nobody"));
    assert_eq!(engine.current_position(), 1);

    let context = err.context.expect("context");
    assert_eq!(context.instruction.as_deref(), Some("CALL_COMPONENT"));
    assert_eq!(context.position, Some(1));
}

#[test]
fn later_registration_wins() {
    let mut engine = engine();
    let said = with_speech(&mut engine);
    engine.register_component(beatline_machine::FnComponent::new("say", |engine, _| {
        engine.set_static_value("replaced", true);
        Ok(beatline_machine::Pacing::Continue)
    }));
    engine.load_program(ProgramBuilder::new().say("say", "ignored").build());

    engine.run().unwrap();
    assert!(said.borrow().is_empty());
    assert_eq!(engine.static_value("replaced"), Value::Bool(true));
    assert_eq!(
        engine.components().iter().filter(|n| &***n == "say").count(),
        1
    );
}

#[test]
fn single_step_executes_one_instruction() {
    let mut engine = engine();
    engine.load_program(
        ProgramBuilder::new()
            .set_static("a", 1i64)
            .set_static("b", 2i64)
            .build(),
    );

    assert_eq!(engine.step_single().unwrap(), StepOutcome::Stepped);
    assert_eq!(engine.static_value("a"), Value::Int(1));
    assert_eq!(engine.static_value("b"), Value::Nil);
    assert_eq!(engine.current_position(), 1);
}
