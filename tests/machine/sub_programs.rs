//! Integration tests for sub-program switching
//!
//! Components that load sub-programs, continuation unwinding, and rollback.

use beatline_foundation::{Error, ErrorKind, Value};
use beatline_machine::{
    ComponentArgs, Engine, FnComponent, Pacing, Program, ProgramBuilder, StepOutcome,
};

use crate::common::{engine, with_speech};

fn register_branch(engine: &mut Engine, sub: Program) {
    engine.register_component(FnComponent::new("branch", move |engine, _| {
        engine.load_sub_program(sub.clone());
        Ok(Pacing::Continue)
    }));
}

#[test]
fn sub_program_resumes_after_the_component() {
    let mut engine = engine();
    let said = with_speech(&mut engine);
    register_branch(
        &mut engine,
        ProgramBuilder::new().say("log", "aside").build(),
    );
    engine.load_program(
        ProgramBuilder::new()
            .say("log", "before")
            .call_component("branch", ComponentArgs::new())
            .say("log", "after")
            .build(),
    );

    assert_eq!(engine.run().unwrap(), StepOutcome::Halted);
    assert_eq!(*said.borrow(), vec!["before", "aside", "after"]);
    assert_eq!(engine.continuation_depth(), 0);
}

#[test]
fn saved_continuation_points_past_the_component() {
    let mut engine = engine();
    let main = ProgramBuilder::new()
        .call_component("branch", ComponentArgs::new())
        .set_static("resumed", true)
        .build();
    register_branch(&mut engine, ProgramBuilder::new().say("say", "x").build());
    with_speech(&mut engine);
    engine.load_program(main.clone());

    assert_eq!(engine.step().unwrap(), StepOutcome::Paused);
    assert_eq!(engine.continuation_depth(), 1);
    let saved = &engine.continuations()[0];
    assert!(saved.program.same_as(&main));
    assert_eq!(saved.position, 1);
}

#[test]
fn nested_sub_programs_unwind_innermost_first() {
    let mut engine = engine();
    let said = with_speech(&mut engine);

    let innermost = ProgramBuilder::new().say("log", "three").build();
    let middle = ProgramBuilder::new()
        .say("log", "two")
        .call_component("deeper", ComponentArgs::new())
        .say("log", "two again")
        .build();
    engine.register_component(FnComponent::new("deeper", move |engine, _| {
        engine.load_sub_program(innermost.clone());
        Ok(Pacing::Continue)
    }));
    register_branch(&mut engine, middle);

    engine.load_program(
        ProgramBuilder::new()
            .say("log", "one")
            .call_component("branch", ComponentArgs::new())
            .say("log", "one again")
            .build(),
    );

    engine.run().unwrap();
    assert_eq!(
        *said.borrow(),
        vec!["one", "two", "three", "two again", "one again"]
    );
}

#[test]
fn host_can_push_a_sub_program_directly() {
    let mut engine = engine();
    let said = with_speech(&mut engine);
    engine.load_program(
        ProgramBuilder::new()
            .say("log", "a")
            .say("log", "b")
            .build(),
    );
    engine.step_single().unwrap();

    engine.load_sub_program(ProgramBuilder::new().say("log", "interrupt").build());
    assert_eq!(engine.current_position(), 0);
    engine.run().unwrap();

    assert_eq!(*said.borrow(), vec!["a", "interrupt", "b"]);
}

#[test]
fn single_step_unwinds_then_executes() {
    let mut engine = engine();
    let said = with_speech(&mut engine);
    engine.load_program(ProgramBuilder::new().say("log", "resume").build());
    engine.load_sub_program(Program::default());

    assert_eq!(engine.step_single().unwrap(), StepOutcome::Stepped);
    assert_eq!(*said.borrow(), vec!["resume"]);
}

#[test]
fn load_program_keeps_continuations() {
    let mut engine = engine();
    engine.load_program(ProgramBuilder::new().goto(0).build());
    engine.load_sub_program(ProgramBuilder::new().build());
    engine.load_program(ProgramBuilder::new().set_static("x", 1i64).build());

    assert_eq!(engine.continuation_depth(), 1);
    assert_eq!(engine.current_position(), 0);
}

#[test]
fn failing_component_rolls_back_its_switch() {
    let mut engine = engine();
    engine.register_component(FnComponent::new("flaky", |engine, _| {
        engine.load_sub_program(ProgramBuilder::new().goto(0).build());
        Err(Error::host("lost connection"))
    }));
    let main = ProgramBuilder::new()
        .set_static("x", 1i64)
        .call_component("flaky", ComponentArgs::new())
        .build();
    engine.load_program(main.clone());

    let err = engine.run().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Host(_)));
    assert!(engine.current_program().same_as(&main));
    assert_eq!(engine.current_position(), 1);
    assert_eq!(engine.continuation_depth(), 0);
    // Variable writes are not part of the rollback.
    assert_eq!(engine.static_value("x"), Value::Int(1));
}

#[test]
fn reset_returns_to_the_root_program() {
    let mut engine = engine();
    let root = ProgramBuilder::new().say("say", "root").build();
    with_speech(&mut engine);
    engine.load_program(root.clone());
    engine.load_sub_program(ProgramBuilder::new().say("say", "sub").build());
    engine.step().unwrap();

    engine.reset();
    assert!(engine.current_program().same_as(&root));
    assert_eq!(engine.current_position(), 0);
    assert_eq!(engine.continuation_depth(), 0);
}
