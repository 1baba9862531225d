//! Integration tests for the lock gate
//!
//! Deferred steps, replay on unlock, and components that lock mid-burst.

use beatline_foundation::Value;
use beatline_machine::{ComponentArgs, FnComponent, Pacing, ProgramBuilder, StepOutcome};

use crate::common::{engine, with_speech};

#[test]
fn step_while_locked_is_deferred() {
    let mut engine = engine();
    engine.load_program(ProgramBuilder::new().set_static("x", 1i64).build());
    engine.lock();

    assert_eq!(engine.step().unwrap(), StepOutcome::Deferred);
    assert_eq!(engine.step().unwrap(), StepOutcome::Deferred);
    assert_eq!(engine.current_position(), 0);
    assert!(engine.has_pending_step());
}

#[test]
fn unlock_replays_exactly_one_step() {
    let mut engine = engine();
    let said = with_speech(&mut engine);
    engine.load_program(
        ProgramBuilder::new()
            .say("say", "one")
            .say("say", "two")
            .build(),
    );
    engine.lock();
    for _ in 0..5 {
        engine.step().unwrap();
    }

    assert_eq!(engine.unlock().unwrap(), Some(StepOutcome::Paused));
    assert_eq!(*said.borrow(), vec!["one"]);
    assert!(!engine.is_locked());
    assert!(!engine.has_pending_step());
}

#[test]
fn unlock_without_request_does_nothing() {
    let mut engine = engine();
    engine.load_program(ProgramBuilder::new().set_static("x", 1i64).build());
    engine.lock();

    assert_eq!(engine.unlock().unwrap(), None);
    assert_eq!(engine.current_position(), 0);
}

#[test]
fn unlock_replays_single_step_mode() {
    let mut engine = engine();
    engine.load_program(
        ProgramBuilder::new()
            .set_static("a", 1i64)
            .set_static("b", 2i64)
            .build(),
    );
    engine.lock();
    engine.step_single().unwrap();

    assert_eq!(engine.unlock().unwrap(), Some(StepOutcome::Stepped));
    assert_eq!(engine.current_position(), 1);
}

#[test]
fn component_lock_ends_a_run() {
    let mut engine = engine();
    engine.register_component(FnComponent::new("wait", |engine, _| {
        engine.lock();
        Ok(Pacing::Continue)
    }));
    engine.load_program(
        ProgramBuilder::new()
            .call_component("wait", ComponentArgs::new())
            .set_static("after", true)
            .build(),
    );

    assert_eq!(engine.run().unwrap(), StepOutcome::Deferred);
    assert_eq!(engine.current_position(), 1);
    assert_eq!(engine.static_value("after"), Value::Nil);

    assert_eq!(engine.unlock().unwrap(), Some(StepOutcome::Halted));
    assert_eq!(engine.static_value("after"), Value::Bool(true));
}

#[test]
fn reset_clears_the_lock() {
    let mut engine = engine();
    engine.lock();
    engine.step().unwrap();
    engine.reset();

    assert!(!engine.is_locked());
    assert!(!engine.has_pending_step());
}
