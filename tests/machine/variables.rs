//! Integration tests for the variable store
//!
//! Static writes, reactive declaration, and change notification.

use std::cell::RefCell;
use std::rc::Rc;

use beatline_foundation::{ErrorKind, Value};
use beatline_machine::{ProgramBuilder, VariableStore};

use crate::common::engine;

#[test]
fn reactive_write_notifies_with_new_and_old() {
    let mut engine = engine();
    let mood = engine.declare_reactive("mood", "calm");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let _sub = mood.subscribe(move |new, old| {
        log.borrow_mut().push((new.clone(), old.clone()));
    });

    engine.load_program(
        ProgramBuilder::new()
            .set_reactive("mood", Value::from("angry"))
            .set_reactive("mood", Value::from("angry"))
            .build(),
    );
    engine.run().unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![(Value::from("angry"), Value::from("calm"))]
    );
}

#[test]
fn unsubscribed_callbacks_are_silent() {
    let store = {
        let mut store = VariableStore::new();
        store.declare_reactive("hp", Value::Int(10));
        store
    };
    let hp = store.reactive("hp").cloned().expect("declared");
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let sub = hp.subscribe(move |_, _| *counter.borrow_mut() += 1);

    hp.set(Value::Int(9));
    sub.unsubscribe();
    sub.unsubscribe();
    hp.set(Value::Int(8));

    assert_eq!(*calls.borrow(), 1);
    assert_eq!(hp.subscriber_count(), 0);
}

#[test]
fn subscriber_may_unsubscribe_itself() {
    let mut store = VariableStore::new();
    let flag = store.declare_reactive("flag", Value::Bool(false));

    let slot: Rc<RefCell<Option<beatline_machine::Subscription>>> = Rc::new(RefCell::new(None));
    let hits = Rc::new(RefCell::new(0));
    let (slot_in, hits_in) = (Rc::clone(&slot), Rc::clone(&hits));
    let sub = flag.subscribe(move |_, _| {
        *hits_in.borrow_mut() += 1;
        if let Some(me) = slot_in.borrow().as_ref() {
            me.unsubscribe();
        }
    });
    *slot.borrow_mut() = Some(sub);

    flag.set(Value::Bool(true));
    flag.set(Value::Bool(false));
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn declare_returns_the_existing_variable() {
    let mut engine = engine();
    let first = engine.declare_reactive("score", 1i64);
    let second = engine.declare_reactive("score", 99i64);

    first.set(Value::Int(5));
    assert_eq!(second.value(), Value::Int(5));
    assert_eq!(engine.reactive_variables().len(), 1);
}

#[test]
fn undeclared_reactive_write_is_fatal() {
    let mut engine = engine();
    engine.load_program(ProgramBuilder::new().set_reactive("ghost", 1i64).build());

    let err = engine.step().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownReactiveVariable(ref n) if n == "ghost"));
    assert_eq!(engine.current_position(), 0);
    assert!(engine.reactive_variable("ghost").is_none());
}

#[test]
fn static_views_are_read_only_snapshots_of_the_store() {
    let mut engine = engine();
    engine.set_static_value("a", 1i64);
    engine.set_static_value("b", 2i64);

    let scope = engine.scope();
    let names = scope.static_names();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(engine.static_variables().len(), 2);
    assert_eq!(engine.static_value("missing"), Value::Nil);
}
