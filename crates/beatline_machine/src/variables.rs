//! Static and reactive variable namespaces.
//!
//! Static variables are plain name-value slots. Reactive variables carry a
//! subscriber list and notify it synchronously whenever their value changes.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use beatline_foundation::Value;

/// Callback invoked with `(new, old)` when a reactive value changes.
type Subscriber = Rc<dyn Fn(&Value, &Value)>;

// =============================================================================
// Reactive Variable
// =============================================================================

struct ReactiveCell {
    value: RefCell<Value>,
    subscribers: RefCell<Vec<(u64, Subscriber)>>,
    next_id: Cell<u64>,
}

/// A subscribable value cell.
///
/// Cloning yields another handle to the same cell.
#[derive(Clone)]
pub struct ReactiveVariable(Rc<ReactiveCell>);

impl ReactiveVariable {
    /// Creates a reactive variable holding `initial`.
    #[must_use]
    pub fn new(initial: Value) -> Self {
        Self(Rc::new(ReactiveCell {
            value: RefCell::new(initial),
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }))
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> Value {
        self.0.value.borrow().clone()
    }

    /// Replaces the value and notifies subscribers if it changed.
    ///
    /// Every callback subscribed when the change happens is invoked once with
    /// `(new, old)`, in subscription order. Callbacks may read this variable
    /// and may subscribe or unsubscribe.
    pub fn set(&self, value: Value) {
        let old = self.0.value.replace(value.clone());
        if old == value {
            return;
        }

        let snapshot: Vec<Subscriber> = self
            .0
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in snapshot {
            callback(&value, &old);
        }
    }

    /// Registers a change callback.
    pub fn subscribe(&self, callback: impl Fn(&Value, &Value) + 'static) -> Subscription {
        let id = self.0.next_id.get();
        self.0.next_id.set(id + 1);
        self.0
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(callback)));
        Subscription {
            id,
            cell: Rc::downgrade(&self.0),
        }
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.0.subscribers.borrow().len()
    }
}

impl fmt::Debug for ReactiveVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveVariable")
            .field("value", &*self.0.value.borrow())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle returned by [`ReactiveVariable::subscribe`].
///
/// Dropping the handle does not unsubscribe.
#[derive(Clone, Debug)]
pub struct Subscription {
    id: u64,
    cell: Weak<ReactiveCell>,
}

impl Subscription {
    /// Removes exactly the callback this handle was created for.
    ///
    /// Calling it again, or after the variable is gone, does nothing.
    pub fn unsubscribe(&self) {
        if let Some(cell) = self.cell.upgrade() {
            cell.subscribers.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

// =============================================================================
// Variable Store
// =============================================================================

/// The two variable namespaces owned by an engine.
#[derive(Debug, Default)]
pub struct VariableStore {
    statics: HashMap<Arc<str>, Value>,
    reactives: HashMap<Arc<str>, ReactiveVariable>,
}

impl VariableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a static value, or `Nil` if it was never set.
    #[must_use]
    pub fn get_static(&self, name: &str) -> Value {
        self.statics.get(name).cloned().unwrap_or_default()
    }

    /// Overwrites a static value.
    pub fn set_static(&mut self, name: impl Into<Arc<str>>, value: Value) {
        self.statics.insert(name.into(), value);
    }

    /// Returns a reactive variable handle.
    #[must_use]
    pub fn reactive(&self, name: &str) -> Option<&ReactiveVariable> {
        self.reactives.get(name)
    }

    /// Declares a reactive variable, or returns the existing one untouched.
    pub fn declare_reactive(&mut self, name: impl Into<Arc<str>>, initial: Value) -> ReactiveVariable {
        self.reactives
            .entry(name.into())
            .or_insert_with(|| ReactiveVariable::new(initial))
            .clone()
    }

    /// Read-only view of the static namespace.
    #[must_use]
    pub fn statics(&self) -> &HashMap<Arc<str>, Value> {
        &self.statics
    }

    /// Read-only view of the reactive namespace.
    #[must_use]
    pub fn reactives(&self) -> &HashMap<Arc<str>, ReactiveVariable> {
        &self.reactives
    }

    /// Returns the read-only scope handed to embedded evaluators.
    #[must_use]
    pub fn scope(&self) -> VariableScope<'_> {
        VariableScope { store: self }
    }
}

// =============================================================================
// Variable Scope
// =============================================================================

/// Read-only bindings visible to embedded expressions.
///
/// Exposes exactly the static values and the current reactive values.
#[derive(Clone, Copy, Debug)]
pub struct VariableScope<'a> {
    store: &'a VariableStore,
}

impl VariableScope<'_> {
    /// Returns a static value, if set.
    #[must_use]
    pub fn static_value(&self, name: &str) -> Option<Value> {
        self.store.statics.get(name).cloned()
    }

    /// Returns the current value of a reactive variable, if declared.
    #[must_use]
    pub fn reactive_value(&self, name: &str) -> Option<Value> {
        self.store.reactives.get(name).map(ReactiveVariable::value)
    }

    /// Returns the sorted static variable names.
    #[must_use]
    pub fn static_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.store.statics.keys().map(AsRef::as_ref).collect();
        names.sort_unstable();
        names
    }

    /// Returns the sorted reactive variable names.
    #[must_use]
    pub fn reactive_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.store.reactives.keys().map(AsRef::as_ref).collect();
        names.sort_unstable();
        names
    }
}
