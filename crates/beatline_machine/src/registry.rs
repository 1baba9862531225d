//! Host capabilities: components and extern functions.
//!
//! Both are stored by name in a [`Registry`]; a later registration under the
//! same name replaces the earlier one.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use beatline_foundation::{Result, Value};

use crate::engine::Engine;
use crate::instruction::{ComponentArgs, Operand};

// =============================================================================
// Pacing
// =============================================================================

/// What a component asks the engine to do after it returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pacing {
    /// Keep executing instructions in the current burst.
    #[default]
    Continue,
    /// End the burst; the next `step` resumes after the component.
    Pause,
}

impl Pacing {
    /// Returns true if the engine should keep stepping.
    #[must_use]
    pub const fn keeps_stepping(self) -> bool {
        matches!(self, Self::Continue)
    }
}

impl From<bool> for Pacing {
    fn from(keep_stepping: bool) -> Self {
        if keep_stepping {
            Self::Continue
        } else {
            Self::Pause
        }
    }
}

impl From<()> for Pacing {
    fn from((): ()) -> Self {
        Self::Continue
    }
}

// =============================================================================
// Components
// =============================================================================

/// A side-effecting host callback invoked by `CALL_COMPONENT`.
///
/// The component receives the engine mutably, so it may load a sub-program,
/// lock the engine, or touch variables.
pub trait Component {
    /// Registry name.
    fn name(&self) -> &str;

    /// Invokes the component with the instruction's arguments.
    ///
    /// # Errors
    ///
    /// Any error aborts the current step. Program, position, both stacks and
    /// the lock are put back as they were before the `CALL_COMPONENT`
    /// instruction; variable writes made by the component are kept.
    fn call(&self, engine: &mut Engine, args: &ComponentArgs) -> Result<Pacing>;
}

/// Adapts a closure into a [`Component`].
pub struct FnComponent<F> {
    name: Arc<str>,
    func: F,
}

impl<F> FnComponent<F>
where
    F: Fn(&mut Engine, &ComponentArgs) -> Result<Pacing>,
{
    /// Creates a component from a name and a closure.
    pub fn new(name: &str, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Component for FnComponent<F>
where
    F: Fn(&mut Engine, &ComponentArgs) -> Result<Pacing>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, engine: &mut Engine, args: &ComponentArgs) -> Result<Pacing> {
        (self.func)(engine, args)
    }
}

impl<F> fmt::Debug for FnComponent<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComponent").field("name", &self.name).finish()
    }
}

// =============================================================================
// Extern Functions
// =============================================================================

/// A value-producing host function invoked from expression operands.
///
/// Arguments arrive unevaluated; the function evaluates what it needs
/// through [`Engine::evaluate`], which is how short-circuiting works.
pub trait ExternFunction {
    /// Registry name.
    fn name(&self) -> &str;

    /// Computes a value from raw argument operands.
    ///
    /// # Errors
    ///
    /// Any error aborts the enclosing instruction.
    fn call(&self, engine: &Engine, args: &[Operand]) -> Result<Value>;
}

/// Signature of a native extern function.
pub type NativeFn = fn(&Engine, &[Operand]) -> Result<Value>;

/// An extern function backed by a plain function pointer.
#[derive(Clone, Copy)]
pub struct NativeExtern {
    /// Registry name.
    pub name: &'static str,
    /// Implementation.
    pub func: NativeFn,
}

impl NativeExtern {
    /// Creates a native extern function.
    #[must_use]
    pub const fn new(name: &'static str, func: NativeFn) -> Self {
        Self { name, func }
    }
}

impl ExternFunction for NativeExtern {
    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, engine: &Engine, args: &[Operand]) -> Result<Value> {
        (self.func)(engine, args)
    }
}

impl fmt::Debug for NativeExtern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeExtern").field("name", &self.name).finish()
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Name-keyed table of shared host capabilities.
pub struct Registry<T: ?Sized> {
    entries: HashMap<Arc<str>, Rc<T>>,
}

impl<T: ?Sized> Registry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Stores an entry, returning the one it replaced.
    pub fn insert(&mut self, name: &str, entry: Rc<T>) -> Option<Rc<T>> {
        self.entries.insert(name.into(), entry)
    }

    /// Looks up an entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Rc<T>> {
        self.entries.get(name).cloned()
    }

    /// Returns true if an entry with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<Arc<str>> {
        let mut names: Vec<Arc<str>> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
