//! Embedded expression evaluation.
//!
//! Instructions whose `eval` flag is set carry their operand as source text.
//! The engine hands that text to an installed [`EmbeddedEvaluator`] together
//! with a [`VariableScope`], which exposes exactly the static values and the
//! current reactive values, read-only. Without an installed evaluator such
//! instructions fail with `EmbeddedUnavailable`.

mod lexer;
mod script;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use beatline_foundation::{Result, Value};

use crate::variables::VariableScope;

/// Capability that evaluates embedded expression source.
pub trait EmbeddedEvaluator {
    /// Evaluates `source` against read-only variable bindings.
    ///
    /// # Errors
    ///
    /// Returns a parse error or an evaluation error.
    fn evaluate(&self, source: &str, scope: VariableScope<'_>) -> Result<Value>;
}

/// The shipped evaluator for the closed s-expression grammar.
///
/// ```text
/// (and (>= $$gold 10) (== $mood "happy"))
/// ```
///
/// Literals are integers, floats, `"strings"`, `true`, `false` and `nil`.
/// `$name` reads a reactive variable and `$$name` a static one. Operators
/// are `+ - * / % ABS & | ^ < > <= >= == != and or not .` with the same
/// semantics as the prelude extern functions.
///
/// Parsed expressions are cached by source text.
#[derive(Default)]
pub struct ScriptEvaluator {
    cache: RefCell<HashMap<String, Rc<script::Node>>>,
}

impl ScriptEvaluator {
    /// Creates an evaluator with an empty parse cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `source` without evaluating it.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` describing the first problem.
    pub fn check(&self, source: &str) -> Result<()> {
        self.parsed(source).map(|_| ())
    }

    /// Returns the number of cached parse trees.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    fn parsed(&self, source: &str) -> Result<Rc<script::Node>> {
        if let Some(node) = self.cache.borrow().get(source) {
            return Ok(Rc::clone(node));
        }
        let node = Rc::new(script::parse(source)?);
        self.cache
            .borrow_mut()
            .insert(source.to_string(), Rc::clone(&node));
        Ok(node)
    }
}

impl EmbeddedEvaluator for ScriptEvaluator {
    fn evaluate(&self, source: &str, scope: VariableScope<'_>) -> Result<Value> {
        let node = self.parsed(source)?;
        script::evaluate(&node, scope)
    }
}

impl fmt::Debug for ScriptEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptEvaluator")
            .field("cached", &self.cached())
            .finish()
    }
}
