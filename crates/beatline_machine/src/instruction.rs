//! Instruction set for the Beatline engine.
//!
//! Programs are flat, 0-indexed instruction sequences. Jump targets are
//! absolute indices into whichever program is loaded when the jump executes.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use beatline_foundation::{SharedMap, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Operands
// =============================================================================

/// An instruction operand: either a literal or an extern-function call node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operand {
    /// A value returned verbatim by structured evaluation.
    Literal(Value),
    /// A call to a registered extern function.
    Expr(Expr),
}

/// An extern-function invocation node.
///
/// Arguments are handed to the extern function unevaluated.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Expr {
    /// Extern function name.
    pub operator: Arc<str>,
    /// Unevaluated arguments.
    pub args: Vec<Operand>,
}

impl Operand {
    /// Creates a literal operand.
    pub fn lit(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Creates an expression operand.
    pub fn expr(operator: &str, args: impl IntoIterator<Item = Operand>) -> Self {
        Self::Expr(Expr {
            operator: operator.into(),
            args: args.into_iter().collect(),
        })
    }

    /// Returns the literal value, if this operand is one.
    #[must_use]
    pub const fn as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(v) => Some(v),
            Self::Expr(_) => None,
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<Expr> for Operand {
    fn from(expr: Expr) -> Self {
        Self::Expr(expr)
    }
}

macro_rules! literal_operand {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Self {
                    Self::Literal(value.into())
                }
            }
        )*
    };
}

literal_operand!(bool, i64, i32, f64, &str, String);

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{v:?}"),
            Self::Expr(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.operator)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        write!(f, ")")
    }
}

// =============================================================================
// Component Arguments
// =============================================================================

/// Named arguments passed verbatim to a component.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "Vec<(Arc<str>, Value)>", into = "Vec<(Arc<str>, Value)>")
)]
pub struct ComponentArgs(SharedMap<Arc<str>, Value>);

impl ComponentArgs {
    /// Creates an empty argument map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the arguments with `key` set to `value`.
    #[must_use]
    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        Self(self.0.inserted(key.into(), value.into()))
    }

    /// Gets an argument by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Gets a string argument by name.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over name-value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(Arc<str>, Value)> for ComponentArgs {
    fn from_iter<I: IntoIterator<Item = (Arc<str>, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<(Arc<str>, Value)>> for ComponentArgs {
    fn from(entries: Vec<(Arc<str>, Value)>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<ComponentArgs> for Vec<(Arc<str>, Value)> {
    fn from(args: ComponentArgs) -> Self {
        let mut entries: Self = args.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

// =============================================================================
// Instructions
// =============================================================================

/// A single engine instruction.
///
/// The `eval` flag on variable writes and conditional jumps selects the
/// embedded evaluation path; when clear, the operand goes through the
/// structured extern-function evaluator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum Instruction {
    /// Store the evaluated value in the static namespace, then advance.
    SetStaticVar {
        /// Variable name.
        name: Arc<str>,
        /// Value operand.
        value: Operand,
        /// Use the embedded evaluator.
        #[cfg_attr(feature = "serde", serde(default))]
        eval: bool,
    },
    /// Store the evaluated value in a declared reactive variable, then advance.
    SetReactiveVar {
        /// Variable name.
        name: Arc<str>,
        /// Value operand.
        value: Operand,
        /// Use the embedded evaluator.
        #[cfg_attr(feature = "serde", serde(default))]
        eval: bool,
    },
    /// Jump to an absolute position.
    Goto {
        /// Target position.
        target: usize,
    },
    /// Jump to the position the condition evaluates to.
    ///
    /// `target` is carried for tooling and never consulted by the engine.
    CondGoto {
        /// Informational target.
        target: usize,
        /// Operand whose value becomes the next position.
        condition: Operand,
        /// Use the embedded evaluator.
        #[cfg_attr(feature = "serde", serde(default))]
        eval: bool,
    },
    /// Push the return position and jump.
    Call {
        /// Subroutine position.
        target: usize,
    },
    /// Pop the call stack into the position.
    Return,
    /// Invoke a registered component, then advance.
    CallComponent {
        /// Component name.
        name: Arc<str>,
        /// Arguments passed verbatim.
        #[cfg_attr(feature = "serde", serde(default))]
        args: ComponentArgs,
    },
}

impl Instruction {
    /// Returns the opcode name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetStaticVar { .. } => "SET_STATIC_VAR",
            Self::SetReactiveVar { .. } => "SET_REACTIVE_VAR",
            Self::Goto { .. } => "GOTO",
            Self::CondGoto { .. } => "COND_GOTO",
            Self::Call { .. } => "CALL",
            Self::Return => "RETURN",
            Self::CallComponent { .. } => "CALL_COMPONENT",
        }
    }

    /// Returns the operand this instruction evaluates, if any.
    #[must_use]
    pub const fn operand(&self) -> Option<&Operand> {
        match self {
            Self::SetStaticVar { value, .. } | Self::SetReactiveVar { value, .. } => Some(value),
            Self::CondGoto { condition, .. } => Some(condition),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |eval: bool| if eval { " (eval)" } else { "" };
        match self {
            Self::SetStaticVar { name, value, eval }
            | Self::SetReactiveVar { name, value, eval } => {
                write!(f, "{} {name} = {value}{}", self.name(), mark(*eval))
            }
            Self::Goto { target } | Self::Call { target } => {
                write!(f, "{} {target}", self.name())
            }
            Self::CondGoto {
                condition, eval, ..
            } => write!(f, "COND_GOTO {condition}{}", mark(*eval)),
            Self::Return => write!(f, "RETURN"),
            Self::CallComponent { name, args } => {
                write!(f, "CALL_COMPONENT {name}")?;
                let mut entries: Vec<_> = args.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                for (k, v) in entries {
                    write!(f, " {k}={v:?}")?;
                }
                Ok(())
            }
        }
    }
}

// =============================================================================
// Program
// =============================================================================

/// An ordered, shared instruction sequence.
///
/// Cloning is O(1); the continuation stack holds clones of suspended programs.
#[derive(Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "Vec<Instruction>", into = "Vec<Instruction>")
)]
pub struct Program(Arc<[Instruction]>);

impl Program {
    /// Creates a program from instructions.
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self(instructions.into())
    }

    /// Returns the number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the program has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets the instruction at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Instruction> {
        self.0.get(position)
    }

    /// Returns the instructions as a slice.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.0
    }

    /// Returns true if both handles share the same instruction storage.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Index<usize> for Program {
    type Output = Instruction;

    fn index(&self, position: usize) -> &Instruction {
        &self.0[position]
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions)
    }
}

impl From<Program> for Vec<Instruction> {
    fn from(program: Program) -> Self {
        program.0.to_vec()
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, instruction) in self.0.iter().enumerate() {
            writeln!(f, "{position:4}  {instruction}")?;
        }
        Ok(())
    }
}
