//! Error types for the Beatline system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::types::Type;

/// The main error type for Beatline operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    ///
    /// Context that is already attached wins; an error raised deep inside an
    /// extern function keeps the innermost description.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        if self.context.is_none() {
            self.context = Some(context);
        }
        self
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an unknown component error.
    #[must_use]
    pub fn unknown_component(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownComponent(name.into()))
    }

    /// Creates an unknown extern function error.
    #[must_use]
    pub fn unknown_extern(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownExternFunction(name.into()))
    }

    /// Creates an unknown reactive variable error.
    #[must_use]
    pub fn unknown_reactive(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownReactiveVariable(name.into()))
    }

    /// Creates an arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(expected: impl Into<String>, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch {
            expected: expected.into(),
            actual,
        })
    }

    /// Creates an error for a failure reported by host code.
    #[must_use]
    pub fn host(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Host(message.into()))
    }

    /// Creates a semantic limit exceeded error.
    #[must_use]
    pub fn limit_exceeded(limit: SemanticLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Type mismatch during runtime type checking.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// `CALL_COMPONENT` named a component that was never registered.
    #[error("no component named {0} registered for this engine")]
    UnknownComponent(String),

    /// An expression node named an extern function that was never registered.
    #[error("no extern function named {0} registered for this engine")]
    UnknownExternFunction(String),

    /// `SET_REACTIVE_VAR` named a reactive variable that was never declared.
    #[error("no reactive variable named {0} declared for this engine")]
    UnknownReactiveVariable(String),

    /// `RETURN` executed with an empty call stack.
    #[error("cannot return because there is no call")]
    ReturnWithoutCall,

    /// `COND_GOTO` evaluated to something that is not a position.
    #[error("invalid jump target: {0}")]
    InvalidJumpTarget(String),

    /// Wrong number of arguments to an extern function.
    #[error("arity mismatch: expected {expected}, got {actual}")]
    ArityMismatch {
        /// Description of expected arity.
        expected: String,
        /// Actual number of arguments.
        actual: usize,
    },

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Parse error in an embedded expression.
    #[error("parse error at column {column}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Column number (1-indexed).
        column: usize,
        /// The expression source.
        source_text: String,
    },

    /// An instruction requested embedded evaluation but no evaluator is installed.
    #[error("embedded expressions are disabled for this engine")]
    EmbeddedUnavailable,

    /// A component or extern function reported a failure.
    #[error("host error: {0}")]
    Host(String),

    /// Semantic limit exceeded (kill switch triggered).
    #[error("limit exceeded: {0}")]
    LimitExceeded(SemanticLimit),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// I/O failure.
    #[error("io error: {0}")]
    IoError(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Semantic limits (kill switches) that can be exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticLimit {
    /// Maximum instructions executed by a single step call.
    MaxBurst {
        /// The configured limit.
        limit: usize,
    },
}

impl fmt::Display for SemanticLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxBurst { limit } => {
                write!(f, "max instructions per step ({limit}) exceeded")
            }
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Kind of the instruction being executed.
    pub instruction: Option<String>,
    /// Position of that instruction in the active program.
    pub position: Option<usize>,
    /// Rendering of the operand being evaluated.
    pub operand: Option<String>,
    /// Program stack, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instruction kind.
    #[must_use]
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    /// Sets the instruction position.
    #[must_use]
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Sets the operand rendering.
    #[must_use]
    pub fn with_operand(mut self, operand: impl Into<String>) -> Self {
        self.operand = Some(operand.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(instruction) = &self.instruction {
            write!(f, "in {instruction}")?;
            if let Some(position) = self.position {
                write!(f, " at position {position}")?;
            }
        } else if let Some(position) = self.position {
            write!(f, "at position {position}")?;
        }
        if let Some(operand) = &self.operand {
            write!(f, " evaluating {operand}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
