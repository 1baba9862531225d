//! Instruction set, variable store, registries, and execution engine for Beatline.
//!
//! This crate provides:
//! - [`Instruction`] / [`Program`] - The seven-opcode instruction set
//! - [`VariableStore`] - Static and reactive variable namespaces
//! - [`Component`] / [`ExternFunction`] - Host capabilities invoked by programs
//! - [`Engine`] - The dispatch loop with call and continuation stacks
//! - [`prelude`] - Built-in extern functions
//! - [`ScriptEvaluator`] - Optional embedded expression evaluator

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod builder;
mod config;
mod embedded;
mod engine;
mod instruction;
pub mod prelude;
mod registry;
mod trace;
mod variables;

pub use builder::ProgramBuilder;
pub use config::EngineConfig;
pub use embedded::{EmbeddedEvaluator, ScriptEvaluator};
pub use engine::{Continuation, Engine, StepOutcome};
pub use instruction::{ComponentArgs, Expr, Instruction, Operand, Program};
pub use registry::{Component, ExternFunction, FnComponent, NativeExtern, NativeFn, Pacing, Registry};
pub use trace::{TraceBuffer, TraceRecord};
pub use variables::{ReactiveVariable, Subscription, VariableScope, VariableStore};

pub use beatline_foundation::{Error, ErrorContext, ErrorKind, Result, Type, Value};
