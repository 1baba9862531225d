//! The Beatline execution engine.
//!
//! The engine owns the active program, the instruction position, the call
//! stack, and the continuation stack. Each `step` executes instructions until
//! the program halts, a component asks for a pause, or the engine is locked.
//!
//! # Sub-programs
//!
//! [`Engine::load_sub_program`] suspends the active program on the
//! continuation stack. When the sub-program runs past its last instruction,
//! the suspended program resumes at exactly the saved position. Call-stack
//! entries belong to whichever program is active; a `RETURN` that crosses a
//! sub-program boundary is a caller error.
//!
//! # Lock
//!
//! While locked, `step` executes nothing and records that a step was
//! requested. [`Engine::unlock`] replays at most one step no matter how many
//! requests arrived.

#![allow(clippy::needless_pass_by_value)]


use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use beatline_foundation::{Error, ErrorContext, ErrorKind, Result, SemanticLimit, Type, Value};
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::embedded::EmbeddedEvaluator;
use crate::instruction::{Instruction, Operand, Program};
use crate::registry::{Component, ExternFunction, Pacing, Registry};
use crate::trace::TraceBuffer;
use crate::variables::{ReactiveVariable, VariableScope, VariableStore};

// =============================================================================
// Execution State
// =============================================================================

/// A suspended `(program, position)` pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Continuation {
    /// The suspended program.
    pub program: Program,
    /// Where it resumes.
    pub position: usize,
}

/// Why a `step` call returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// No instruction remains and no continuation is saved.
    Halted,
    /// A component asked the engine to stop auto-advancing.
    Paused,
    /// A single-step request executed its one instruction.
    Stepped,
    /// The engine is locked; the request was recorded for `unlock`.
    Deferred,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StepMode {
    Burst,
    Single,
}

struct Snapshot {
    program: Program,
    position: usize,
    call_stack: Vec<usize>,
    continuations: Vec<Continuation>,
    locked: bool,
    pending: Option<StepMode>,
}

// =============================================================================
// Engine
// =============================================================================

/// The instruction dispatch loop and everything it owns.
pub struct Engine {
    config: EngineConfig,
    program: Program,
    position: usize,
    call_stack: Vec<usize>,
    continuations: Vec<Continuation>,
    variables: VariableStore,
    components: Registry<dyn Component>,
    externs: Registry<dyn ExternFunction>,
    embedded: Option<Rc<dyn EmbeddedEvaluator>>,
    locked: bool,
    pending: Option<StepMode>,
    trace: TraceBuffer,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with an empty program and the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let trace = TraceBuffer::new(config.trace_capacity);
        Self {
            config,
            program: Program::default(),
            position: 0,
            call_stack: Vec::new(),
            continuations: Vec::new(),
            variables: VariableStore::new(),
            components: Registry::new(),
            externs: Registry::new(),
            embedded: None,
            locked: false,
            pending: None,
            trace,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Registers a component; a later registration under the same name wins.
    pub fn register_component(&mut self, component: impl Component + 'static) {
        let component: Rc<dyn Component> = Rc::new(component);
        let name = component.name().to_owned();
        if self.components.insert(&name, component).is_some() {
            debug!(component = %name, "component replaced");
        } else {
            debug!(component = %name, "component registered");
        }
    }

    /// Registers an extern function; a later registration under the same name wins.
    pub fn register_extern_function(&mut self, function: impl ExternFunction + 'static) {
        let function: Rc<dyn ExternFunction> = Rc::new(function);
        let name = function.name().to_owned();
        self.externs.insert(&name, function);
        trace!(function = %name, "extern function registered");
    }

    /// Returns the registered component names, sorted.
    #[must_use]
    pub fn components(&self) -> Vec<Arc<str>> {
        self.components.names()
    }

    /// Returns the registered extern function names, sorted.
    #[must_use]
    pub fn extern_functions(&self) -> Vec<Arc<str>> {
        self.externs.names()
    }

    /// Installs the evaluator used by instructions with the `eval` flag.
    pub fn install_embedded_evaluator(&mut self, evaluator: impl EmbeddedEvaluator + 'static) {
        self.embedded = Some(Rc::new(evaluator));
        debug!("embedded evaluator installed");
    }

    /// Returns true if an embedded evaluator is installed.
    #[must_use]
    pub fn has_embedded_evaluator(&self) -> bool {
        self.embedded.is_some()
    }

    // -------------------------------------------------------------------------
    // Variables
    // -------------------------------------------------------------------------

    /// Returns a static value, or `Nil` if it was never set.
    #[must_use]
    pub fn static_value(&self, name: &str) -> Value {
        self.variables.get_static(name)
    }

    /// Overwrites a static value.
    pub fn set_static_value(&mut self, name: &str, value: impl Into<Value>) {
        self.variables.set_static(name, value.into());
    }

    /// Returns a handle to a declared reactive variable.
    #[must_use]
    pub fn reactive_variable(&self, name: &str) -> Option<ReactiveVariable> {
        self.variables.reactive(name).cloned()
    }

    /// Declares a reactive variable, or returns the existing one.
    pub fn declare_reactive(&mut self, name: &str, initial: impl Into<Value>) -> ReactiveVariable {
        self.variables.declare_reactive(name, initial.into())
    }

    /// Read-only view of the static namespace.
    #[must_use]
    pub fn static_variables(&self) -> &HashMap<Arc<str>, Value> {
        self.variables.statics()
    }

    /// Read-only view of the reactive namespace.
    #[must_use]
    pub fn reactive_variables(&self) -> &HashMap<Arc<str>, ReactiveVariable> {
        self.variables.reactives()
    }

    /// Returns the bindings visible to embedded expressions.
    #[must_use]
    pub fn scope(&self) -> VariableScope<'_> {
        self.variables.scope()
    }

    // -------------------------------------------------------------------------
    // Programs
    // -------------------------------------------------------------------------

    /// Replaces the active program and starts it at position 0.
    ///
    /// The continuation stack is left untouched.
    pub fn load_program(&mut self, program: impl Into<Program>) {
        self.program = program.into();
        self.position = 0;
        debug!(len = self.program.len(), depth = self.continuations.len(), "program loaded");
    }

    /// Suspends the active program and loads `sub` in its place.
    pub fn load_sub_program(&mut self, sub: impl Into<Program>) {
        self.continuations.push(Continuation {
            program: self.program.clone(),
            position: self.position,
        });
        debug!(
            resume_at = self.position,
            depth = self.continuations.len(),
            "sub-program switch"
        );
        self.load_program(sub);
    }

    /// Returns the active program.
    #[must_use]
    pub fn current_program(&self) -> &Program {
        &self.program
    }

    /// Returns the position of the next instruction.
    #[must_use]
    pub fn current_position(&self) -> usize {
        self.position
    }

    /// Returns the next instruction, if the position is inside the program.
    #[must_use]
    pub fn current_instruction(&self) -> Option<&Instruction> {
        self.program.get(self.position)
    }

    /// Returns true if there is no instruction left and nothing to resume.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.current_instruction().is_none() && self.continuations.is_empty()
    }

    /// Returns the call-stack depth.
    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    /// Returns the continuation-stack depth.
    #[must_use]
    pub fn continuation_depth(&self) -> usize {
        self.continuations.len()
    }

    /// Returns the pending return positions, oldest first.
    #[must_use]
    pub fn call_stack(&self) -> &[usize] {
        &self.call_stack
    }

    /// Returns the suspended programs, oldest first.
    #[must_use]
    pub fn continuations(&self) -> &[Continuation] {
        &self.continuations
    }

    /// Rewinds the active program to position 0 and clears both stacks and the lock.
    ///
    /// Variables, registrations, and the trace are kept.
    pub fn reset(&mut self) {
        if let Some(root) = self.continuations.first() {
            self.program = root.program.clone();
        }
        self.position = 0;
        self.call_stack.clear();
        self.continuations.clear();
        self.locked = false;
        self.pending = None;
        debug!("engine reset");
    }

    // -------------------------------------------------------------------------
    // Lock
    // -------------------------------------------------------------------------

    /// Blocks execution until [`unlock`](Self::unlock).
    pub fn lock(&mut self) {
        self.locked = true;
        debug!("engine locked");
    }

    /// Returns true if the engine is locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns true if a step was requested while locked.
    #[must_use]
    pub fn has_pending_step(&self) -> bool {
        self.pending.is_some()
    }

    /// Clears the lock and replays one deferred step, if any was requested.
    ///
    /// The replayed step uses the mode of the most recent request.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the replayed step.
    pub fn unlock(&mut self) -> Result<Option<StepOutcome>> {
        self.locked = false;
        match self.pending.take() {
            Some(mode) => {
                debug!(?mode, "replaying deferred step");
                self.run_step(mode).map(Some)
            }
            None => {
                debug!("engine unlocked");
                Ok(None)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Stepping
    // -------------------------------------------------------------------------

    /// Executes instructions until halt, a component pause, or a lock.
    ///
    /// # Errors
    ///
    /// Fatal instruction errors abort the step with the position and both
    /// stacks exactly as they were before the failing instruction.
    pub fn step(&mut self) -> Result<StepOutcome> {
        self.run_step(StepMode::Burst)
    }

    /// Executes at most one instruction.
    ///
    /// Exhausted sub-programs are still unwound first, so a single step may
    /// restore a continuation before executing.
    ///
    /// # Errors
    ///
    /// See [`step`](Self::step).
    pub fn step_single(&mut self) -> Result<StepOutcome> {
        self.run_step(StepMode::Single)
    }

    /// Steps until halted, passing through component pauses.
    ///
    /// Returns [`StepOutcome::Deferred`] early if the engine becomes locked.
    ///
    /// # Errors
    ///
    /// See [`step`](Self::step).
    pub fn run(&mut self) -> Result<StepOutcome> {
        loop {
            match self.step()? {
                outcome @ (StepOutcome::Halted | StepOutcome::Deferred) => return Ok(outcome),
                StepOutcome::Paused | StepOutcome::Stepped => {}
            }
        }
    }

    fn run_step(&mut self, mode: StepMode) -> Result<StepOutcome> {
        let mut executed = 0usize;
        loop {
            if self.locked {
                self.pending = Some(mode);
                trace!(?mode, "step deferred");
                return Ok(StepOutcome::Deferred);
            }

            if self.current_instruction().is_none() {
                let Some(resume) = self.continuations.pop() else {
                    return Ok(StepOutcome::Halted);
                };
                debug!(
                    position = resume.position,
                    depth = self.continuations.len(),
                    "continuation restored"
                );
                self.program = resume.program;
                self.position = resume.position;
                continue;
            }

            if let Some(limit) = self.config.max_burst {
                if executed >= limit {
                    warn!(limit, position = self.position, "instruction budget exhausted");
                    return Err(Error::limit_exceeded(SemanticLimit::MaxBurst { limit })
                        .with_context(self.context_here()));
                }
            }

            let pacing = self.execute_current()?;
            executed += 1;

            if mode == StepMode::Single {
                return Ok(StepOutcome::Stepped);
            }
            if !pacing.keeps_stepping() {
                return Ok(StepOutcome::Paused);
            }
        }
    }

    fn execute_current(&mut self) -> Result<Pacing> {
        let program = self.program.clone();
        let position = self.position;
        let Some(instruction) = program.get(position) else {
            return Err(Error::new(ErrorKind::Internal(format!(
                "no instruction at position {position}"
            ))));
        };

        let depth = self.continuations.len();
        trace!(position, depth, op = instruction.name(), "execute");
        if self.config.trace_enabled {
            self.trace.push(position, depth, instruction.clone());
        }

        self.execute(instruction).map_err(|err| {
            let mut context = self
                .context_here()
                .with_instruction(instruction.name())
                .with_position(position);
            if let Some(operand) = instruction.operand() {
                context = context.with_operand(operand.to_string());
            }
            warn!(position, op = instruction.name(), error = %err, "step aborted");
            err.with_context(context)
        })
    }

    fn execute(&mut self, instruction: &Instruction) -> Result<Pacing> {
        match instruction {
            Instruction::SetStaticVar { name, value, eval } => {
                let value = self.evaluate_operand(value, *eval)?;
                self.variables.set_static(Arc::clone(name), value);
                self.position += 1;
            }
            Instruction::SetReactiveVar { name, value, eval } => {
                let variable = self
                    .variables
                    .reactive(name)
                    .cloned()
                    .ok_or_else(|| Error::unknown_reactive(name.to_string()))?;
                let value = self.evaluate_operand(value, *eval)?;
                variable.set(value);
                self.position += 1;
            }
            Instruction::Goto { target } => {
                self.position = *target;
            }
            Instruction::CondGoto {
                condition, eval, ..
            } => {
                let value = self.evaluate_operand(condition, *eval)?;
                self.position = jump_target(&value)?;
            }
            Instruction::Call { target } => {
                self.call_stack.push(self.position + 1);
                self.position = *target;
            }
            Instruction::Return => {
                let Some(resume) = self.call_stack.pop() else {
                    return Err(Error::new(ErrorKind::ReturnWithoutCall));
                };
                self.position = resume;
            }
            Instruction::CallComponent { name, args } => {
                let component = self
                    .components
                    .get(name)
                    .ok_or_else(|| Error::unknown_component(name.to_string()))?;

                let snapshot = self.snapshot();
                self.position += 1;
                return match component.call(self, args) {
                    Ok(pacing) => Ok(pacing),
                    Err(err) => {
                        self.restore(snapshot);
                        Err(err)
                    }
                };
            }
        }
        Ok(Pacing::Continue)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            program: self.program.clone(),
            position: self.position,
            call_stack: self.call_stack.clone(),
            continuations: self.continuations.clone(),
            locked: self.locked,
            pending: self.pending,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.program = snapshot.program;
        self.position = snapshot.position;
        self.call_stack = snapshot.call_stack;
        self.continuations = snapshot.continuations;
        self.locked = snapshot.locked;
        self.pending = snapshot.pending;
    }

    fn context_here(&self) -> ErrorContext {
        let mut context = ErrorContext::new().with_frame(format!(
            "program of {} instructions at position {}",
            self.program.len(),
            self.position
        ));
        for suspended in self.continuations.iter().rev() {
            context = context.with_frame(format!(
                "suspended program of {} instructions at position {}",
                suspended.program.len(),
                suspended.position
            ));
        }
        context
    }

    // -------------------------------------------------------------------------
    // Evaluation
    // -------------------------------------------------------------------------

    /// Evaluates an operand through the structured path.
    ///
    /// Literals are returned verbatim; expression nodes call the named extern
    /// function with their unevaluated arguments.
    ///
    /// # Errors
    ///
    /// Returns `UnknownExternFunction` for an unregistered operator, or any
    /// error the extern function raises.
    pub fn evaluate(&self, operand: &Operand) -> Result<Value> {
        match operand {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Expr(expr) => {
                let function = self
                    .externs
                    .get(&expr.operator)
                    .ok_or_else(|| Error::unknown_extern(expr.operator.to_string()))?;
                function.call(self, &expr.args)
            }
        }
    }

    /// Evaluates a string-literal operand with the installed embedded evaluator.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddedUnavailable` when no evaluator is installed, a type
    /// mismatch when the operand is not a string literal, or whatever the
    /// evaluator reports.
    pub fn evaluate_embedded(&self, operand: &Operand) -> Result<Value> {
        let evaluator = self
            .embedded
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::EmbeddedUnavailable))?;
        let source = match operand {
            Operand::Literal(Value::String(source)) => source,
            Operand::Literal(other) => {
                return Err(Error::type_mismatch(Type::String, other.value_type()));
            }
            Operand::Expr(_) => return Err(Error::type_mismatch(Type::String, Type::Any)),
        };
        evaluator.evaluate(source, self.variables.scope())
    }

    fn evaluate_operand(&self, operand: &Operand, eval: bool) -> Result<Value> {
        if eval {
            self.evaluate_embedded(operand)
        } else {
            self.evaluate(operand)
        }
    }

    // -------------------------------------------------------------------------
    // Trace
    // -------------------------------------------------------------------------

    /// Returns the execution trace.
    #[must_use]
    pub fn trace(&self) -> &TraceBuffer {
        &self.trace
    }

    /// Clears the execution trace.
    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }
}

fn jump_target(value: &Value) -> Result<usize> {
    match value {
        Value::Int(n) => usize::try_from(*n)
            .map_err(|_| Error::new(ErrorKind::InvalidJumpTarget(format!("{n}")))),
        other => Err(Error::new(ErrorKind::InvalidJumpTarget(format!(
            "{other:?} ({})",
            other.value_type()
        )))),
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("position", &self.position)
            .field("program_len", &self.program.len())
            .field("call_stack", &self.call_stack)
            .field("continuations", &self.continuations.len())
            .field("locked", &self.locked)
            .field("components", &self.components)
            .field("externs", &self.externs.len())
            .finish_non_exhaustive()
    }
}
