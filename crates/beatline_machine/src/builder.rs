//! Fluent construction of programs.

use std::sync::Arc;

use beatline_foundation::Value;

use crate::instruction::{ComponentArgs, Instruction, Operand, Program};

/// Builds a [`Program`] one instruction at a time.
///
/// ```
/// use beatline_machine::{Operand, ProgramBuilder};
///
/// let program = ProgramBuilder::new()
///     .set_static("x", Operand::lit(1))
///     .goto(3)
///     .set_static("x", Operand::lit(2))
///     .build();
/// assert_eq!(program.len(), 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,
}

impl ProgramBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Position the next instruction will occupy.
    #[must_use]
    pub fn position(&self) -> usize {
        self.instructions.len()
    }

    /// Appends an arbitrary instruction.
    #[must_use]
    pub fn push(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Appends `SET_STATIC_VAR` using structured evaluation.
    #[must_use]
    pub fn set_static(self, name: &str, value: impl Into<Operand>) -> Self {
        self.push(Instruction::SetStaticVar {
            name: name.into(),
            value: value.into(),
            eval: false,
        })
    }

    /// Appends `SET_STATIC_VAR` evaluating an embedded expression.
    #[must_use]
    pub fn set_static_eval(self, name: &str, source: &str) -> Self {
        self.push(Instruction::SetStaticVar {
            name: name.into(),
            value: Operand::lit(source),
            eval: true,
        })
    }

    /// Appends `SET_REACTIVE_VAR` using structured evaluation.
    #[must_use]
    pub fn set_reactive(self, name: &str, value: impl Into<Operand>) -> Self {
        self.push(Instruction::SetReactiveVar {
            name: name.into(),
            value: value.into(),
            eval: false,
        })
    }

    /// Appends `SET_REACTIVE_VAR` evaluating an embedded expression.
    #[must_use]
    pub fn set_reactive_eval(self, name: &str, source: &str) -> Self {
        self.push(Instruction::SetReactiveVar {
            name: name.into(),
            value: Operand::lit(source),
            eval: true,
        })
    }

    /// Appends `GOTO`.
    #[must_use]
    pub fn goto(self, target: usize) -> Self {
        self.push(Instruction::Goto { target })
    }

    /// Appends `COND_GOTO` whose condition evaluates to the next position.
    #[must_use]
    pub fn cond_goto(self, condition: impl Into<Operand>) -> Self {
        self.push(Instruction::CondGoto {
            target: 0,
            condition: condition.into(),
            eval: false,
        })
    }

    /// Appends `COND_GOTO` whose embedded expression evaluates to the next position.
    #[must_use]
    pub fn cond_goto_eval(self, source: &str) -> Self {
        self.push(Instruction::CondGoto {
            target: 0,
            condition: Operand::lit(source),
            eval: true,
        })
    }

    /// Appends `CALL`.
    #[must_use]
    pub fn call(self, target: usize) -> Self {
        self.push(Instruction::Call { target })
    }

    /// Appends `RETURN`.
    #[must_use]
    pub fn ret(self) -> Self {
        self.push(Instruction::Return)
    }

    /// Appends `CALL_COMPONENT`.
    #[must_use]
    pub fn call_component(self, name: &str, args: ComponentArgs) -> Self {
        self.push(Instruction::CallComponent {
            name: Arc::from(name),
            args,
        })
    }

    /// Appends `CALL_COMPONENT` with a single `text` argument.
    #[must_use]
    pub fn say(self, component: &str, text: &str) -> Self {
        self.call_component(component, ComponentArgs::new().with("text", Value::from(text)))
    }

    /// Finishes the program.
    #[must_use]
    pub fn build(self) -> Program {
        Program::new(self.instructions)
    }
}
