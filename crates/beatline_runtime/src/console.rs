//! Interactive stepping console over an [`Engine`].
//!
//! The console drives a loaded program one command at a time. Output from
//! the demo `say` and `log` components is collected in a [`Transcript`] and
//! printed after the command that produced it.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::rc::Rc;

use beatline_foundation::{Error, Result};
use beatline_machine::{ComponentArgs, Engine, FnComponent, Pacing, StepOutcome};
use tracing::debug;

use crate::editor::{LineEditor, ReadResult, RustylineEditor};

/// Commands understood by [`Console::execute_command`].
pub const COMMANDS: &[&str] = &[
    "step", "next", "run", "vars", "stack", "list", "trace", "lock", "unlock", "reset", "help",
    "quit",
];

// =============================================================================
// Transcript
// =============================================================================

/// Shared buffer of lines written by console components.
#[derive(Clone, Debug, Default)]
pub struct Transcript(Rc<RefCell<Vec<String>>>);

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line.
    pub fn push(&self, line: impl Into<String>) {
        self.0.borrow_mut().push(line.into());
    }

    /// Removes and returns every buffered line.
    #[must_use]
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    /// Returns the number of buffered lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

fn text_arg<'a>(component: &str, args: &'a ComponentArgs) -> Result<&'a str> {
    args.get_str("text")
        .ok_or_else(|| Error::host(format!("{component} needs a string `text` argument")))
}

/// Registers the `say` and `log` components on `engine`.
///
/// `say` writes its `text` argument and pauses the step; `log` writes its
/// `text` argument and lets the step continue.
pub fn install_demo_components(engine: &mut Engine, transcript: &Transcript) {
    let out = transcript.clone();
    engine.register_component(FnComponent::new("say", move |_, args| {
        out.push(text_arg("say", args)?);
        Ok(Pacing::Pause)
    }));

    let out = transcript.clone();
    engine.register_component(FnComponent::new("log", move |_, args| {
        out.push(text_arg("log", args)?);
        Ok(Pacing::Continue)
    }));
}

// =============================================================================
// Console
// =============================================================================

/// What the caller should do after a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Print this text (possibly empty) and keep reading.
    Text(String),
    /// Leave the console.
    Quit,
}

/// The interactive stepping console.
pub struct Console<E: LineEditor = RustylineEditor> {
    editor: E,
    engine: Engine,
    transcript: Transcript,
    show_banner: bool,
    prompt: String,
}

impl Console<RustylineEditor> {
    /// Creates a console with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(engine: Engine) -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(engine, editor))
    }
}

impl<E: LineEditor> Console<E> {
    /// Creates a console with the given editor.
    ///
    /// The demo components are registered on `engine`, replacing any
    /// components of the same names.
    pub fn with_editor(mut engine: Engine, mut editor: E) -> Self {
        let transcript = Transcript::new();
        install_demo_components(&mut engine, &transcript);
        editor.set_keywords(COMMANDS.iter().map(|c| (*c).to_string()).collect());
        Self {
            editor,
            engine,
            transcript,
            show_banner: true,
            prompt: "beat> ".to_string(),
        }
    }

    /// Disables the welcome banner.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns the engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Returns the engine mutably.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Returns the transcript the demo components write to.
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Runs the read-execute-print loop until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            print_banner();
        }

        loop {
            let line = match self.editor.read_line(&self.prompt)? {
                ReadResult::Line(line) => line,
                ReadResult::Interrupted => continue,
                ReadResult::Eof => break,
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            self.editor.add_history(trimmed);

            match self.execute_command(trimmed) {
                Ok(Reply::Text(text)) => {
                    if !text.is_empty() {
                        println!("{text}");
                    }
                }
                Ok(Reply::Quit) => break,
                Err(e) => eprintln!("\x1b[31mError: {e}\x1b[0m"),
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one console command and returns its output.
    ///
    /// Errors raised by the program being stepped are reported in the
    /// returned text; only malformed commands produce an `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command's arguments are invalid.
    pub fn execute_command(&mut self, line: &str) -> Result<Reply> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Reply::Text(String::new()));
        };
        let arg = words.next();
        debug!(command, "console command");

        let text = match command {
            "step" | "s" => {
                let result = self.engine.step();
                self.report(result)
            }
            "next" | "n" => {
                let result = self.engine.step_single();
                self.report(result)
            }
            "run" | "r" => {
                let result = self.engine.run();
                self.report(result)
            }
            "unlock" => match self.engine.unlock() {
                Ok(Some(outcome)) => self.report(Ok(outcome)),
                Ok(None) => "engine unlocked".to_string(),
                Err(e) => self.report(Err(e)),
            },
            "lock" => {
                self.engine.lock();
                "engine locked".to_string()
            }
            "reset" => {
                self.engine.reset();
                "rewound to position 0".to_string()
            }
            "vars" => self.describe_variables(),
            "stack" => self.describe_stack(),
            "list" | "l" => self.engine.current_program().to_string(),
            "trace" => self.describe_trace(parse_count(arg)?),
            "help" | "h" | "?" => HELP.to_string(),
            "quit" | "exit" | "q" => return Ok(Reply::Quit),
            other => format!("unknown command: {other} (try `help`)"),
        };

        Ok(Reply::Text(text))
    }

    /// Formats transcript output followed by a one-line status.
    fn report(&self, result: Result<StepOutcome>) -> String {
        let mut out = String::new();
        for line in self.transcript.take() {
            let _ = writeln!(out, "{line}");
        }

        match result {
            Ok(StepOutcome::Halted) => out.push_str("-- halted"),
            Ok(StepOutcome::Paused) => {
                let _ = write!(out, "-- paused at {}", self.engine.current_position());
            }
            Ok(StepOutcome::Stepped) => {
                let _ = write!(out, "-- stepped to {}", self.engine.current_position());
            }
            Ok(StepOutcome::Deferred) => out.push_str("-- deferred: engine is locked"),
            Err(e) => {
                let _ = write!(out, "\x1b[31mError: {e}\x1b[0m");
                if let Some(context) = &e.context {
                    let _ = write!(out, "\n{context}");
                }
            }
        }
        out
    }

    fn describe_variables(&self) -> String {
        let scope = self.engine.scope();
        let mut out = String::new();
        for name in scope.static_names() {
            let value = self.engine.static_value(name);
            let _ = writeln!(out, "static   {name} = {value}");
        }
        for name in scope.reactive_names() {
            if let Some(value) = scope.reactive_value(name) {
                let _ = writeln!(out, "reactive {name} = {value}");
            }
        }
        if out.is_empty() {
            out.push_str("no variables");
        }
        out.trim_end().to_string()
    }

    fn describe_stack(&self) -> String {
        let engine = &self.engine;
        let mut out = format!(
            "position {} of {} (depth {})",
            engine.current_position(),
            engine.current_program().len(),
            engine.continuation_depth()
        );
        match engine.current_instruction() {
            Some(instruction) => {
                let _ = write!(out, "\nnext: {instruction}");
            }
            None => out.push_str("\nnext: <end of program>"),
        }
        let _ = write!(out, "\ncalls: {:?}", engine.call_stack());
        for (depth, continuation) in engine.continuations().iter().enumerate().rev() {
            let _ = write!(
                out,
                "\n  [{depth}] resumes at {} of {}",
                continuation.position,
                continuation.program.len()
            );
        }
        if engine.is_locked() {
            out.push_str("\nlocked");
            if engine.has_pending_step() {
                out.push_str(" (step pending)");
            }
        }
        out
    }

    fn describe_trace(&self, count: usize) -> String {
        if !self.engine.config().trace_enabled {
            return "tracing is disabled (start with --trace)".to_string();
        }
        let records = self.engine.trace().recent(count);
        if records.is_empty() {
            return "trace is empty".to_string();
        }
        records
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_count(arg: Option<&str>) -> Result<usize> {
    match arg {
        None => Ok(10),
        Some(raw) => raw.parse().map_err(|_| {
            Error::host(format!("expected a record count, got `{raw}`"))
        }),
    }
}

const HELP: &str = "\
step   (s)   run until a component pauses or the program halts
next   (n)   execute a single instruction
run    (r)   run to completion, passing through pauses
unlock       release the lock and replay a deferred step
lock         block stepping until unlock
reset        rewind to the start of the root program
vars         show static and reactive variables
stack        show position, call stack, and continuations
list   (l)   show the active program
trace [N]    show the last N executed instructions (default 10)
help   (h)   show this help
quit   (q)   leave the console";

fn print_banner() {
    println!("\x1b[1;36mBeatline {}\x1b[0m", env!("CARGO_PKG_VERSION"));
    println!("Type `help` for commands. Use Ctrl+D to exit.\n");
    let _ = io::stdout().flush();
}
