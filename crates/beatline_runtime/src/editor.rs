//! Terminal input for the stepping console.
//!
//! The console asks for one command at a time, so everything it needs from
//! the terminal fits in [`LineEditor`]. Tests drive the console with a
//! scripted implementation instead of a real terminal.

use std::borrow::Cow;

use beatline_foundation::{Error, ErrorKind, Result};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator};

const HISTORY_LIMIT: usize = 500;

/// One attempt to read a console command.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadResult {
    /// The user entered a line.
    Line(String),
    /// Ctrl+C; the console discards the line and prompts again.
    Interrupted,
    /// Ctrl+D or closed input; the console exits.
    Eof,
}

/// Source of console commands.
pub trait LineEditor {
    /// Prompts for and reads one line.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the terminal cannot be read.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Remembers a command for history navigation.
    fn add_history(&mut self, line: &str);

    /// Replaces the command names offered by tab completion.
    fn set_keywords(&mut self, keywords: Vec<String>);
}

// =============================================================================
// rustyline helper
// =============================================================================

#[derive(Helper, Completer, Hinter, Validator)]
struct ConsoleHelper {
    #[rustyline(Completer)]
    commands: CommandCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
}

impl Highlighter for ConsoleHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;36m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[90m{hint}\x1b[0m"))
    }
}

/// Completes the command word; arguments are left alone.
struct CommandCompleter {
    commands: Vec<String>,
}

impl CommandCompleter {
    fn matching(&self, prefix: &str) -> Vec<Pair> {
        self.commands
            .iter()
            .filter(|command| command.starts_with(prefix))
            .map(|command| Pair {
                display: command.clone(),
                replacement: command.clone(),
            })
            .collect()
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let typed = &line[..pos];
        if typed.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        Ok((0, self.matching(typed)))
    }
}

// =============================================================================
// RustylineEditor
// =============================================================================

/// Interactive terminal editor with history, hints and command completion.
pub struct RustylineEditor {
    inner: Editor<ConsoleHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Opens the terminal.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if rustyline cannot set up the terminal.
    pub fn new() -> Result<Self> {
        let internal = |e: ReadlineError| Error::new(ErrorKind::Internal(e.to_string()));

        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(HISTORY_LIMIT)
            .map_err(internal)?
            .build();

        let mut inner = Editor::with_config(config).map_err(internal)?;
        inner.set_helper(Some(ConsoleHelper {
            commands: CommandCompleter {
                commands: Vec::new(),
            },
            hinter: HistoryHinter::new(),
        }));

        Ok(Self { inner })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.inner.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::new(ErrorKind::IoError(format!(
                "failed to read console input: {e}"
            )))),
        }
    }

    fn add_history(&mut self, line: &str) {
        // A rejected entry (duplicate or blank) is not an error for the console.
        let _ = self.inner.add_history_entry(line);
    }

    fn set_keywords(&mut self, keywords: Vec<String>) {
        if let Some(helper) = self.inner.helper_mut() {
            helper.commands.commands = keywords;
        }
    }
}
