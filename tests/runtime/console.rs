//! Integration tests for the stepping console
//!
//! Drives a console through `execute_command` and a scripted editor.

use beatline_foundation::{Result, Value};
use beatline_machine::{Engine, EngineConfig, ProgramBuilder};
use beatline_runtime::{COMMANDS, Console, LineEditor, ReadResult, Reply, Transcript};

struct Scripted(Vec<&'static str>);

impl LineEditor for Scripted {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        if self.0.is_empty() {
            Ok(ReadResult::Eof)
        } else {
            Ok(ReadResult::Line(self.0.remove(0).to_string()))
        }
    }

    fn add_history(&mut self, _line: &str) {}

    fn set_keywords(&mut self, _keywords: Vec<String>) {}
}

fn console(engine: Engine) -> Console<Scripted> {
    Console::with_editor(engine, Scripted(Vec::new())).without_banner()
}

fn output(console: &mut Console<Scripted>, command: &str) -> String {
    match console.execute_command(command).unwrap() {
        Reply::Text(text) => text,
        Reply::Quit => "<quit>".to_string(),
    }
}

#[test]
fn every_listed_command_is_understood() {
    let mut console = console(Engine::new());
    for command in COMMANDS {
        let out = output(&mut console, command);
        assert!(!out.starts_with("unknown command"), "{command}: {out}");
    }
}

#[test]
fn aliases_and_quit() {
    let mut engine = Engine::new();
    engine.load_program(ProgramBuilder::new().say("log", "hi").build());
    let mut console = console(engine);

    assert_eq!(output(&mut console, "n"), "hi\n-- stepped to 1");
    assert_eq!(output(&mut console, "q"), "<quit>");
    assert_eq!(output(&mut console, "exit"), "<quit>");
}

#[test]
fn blank_command_is_silent() {
    let mut console = console(Engine::new());
    assert_eq!(output(&mut console, "   "), "");
}

#[test]
fn list_shows_the_active_program() {
    let mut engine = Engine::new();
    engine.load_program(ProgramBuilder::new().goto(0).ret().build());
    let mut console = console(engine);

    let out = output(&mut console, "list");
    assert!(out.contains("GOTO 0"));
    assert!(out.contains("RETURN"));
}

#[test]
fn max_burst_errors_are_reported_in_place() {
    let mut engine = Engine::with_config(EngineConfig::default().with_max_burst(Some(10)));
    engine.load_program(ProgramBuilder::new().goto(0).build());
    let mut console = console(engine);

    let out = output(&mut console, "run");
    assert!(out.contains("limit exceeded"));
    assert_eq!(console.engine().current_position(), 0);
}

#[test]
fn host_writes_reach_vars() {
    let mut console = console(Engine::new());
    console.engine_mut().set_static_value("door", "open");

    assert_eq!(output(&mut console, "vars"), "static   door = open");
}

#[test]
fn transcript_is_drained_per_command() {
    let mut engine = Engine::new();
    engine.load_program(
        ProgramBuilder::new()
            .say("log", "a")
            .say("log", "b")
            .build(),
    );
    let mut console = console(engine);
    console.execute_command("run").unwrap();

    assert!(console.transcript().is_empty());
}

#[test]
fn standalone_transcript() {
    let transcript = Transcript::new();
    let copy = transcript.clone();
    copy.push("line");

    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript.take(), vec!["line".to_string()]);
    assert!(transcript.is_empty());
}

#[test]
fn session_runs_until_eof() {
    let mut engine = Engine::new();
    engine.load_program(ProgramBuilder::new().set_static("seen", Value::Bool(true)).build());
    let mut console =
        Console::with_editor(engine, Scripted(vec!["run", "vars"])).without_banner();

    console.run().unwrap();
    assert_eq!(console.engine().static_value("seen"), Value::Bool(true));
}
