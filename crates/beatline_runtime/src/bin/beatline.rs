//! Beatline CLI entry point.

use beatline_foundation::Value;
use beatline_machine::{
    ComponentArgs, Engine, EngineConfig, Operand, Program, ProgramBuilder, ScriptEvaluator,
    prelude,
};
use beatline_runtime::{Console, LineEditor, ReadResult, Reply, load_from_file, save_to_file};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    file: Option<PathBuf>,
    batch_mode: bool,
    show_help: bool,
    show_version: bool,
    // Debug flags
    trace: bool,
    trace_vm: bool,
    max_burst: Option<usize>,
    write_demo: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut args = args.into_iter().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "--trace" => config.trace = true,
            "--trace-vm" => config.trace_vm = true,
            "--max-burst" => {
                let raw = args.next().ok_or("--max-burst requires a value")?;
                config.max_burst = Some(
                    raw.parse()
                        .map_err(|_| format!("invalid --max-burst value: {raw}"))?,
                );
            }
            "--write-demo" => {
                let raw = args.next().ok_or("--write-demo requires a path")?;
                config.write_demo = Some(PathBuf::from(raw));
            }
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option: {flag}").into());
            }
            path => {
                if config.file.is_some() {
                    return Err(format!("only one program file may be given: {path}").into());
                }
                config.file = Some(PathBuf::from(path));
            }
        }
    }

    Ok(config)
}

fn init_logging(trace_vm: bool) {
    let fallback = if trace_vm {
        "warn,beatline_machine=trace"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("beatline {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(config.trace_vm);

    if let Some(path) = &config.write_demo {
        save_to_file(&demo_program(), path)?;
        println!("wrote demo program to {}", path.display());
        return Ok(());
    }

    let program = match &config.file {
        Some(path) => load_from_file(path)?,
        None => demo_program(),
    };

    let engine_config = EngineConfig::default()
        .with_trace_enabled(config.trace)
        .with_max_burst(config.max_burst);

    let mut engine = Engine::with_config(engine_config);
    prelude::install(&mut engine);
    engine.install_embedded_evaluator(ScriptEvaluator::new());
    engine.load_program(program);

    if config.batch_mode {
        let mut console = Console::with_editor(engine, NoInput).without_banner();
        return match console.execute_command("run")? {
            Reply::Text(text) => {
                println!("{text}");
                if console.engine().is_halted() {
                    Ok(())
                } else {
                    Err("program did not halt".into())
                }
            }
            Reply::Quit => Ok(()),
        };
    }

    let mut console = Console::new(engine)?;
    if config.file.is_some() {
        console = console.without_banner();
    }
    console.run()?;
    Ok(())
}

/// Editor used in batch mode, where no line is ever read.
struct NoInput;

impl LineEditor for NoInput {
    fn read_line(&mut self, _prompt: &str) -> beatline_foundation::Result<ReadResult> {
        Ok(ReadResult::Eof)
    }

    fn add_history(&mut self, _line: &str) {}

    fn set_keywords(&mut self, _keywords: Vec<String>) {}
}

/// A short dialogue that exercises calls and conditional jumps.
fn demo_program() -> Program {
    ProgramBuilder::new()
        // 0
        .set_static("visits", Value::Int(0))
        // 1
        .set_static("mood", Value::from("wary"))
        // 2
        .say("say", "A knock at the door.")
        // 3
        .call(8)
        // 4
        .set_static_eval("visits", "(+ $$visits 1)")
        // 5: knock again while visits < 2
        .cond_goto_eval("(or (and (< $$visits 2) 2) 6)")
        // 6
        .set_static("mood", Value::from("relieved"))
        // 7
        .goto(10)
        // 8
        .call_component(
            "log",
            ComponentArgs::new().with("text", "You open the door a crack."),
        )
        // 9
        .ret()
        // 10
        .say("say", "Nobody is there.")
        // 11
        .set_static(
            "done",
            Operand::expr(
                "==",
                vec![
                    Operand::lit(2i64),
                    Operand::expr("#VAR", vec![Operand::lit("visits")]),
                ],
            ),
        )
        .build()
}

fn print_help() {
    println!(
        "\x1b[1mBeatline\x1b[0m - Instruction-stepping dialogue engine

\x1b[1mUSAGE:\x1b[0m
    beatline [OPTIONS] [FILE]

\x1b[1mARGUMENTS:\x1b[0m
    [FILE]    MessagePack program to load (a built-in demo runs if omitted)

\x1b[1mOPTIONS:\x1b[0m
    -h, --help            Print help information
    -V, --version         Print version information
    -b, --batch           Run the program to completion and exit (no console)
    --write-demo PATH     Save the built-in demo program to PATH and exit

\x1b[1mDEBUG OPTIONS:\x1b[0m
    --trace               Record executed instructions (see `trace` command)
    --trace-vm            Log every dispatched instruction to stderr
    --max-burst N         Fail a step after N instructions

\x1b[1mEXAMPLES:\x1b[0m
    beatline                          Step through the demo program
    beatline --write-demo demo.bl     Save the demo as a program file
    beatline -b demo.bl               Run demo.bl and exit
    beatline --trace-vm -b demo.bl    Run with dispatch logging

\x1b[1mCONSOLE COMMANDS:\x1b[0m
    step, next, run, unlock, lock, reset, vars, stack, list, trace, help, quit
    Ctrl+D                Exit console"
    );
}

