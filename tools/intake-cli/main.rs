use anamnesis::prelude::*;
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Walks through an intake flow on the terminal.
///
/// Answers are read as JSON when they parse (`true`, `3`, `["Blanca"]`) and as
/// plain text otherwise. Commands: `:history`, `:back <n>`, `:jump <node>`,
/// `:reset`, `:quit`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the flow JSON file
    flow_path: String,

    /// Optional path to a JSON object of runtime feature flags
    #[arg(short, long)]
    flags: Option<String>,

    /// Optional path to a JSON object of answers known in advance
    #[arg(short, long)]
    seed: Option<String>,

    /// Resume from (and keep saving to) this session snapshot file
    #[arg(short = 'S', long)]
    snapshot: Option<String>,

    /// Only print the final answers as JSON
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let load_start = Instant::now();

    let flow = FlowDefinition::from_file(&cli.flow_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load flow: {}", e)));
    let flags = match &cli.flags {
        Some(path) => RuntimeFlags::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load flags: {}", e))),
        None => RuntimeFlags::default(),
    };
    info!(nodes = flow.len(), elapsed = ?load_start.elapsed(), "flow loaded");

    let engine = Engine::builder(flow).with_flags(flags).build();
    let mut session = open_session(engine, &cli);

    if !cli.quiet {
        println!("--- Anamnesis Intake ---");
    }

    while let Some(step) = session.presentation() {
        print_step(&step);
        let line = prompt_for_input();

        let outcome = match parse_command(&line) {
            Some(Command::Quit) => break,
            Some(Command::History) => {
                println!("{}", TranscriptFormatter::format_history(session.history()));
                continue;
            }
            Some(Command::Back(index)) => session.rewind(index),
            Some(Command::Jump(node_id)) => session.jump_to(&node_id),
            Some(Command::Reset) => {
                session.reset();
                Ok(())
            }
            None => {
                let answer = parse_answer(&line, step.node);
                session.advance(answer)
            }
        };

        if let Err(e) = outcome {
            println!("  ! {}", e);
        }
        save_snapshot(&session, &cli);
    }

    if session.is_finished() {
        if !cli.quiet {
            println!("\n--- Transcript ---");
            println!("{}", TranscriptFormatter::format_history(session.history()));
            println!("\n--- Answers ---");
            println!("{}", TranscriptFormatter::format_answers(session.answers()));
            println!("\nFinished: {:?}", session.state().finish_reason);
        } else {
            let json = serde_json::to_string_pretty(session.answers())
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode answers: {}", e)));
            println!("{}", json);
        }
    }
}

enum Command {
    Quit,
    History,
    Back(usize),
    Jump(String),
    Reset,
}

fn parse_command(line: &str) -> Option<Command> {
    let rest = line.strip_prefix(':')?;
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit" | "q"), _) => Some(Command::Quit),
        (Some("history" | "h"), _) => Some(Command::History),
        (Some("back" | "b"), Some(n)) => n.parse().ok().map(Command::Back),
        (Some("jump" | "j"), Some(id)) => Some(Command::Jump(id.to_string())),
        (Some("reset"), _) => Some(Command::Reset),
        _ => None,
    }
}

/// Turns a typed line into an answer shaped for the node.
fn parse_answer(line: &str, node: &Node) -> Value {
    if let NodeKind::YesNo { .. } = node.kind {
        match line.to_lowercase().as_str() {
            "s" | "y" | "si" | "sí" | "yes" => return Value::Bool(true),
            "n" | "no" => return Value::Bool(false),
            _ => {}
        }
    }

    // Option numbers pick options; a comma-separated list picks several.
    if !node.options.is_empty() {
        let picked: Option<Vec<Value>> = line
            .split(',')
            .map(|part| {
                let index: usize = part.trim().parse().ok()?;
                node.options.get(index.checked_sub(1)?).map(|o| o.submitted_value())
            })
            .collect();
        if let Some(mut values) = picked {
            return match node.kind {
                NodeKind::MultiSelect => Value::Array(values),
                _ if values.len() == 1 => values.remove(0),
                _ => Value::Array(values),
            };
        }
    }

    serde_json::from_str(line).unwrap_or_else(|_| Value::String(line.to_string()))
}

fn print_step(step: &Presentation<'_>) {
    println!();
    if let Some(progress) = &step.loop_progress {
        println!("[{} {}/{}]", progress.target_field, progress.iteration, progress.total);
    }
    println!("{}", step.node.text.as_deref().unwrap_or(step.node_id));
    for (i, opt) in step.node.options.iter().enumerate() {
        println!("  {}) {}", i + 1, opt.label);
    }
}

fn open_session(engine: Engine, cli: &Cli) -> Session {
    if let Some(path) = &cli.snapshot {
        if let Ok(json) = fs::read_to_string(path) {
            let state: EngineState = serde_json::from_str(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Corrupt snapshot '{}': {}", path, e)));
            return Session::resume(engine, state);
        }
    }

    match &cli.seed {
        Some(path) => {
            let json = fs::read_to_string(path)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to read seed '{}': {}", path, e)));
            let answers: Answers = serde_json::from_str(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse seed: {}", e)));
            Session::with_answers(engine, answers)
        }
        None => Session::new(engine),
    }
}

fn save_snapshot(session: &Session, cli: &Cli) {
    let Some(path) = &cli.snapshot else {
        return;
    };
    let written = serde_json::to_string(session.state())
        .map_err(|e| e.to_string())
        .and_then(|json| fs::write(path, json).map_err(|e| e.to_string()));
    if let Err(e) = written {
        tracing::warn!(path = %path, error = %e, "could not save snapshot");
    }
}

/// Prompts and reads one trimmed line. End of input quits.
fn prompt_for_input() -> String {
    let mut line = String::new();
    print!("> ");
    let _ = io::stdout().flush();

    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => ":quit".to_string(),
        Ok(_) => line.trim().to_string(),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
