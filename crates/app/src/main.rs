use std::fmt;
use std::sync::Arc;

use course_core::model::{ContactDraft, UnitId};
use course_core::Clock;
use services::{
    AppServices, Audience, CompletionOutcome, Component, Goal, RecommendationRequest,
};
use storage::{FileStore, LocalStore};
use tracing_subscriber::{fmt as tracing_fmt, prelude::*, EnvFilter};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownCommand(String),
    UnknownArg(String),
    InvalidUnitId { raw: String },
    InvalidSelection(String),
    MissingUnitId,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUnitId { raw } => write!(f, "invalid unit id: {raw}"),
            ArgsError::InvalidSelection(msg) => write!(f, "{msg}"),
            ArgsError::MissingUnitId => write!(f, "complete requires a unit id"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- list      [--query <text>] [--data <path>]");
    eprintln!("  cargo run -p app -- complete  <unit-id> [--data <path>]");
    eprintln!("  cargo run -p app -- status    [--data <path>]");
    eprintln!("  cargo run -p app -- contact   --name <n> --email <e> --role <r> [--message <m>]");
    eprintln!("  cargo run -p app -- recommend --goal <g> --audience <a> [--minutes <1-15>]");
    eprintln!("                                --component <c> [--component <c> ...]");
    eprintln!();
    eprintln!("Goals:      introduction | practice | reflection | team-communication");
    eprintln!("Audiences:  students | employees | newcomers");
    eprintln!("Components: quiz | reflection | discussion | team-talk");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --data ./presenter-data.json   (env: PRESENTER_DATA)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    List,
    Complete,
    Status,
    Contact,
    Recommend,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "list" => Some(Self::List),
            "complete" => Some(Self::Complete),
            "status" => Some(Self::Status),
            "contact" => Some(Self::Contact),
            "recommend" => Some(Self::Recommend),
            _ => None,
        }
    }
}

fn default_data_path() -> String {
    std::env::var("PRESENTER_DATA").unwrap_or_else(|_| "./presenter-data.json".into())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => match Command::from_arg(first) {
            Some(cmd) => cmd,
            None => {
                print_usage();
                return Err(ArgsError::UnknownCommand(first.to_string()).into());
            }
        },
    };
    argv.remove(0);

    let mut data_path = default_data_path();
    let mut query = String::new();
    let mut unit_id: Option<UnitId> = None;
    let mut name = String::new();
    let mut email = String::new();
    let mut role = String::new();
    let mut message = String::new();
    let mut goal: Option<Goal> = None;
    let mut audience: Option<Audience> = None;
    let mut minutes: u32 = 3;
    let mut components: Vec<Component> = Vec::new();

    let mut args = argv.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data" => data_path = require_value(&mut args, "--data")?,
            "--query" => query = require_value(&mut args, "--query")?,
            "--name" => name = require_value(&mut args, "--name")?,
            "--email" => email = require_value(&mut args, "--email")?,
            "--role" => role = require_value(&mut args, "--role")?,
            "--message" => message = require_value(&mut args, "--message")?,
            "--goal" => {
                let raw = require_value(&mut args, "--goal")?;
                goal = Some(
                    raw.parse::<Goal>()
                        .map_err(|e| ArgsError::InvalidSelection(e.to_string()))?,
                );
            }
            "--audience" => {
                let raw = require_value(&mut args, "--audience")?;
                audience = Some(
                    raw.parse::<Audience>()
                        .map_err(|e| ArgsError::InvalidSelection(e.to_string()))?,
                );
            }
            "--minutes" => {
                let raw = require_value(&mut args, "--minutes")?;
                minutes = raw
                    .parse()
                    .map_err(|_| ArgsError::InvalidSelection(format!("invalid minutes: {raw}")))?;
            }
            "--component" => {
                let raw = require_value(&mut args, "--component")?;
                components.push(
                    raw.parse::<Component>()
                        .map_err(|e| ArgsError::InvalidSelection(e.to_string()))?,
                );
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other if cmd == Command::Complete && unit_id.is_none() && !other.starts_with("--") => {
                unit_id = Some(other.parse().map_err(|_| ArgsError::InvalidUnitId {
                    raw: other.to_string(),
                })?);
            }
            other => return Err(ArgsError::UnknownArg(other.to_string()).into()),
        }
    }

    // A CLI host has no LMS frame tree; the presenter runs standalone with
    // the file-backed store, exactly like the no-LMS browser fallback.
    let store = Arc::new(FileStore::open(&data_path)?) as Arc<dyn LocalStore>;
    let services = AppServices::start(None, store, Clock::default_clock());
    println!("{}", services.mode().badge());

    match cmd {
        Command::List => {
            let view = services.progress.progress();
            for unit in services.catalog.filter(&query) {
                let done = if services.progress.is_completed(unit.id()) {
                    "[x]"
                } else {
                    "[ ]"
                };
                println!("{done} {:>2}  {}: {}", unit.id(), unit.title(), unit.description());
            }
            println!("progress: {}/{}", view.completed, view.total);
        }
        Command::Complete => {
            let id = unit_id.ok_or(ArgsError::MissingUnitId)?;
            match services.progress.mark_completed(id)? {
                CompletionOutcome::Newly { all_complete: true } => {
                    println!("unit {id} completed, and that was the last one. Course complete!");
                }
                CompletionOutcome::Newly { all_complete: false } => {
                    let view = services.progress.progress();
                    println!("unit {id} completed ({}/{})", view.completed, view.total);
                }
                CompletionOutcome::AlreadyCompleted => {
                    println!("unit {id} was already completed");
                }
            }
        }
        Command::Status => {
            let view = services.progress.progress();
            println!("completed {}/{} units", view.completed, view.total);
            if view.is_complete {
                println!("lesson status: completed");
            }
        }
        Command::Contact => {
            let submission = services.contact.submit(ContactDraft {
                full_name: name,
                email,
                role,
                message,
            })?;
            println!("thanks, {}! Your form was sent.", submission.full_name());
        }
        Command::Recommend => {
            let request = RecommendationRequest {
                goal,
                audience,
                minutes,
                components,
            };
            let plan = services.recommendations.build(&request)?;
            println!("{}", plan.text);
        }
    }

    services.shutdown();
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
