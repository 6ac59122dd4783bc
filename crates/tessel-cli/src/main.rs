//! Tessel CLI
//!
//! Usage:
//!   tessel cross a.csv b.csv            - Cross product of two CSV operands
//!   tessel compare '<=' a.csv b.csv     - Compare two CSV operands
//!   tessel load a.csv                   - Load and print one operand
//!   tessel --raw load a.bin             - Operands are raw (bincode) values
//!   tessel --json cross a.csv b.csv     - Print the result as JSON

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tessel_eval::prelude::*;
use tracing::{debug, Level};

#[derive(Parser, Debug)]
#[command(name = "tessel")]
#[command(author = "Tessel Authors")]
#[command(version = "0.1.0")]
#[command(about = "Evaluate Tessel primitives over file operands", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Read operands with file_read (raw values) instead of file_read_csv
    #[arg(long, global = true)]
    raw: bool,

    /// Print the result as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Poll every operand on one task instead of spawning
    #[arg(long, global = true)]
    inline: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cross product of two operands
    Cross { lhs: PathBuf, rhs: PathBuf },
    /// Compare two operands with one of >, >=, <, <=
    Compare { op: String, lhs: PathBuf, rhs: PathBuf },
    /// Load a single operand
    Load { file: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match run(&args).await.and_then(|value| print_value(&value, args.json)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<Argument, String> {
    let registry = Registry::builtin();
    let loader = if args.raw { "file_read" } else { "file_read_csv" };
    let load = |path: &Path| -> Result<Argument, String> {
        registry
            .create(loader, vec![Argument::string(path.to_string_lossy())])
            .map(Argument::Expr)
            .map_err(|e| e.to_string())
    };

    let root = match &args.command {
        Command::Cross { lhs, rhs } => registry.create("cross", vec![load(lhs)?, load(rhs)?]),
        Command::Compare { op, lhs, rhs } => {
            let op = CompareOp::from_symbol(op).ok_or_else(|| format!("unknown comparison '{}' (expected >, >=, <, <=)", op))?;
            registry.create(op.name(), vec![load(lhs)?, load(rhs)?])
        }
        Command::Load { file } => registry.create(loader, vec![Argument::string(file.to_string_lossy())]),
    }
    .map_err(|e| e.to_string())?;

    let schedule = if args.inline { Schedule::Inline } else { Schedule::Spawn };
    debug!(root = root.name(), ?schedule, "evaluating");
    root.evaluate(&Context::empty().with_schedule(schedule)).await.map_err(|e| e.to_string())
}

fn print_value(value: &Argument, json: bool) -> Result<(), String> {
    println!("{}", render(value, json)?);
    Ok(())
}

fn render(value: &Argument, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string(value).map_err(|e| e.to_string());
    }
    Ok(match value {
        Argument::Tensor(t) => format!("{} {}", format!("{:?}", t.dimensions()).dimmed(), t.to_string().green()),
        other => other.to_string().green().to_string(),
    })
}
