//! Windlass CLI - resolve actionable tasks in outline task graphs.

use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;
use windlass::cli::{Cli, Commands, GraphCommands};
use windlass::commands::{self, Output};
use windlass::config::Config;

fn main() {
    // Logs go to stderr so stdout stays machine-parseable. Level comes
    // from WL_LOG (tracing env-filter syntax), default warn.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("WL_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let human = cli.human_readable;

    if let Err(e) = run_command(cli) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn run_command(cli: Cli) -> Result<(), windlass::Error> {
    let human = cli.human_readable;
    let now = resolve_now(cli.now.as_deref())?;
    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Ready { tag } => {
            let snapshot = require_snapshot(cli.snapshot)?;
            let result = commands::ready(&snapshot, &config, tag.as_deref(), now)?;
            output(&result, human);
        }
        Commands::Blocked { tag } => {
            let snapshot = require_snapshot(cli.snapshot)?;
            let result = commands::blocked(&snapshot, &config, tag.as_deref(), now)?;
            output(&result, human);
        }
        Commands::Rank { tag } => {
            let snapshot = require_snapshot(cli.snapshot)?;
            let result = commands::rank(&snapshot, &config, tag.as_deref(), now)?;
            output(&result, human);
        }
        Commands::Score { id } => {
            let snapshot = require_snapshot(cli.snapshot)?;
            let result = commands::score_task(&snapshot, &config, &id, now)?;
            output(&result, human);
        }
        Commands::Next { id } => {
            let snapshot = require_snapshot(cli.snapshot)?;
            let result = commands::next_occurrence(&snapshot, &config, &id, now)?;
            output(&result, human);
        }
        Commands::Show { id } => {
            let snapshot = require_snapshot(cli.snapshot)?;
            let result = commands::show(&snapshot, &config, &id, now)?;
            output(&result, human);
        }
        Commands::Graph { command } => match command {
            GraphCommands::Components => {
                let snapshot = require_snapshot(cli.snapshot)?;
                let result = commands::graph_components(&snapshot, &config, now)?;
                output(&result, human);
            }
        },
        Commands::BuildInfo => {
            output(&commands::build_info(), human);
        }
    }

    Ok(())
}

/// Reference time: the --now flag when given, wall clock otherwise.
fn resolve_now(flag: Option<&str>) -> Result<DateTime<Utc>, windlass::Error> {
    match flag {
        None => Ok(Utc::now()),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                windlass::Error::InvalidInput(format!("--now must be RFC 3339: {}", e))
            }),
    }
}

fn require_snapshot(path: Option<PathBuf>) -> Result<PathBuf, windlass::Error> {
    path.ok_or(windlass::Error::NoSnapshot)
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
