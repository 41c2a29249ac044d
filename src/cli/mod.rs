//! CLI argument definitions for Windlass.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Windlass - a next-action resolver for outline task graphs.
///
/// Point it at a snapshot export of your store, then `wl ready` to find
/// work.
#[derive(Parser, Debug)]
#[command(name = "wl")]
#[command(author, version, about = "Resolve actionable tasks in outline task graphs", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Snapshot file to resolve against (a JSON export of the store).
    /// Can also be set via the WL_SNAPSHOT environment variable.
    #[arg(short = 's', long = "snapshot", global = true, env = "WL_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Configuration file (TOML). Defaults are used when absent.
    /// Can also be set via the WL_CONFIG environment variable.
    #[arg(long = "config", global = true, env = "WL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reference time as RFC 3339, for deterministic runs (default: now)
    #[arg(long = "now", global = true)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show actionable tasks, best-ranked first
    Ready {
        /// Resolve a different tag than the configured task tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show blocked tasks with their blocking reasons
    Blocked {
        /// Resolve a different tag than the configured task tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Rank every actionable task with its score
    Rank {
        /// Resolve a different tag than the configured task tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show the score breakdown for one task
    Score {
        /// Task id
        id: String,
    },

    /// Compute the next occurrence of a recurring task, as if it were
    /// completed at the reference time
    Next {
        /// Task id
        id: String,
    },

    /// Show one task's normalized record and eligibility verdict
    Show {
        /// Task id
        id: String,
    },

    /// Graph analysis commands
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },

    /// Show build provenance
    BuildInfo,
}

/// Graph subcommands
#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// Strongly-connected components of the dependency graph
    Components,
}

/// Crate version baked in at compile time.
pub fn package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Git commit baked in by the build script.
pub fn git_commit() -> &'static str {
    env!("WL_GIT_COMMIT")
}

/// Build timestamp baked in by the build script.
pub fn build_timestamp() -> &'static str {
    env!("WL_BUILD_TIMESTAMP")
}
