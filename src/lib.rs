//! Windlass - a next-action resolver for outline task graphs.
//!
//! This library provides the core functionality for the `wl` CLI tool:
//! given a snapshot of task nodes from an outline-style document store, it
//! answers which tasks are actionable right now, how they rank, and when a
//! recurring task comes around next.
//!
//! The core is organized as:
//! - [`store`] - the collaborator boundary: raw `TaskNode`s, the `NodeSource`
//!   trait, and the schema-aware snapshot reader
//! - [`models`] - normalized task records, the cycle detector, the scoring
//!   engine, and the recurrence engine
//! - [`resolver`] - the eligibility resolver composing hierarchy, dependency
//!   evaluation, and cycle analysis, plus its evaluation cache
//! - [`config`] - the field-name schema and tuning knobs, loaded from TOML

pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod resolver;
pub mod store;

/// Library-level error type for Windlass operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("No snapshot given: pass --snapshot or set WL_SNAPSHOT")]
    NoSnapshot,

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Windlass operations.
pub type Result<T> = std::result::Result<T, Error>;
