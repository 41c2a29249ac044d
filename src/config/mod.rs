//! Configuration for Windlass.
//!
//! A single TOML file (conventionally `windlass.toml`) carries three
//! sections, all optional:
//!
//! ```toml
//! [schema]        # property-key mapping, see `FieldSchema`
//! task_tag = "task"
//!
//! [weights]       # scoring weights, see `ScoreWeights`
//! graph_aware = true
//!
//! [resolver]      # resolver behavior
//! surface_reviewed = true
//! cache_ttl_ms = 1500
//! ```
//!
//! Precedence: `--config` flag > `WL_CONFIG` env var > built-in defaults.

pub mod schema;

pub use schema::{FieldSchema, StatusLabels};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::Result;
use crate::models::score::ScoreWeights;

/// Behavior knobs for the eligibility resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Surface review-enabled tasks even when blocking reasons exist.
    pub surface_reviewed: bool,

    /// Cache entry lifetime in milliseconds.
    pub cache_ttl_ms: u64,

    /// Width of the wall-clock bucket in the cache key, in milliseconds.
    pub cache_bucket_ms: u64,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            surface_reviewed: false,
            cache_ttl_ms: 1500,
            cache_bucket_ms: 1500,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema: FieldSchema,
    pub weights: ScoreWeights,
    pub resolver: ResolverOptions,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Load from the given path, or fall back to defaults when none is set.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
