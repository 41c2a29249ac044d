//! Common test utilities for windlass integration tests.
//!
//! Provides `TestEnv` for isolated test environments: each test writes its
//! snapshot fixtures into a private temp directory and drives the compiled
//! `wl` binary against them.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
pub use tempfile::TempDir;

/// Fixed reference time passed to every command via `--now`, so assertions
/// never depend on the wall clock.
pub const NOW: &str = "2026-03-02T12:00:00Z";

/// A test environment with an isolated snapshot directory.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Write a snapshot fixture and return its path.
    pub fn write_snapshot(&self, name: &str, content: serde_json::Value) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content.to_string()).unwrap();
        path
    }

    /// Write a config file and return its path.
    pub fn write_config(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Get a Command for the wl binary, pinned to the fixed reference time.
    pub fn wl(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_wl"));
        cmd.current_dir(self.dir.path());
        cmd.args(["--now", NOW]);
        cmd
    }

    /// Same as [`TestEnv::wl`] but without the pinned reference time.
    pub fn wl_realtime(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_wl"));
        cmd.current_dir(self.dir.path());
        cmd
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
