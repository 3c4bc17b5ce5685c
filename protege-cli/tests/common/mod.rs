//! Common test utilities for CLI integration tests.
//!
//! This module provides an isolated data directory per test and helpers
//! for running `protege` against it.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Environment variables that would leak host configuration into a test.
const ISOLATED_VARS: [&str; 10] = [
    "PROTEGE_DATA_DIR",
    "PROTEGE_LOG_MODE",
    "PROTEGE_OUTPUT_FORMAT",
    "PROTEGE_DATABASE_NAME",
    "PROTEGE_OBJECT_STORE",
    "PROTEGE_SLOT",
    "PROTEGE_SCHEMA_PATH",
    "PROTEGE_FOREIGN_KEYS",
    "PROTEGE_AUTOSAVE_RETRIES",
    "PROTEGE_BACKUP_PREFIX",
];

/// Test environment with isolated data directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
    /// Path to the protege data directory
    pub data_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    ///
    /// The data directory is not created; protege creates it on first use.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        let data_dir = temp_path.join("protege-data");

        Self {
            temp_dir,
            temp_path,
            data_dir,
        }
    }

    /// Get a command builder without `--data-dir`.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("protege").expect("Failed to find protege binary");
        for var in ISOLATED_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Get a command builder with the data directory pre-configured.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--data-dir").arg(&self.data_dir);
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Path of the stored snapshot for the default layout.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir
            .join("ProtegeDB")
            .join("database")
            .join("protege-lecture.sqlite")
    }

    /// Run a command and return its stdout, asserting success.
    pub fn run_ok(&self, args: &[&str]) -> String {
        let output = self
            .command()
            .args(args)
            .output()
            .expect("Failed to run protege");

        assert!(
            output.status.success(),
            "protege {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).expect("Invalid UTF-8 in output")
    }

    /// Run a query and parse its JSON output.
    pub fn query_json(&self, sql: &str, params: &[&str]) -> serde_json::Value {
        let mut args = vec!["query", sql, "--format", "json"];
        for param in params {
            args.push("--param");
            args.push(param);
        }
        let stdout = self.run_ok(&args);
        if stdout.trim().is_empty() {
            return serde_json::Value::Array(Vec::new());
        }
        serde_json::from_str(&stdout).expect("query output is not JSON")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
