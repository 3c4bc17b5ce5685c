//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including configuration loading, database management, parameter parsing
//! and output formatting.

use crate::error::CliError;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use protege::database::resolve_data_dir;
use protege::{Config, ConfigBuilder, Database, Row, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
#[allow(dead_code)] // Fields used via pattern matching in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,

    /// Additional configuration file.
    pub config: Option<PathBuf>,
}

/// Output format for row-producing commands.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated table with a header line
    Table,
    /// JSON array of objects
    Json,
}

/// Resolve the data directory from global options.
///
/// Priority: `--data-dir` (or `PROTEGE_DATA_DIR`) > `~/.protege`.
pub fn data_dir(global: &GlobalOptions) -> Result<PathBuf, CliError> {
    resolve_data_dir(global.data_dir.clone()).map_err(|e| CliError::Config(e.to_string()))
}

/// Load hierarchical configuration.
///
/// Configuration is merged from multiple sources with precedence:
/// 1. Environment variables
/// 2. `--config` file
/// 3. `<data_dir>/config.yaml`
/// 4. Built-in defaults (lowest priority)
pub fn load_configuration(global: &GlobalOptions, data_dir: &Path) -> Result<Config, CliError> {
    let mut builder = ConfigBuilder::new().with_data_dir(data_dir);
    if let Some(ref path) = global.config {
        builder = builder.with_config_file(path);
    }

    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

/// Create an uninitialized database over the configured file store.
pub fn create_database(config: &Config, data_dir: &Path) -> Result<Database, CliError> {
    let store = config.file_store(data_dir)?;
    Ok(Database::new(config.database_config(), Arc::new(store)))
}

/// Resolve configuration and create a database without loading it.
///
/// Used by the commands that must still work when the stored snapshot is
/// unreadable.
pub fn load_database(global: &GlobalOptions) -> Result<Database, CliError> {
    let data_dir = data_dir(global)?;
    let config = load_configuration(global, &data_dir)?;
    create_database(&config, &data_dir)
}

/// Resolve configuration and open an initialized database.
pub fn open_database(global: &GlobalOptions) -> Result<Database, CliError> {
    let mut db = load_database(global)?;
    db.initialize()?;
    Ok(db)
}

/// Wait for pending saves before the process exits.
pub fn finish(db: &Database) -> Result<(), CliError> {
    db.flush().map_err(CliError::from)
}

/// Parse a positional SQL parameter from its command-line form.
///
/// `null` is NULL, integers and finite reals keep their numeric type, and
/// anything else is text. A `text:` prefix forces text.
pub fn parse_param(raw: &str) -> Value {
    if let Some(text) = raw.strip_prefix("text:") {
        return Value::Text(text.to_string());
    }
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Integer(int);
    }
    match raw.parse::<f64>() {
        Ok(real) if real.is_finite() => Value::Real(real),
        _ => Value::Text(raw.to_string()),
    }
}

/// Parse every `--param` value.
pub fn parse_params(raw: &[String]) -> Vec<Value> {
    raw.iter().map(|p| parse_param(p)).collect()
}

/// Render a value for table output.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(t) => t.clone(),
        Value::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

/// Render rows in the requested format.
pub fn format_rows(rows: &[Row], format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(rows)
            .map_err(|e| CliError::InvalidArguments(format!("cannot encode rows: {e}"))),
        OutputFormat::Table => {
            let Some(first) = rows.first() else {
                return Ok(String::new());
            };
            let mut lines = vec![first.columns().join("\t")];
            lines.extend(rows.iter().map(|row| {
                row.values()
                    .iter()
                    .map(format_value)
                    .collect::<Vec<_>>()
                    .join("\t")
            }));
            Ok(lines.join("\n"))
        }
    }
}

/// Format a timestamp for display.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Shorten a path for display.
///
/// If the path is within the home directory, show it as ~/...
/// Otherwise, show the full path.
pub fn shorten_path(path: &Path) -> String {
    if let Some(home) = home::home_dir() {
        if let Ok(relative) = path.strip_prefix(&home) {
            return format!("~/{}", relative.display());
        }
    }
    path.display().to_string()
}
