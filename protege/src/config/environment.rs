//! Environment variable handling for configuration overrides.
//!
//! This module provides support for `PROTEGE_*` environment variables that
//! override configuration file values.

use std::env;
use std::path::PathBuf;

use crate::config::schema::Config;
use crate::error::{Error, Result};

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use protege::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// Reads the `PROTEGE_*` variables and applies them with higher
    /// precedence than file-based configs. Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value
    /// (e.g., non-numeric retry count, invalid boolean).
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Some(name) = Self::var("PROTEGE_DATABASE_NAME") {
            config.store.get_or_insert_with(Default::default).database_name = Some(name);
        }

        if let Some(object_store) = Self::var("PROTEGE_OBJECT_STORE") {
            config.store.get_or_insert_with(Default::default).object_store = Some(object_store);
        }

        if let Some(slot) = Self::var("PROTEGE_SLOT") {
            config.store.get_or_insert_with(Default::default).slot = Some(slot);
        }

        if let Some(path) = Self::var("PROTEGE_SCHEMA_PATH") {
            config.schema_path = Some(PathBuf::from(path));
        }

        if let Some(val) = Self::var("PROTEGE_FOREIGN_KEYS") {
            config.foreign_keys = Some(Self::parse_bool("PROTEGE_FOREIGN_KEYS", &val)?);
        }

        if let Some(retries) = Self::var("PROTEGE_AUTOSAVE_RETRIES") {
            let retries = retries.parse().map_err(|_| Error::Validation {
                field: "PROTEGE_AUTOSAVE_RETRIES".into(),
                message: "Must be a non-negative integer".into(),
            })?;
            config.autosave.get_or_insert_with(Default::default).max_retries = Some(retries);
        }

        if let Some(backoff) = Self::var("PROTEGE_AUTOSAVE_BACKOFF_MS") {
            let backoff = backoff.parse().map_err(|_| Error::Validation {
                field: "PROTEGE_AUTOSAVE_BACKOFF_MS".into(),
                message: "Must be a positive integer".into(),
            })?;
            config
                .autosave
                .get_or_insert_with(Default::default)
                .initial_backoff_ms = Some(backoff);
        }

        if let Some(prefix) = Self::var("PROTEGE_BACKUP_PREFIX") {
            config.backup_prefix = Some(prefix);
        }

        Ok(())
    }

    fn var(name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.is_empty())
    }

    /// Parse boolean from string.
    ///
    /// Accepts: true/false, 1/0, yes/no, on/off (case-insensitive).
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }
}
