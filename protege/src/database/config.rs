//! Database service configuration.
//!
//! This module provides the settings the database service needs at
//! runtime, along with data directory resolution for on-disk stores.

use std::path::PathBuf;

use crate::error::{Error, Result};

use super::autosave::AutosavePolicy;
use super::schema::SchemaSource;

/// Default database namespace of a [`FileStore`](crate::store::FileStore).
pub const DEFAULT_DATABASE_NAME: &str = "ProtegeDB";

/// Default object store inside the namespace.
pub const DEFAULT_OBJECT_STORE: &str = "database";

/// Default slot holding the current snapshot.
pub const DEFAULT_SLOT: &str = "protege-lecture";

/// Default prefix of backup filenames.
pub const DEFAULT_BACKUP_PREFIX: &str = "protege-backup";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PROTEGE_DATA_DIR";

/// Configuration for a [`Database`](super::Database).
///
/// # Examples
///
/// ```
/// use protege::database::{DatabaseConfig, SchemaSource};
///
/// let config = DatabaseConfig::default()
///     .with_slot("staging")
///     .with_schema(SchemaSource::Inline("CREATE TABLE notes (body TEXT)".into()))
///     .with_foreign_keys(false);
///
/// assert_eq!(config.slot, "staging");
/// assert!(!config.foreign_keys);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Store slot the snapshot lives under.
    pub slot: String,
    /// Whether foreign key constraints are enforced.
    pub foreign_keys: bool,
    /// Retry policy of the auto-save queue.
    pub autosave: AutosavePolicy,
    /// Schema applied on first-run bootstrap.
    pub schema: SchemaSource,
    /// Prefix of suggested backup filenames.
    pub backup_prefix: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            slot: DEFAULT_SLOT.to_string(),
            foreign_keys: true,
            autosave: AutosavePolicy::default(),
            schema: SchemaSource::Embedded,
            backup_prefix: DEFAULT_BACKUP_PREFIX.to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Sets the store slot.
    #[must_use]
    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }

    /// Enables or disables foreign key enforcement.
    #[must_use]
    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Sets the auto-save retry policy.
    #[must_use]
    pub fn with_autosave(mut self, policy: AutosavePolicy) -> Self {
        self.autosave = policy;
        self
    }

    /// Sets the bootstrap schema.
    #[must_use]
    pub fn with_schema(mut self, schema: SchemaSource) -> Self {
        self.schema = schema;
        self
    }

    /// Sets the backup filename prefix.
    #[must_use]
    pub fn with_backup_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.backup_prefix = prefix.into();
        self
    }
}

/// Returns the default data directory for protege.
///
/// The default directory is `~/.protege` on Unix-like systems and
/// `%USERPROFILE%\.protege` on Windows.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
///
/// # Examples
///
/// ```no_run
/// use protege::database::default_data_dir;
///
/// let data_dir = default_data_dir().unwrap();
/// println!("Data directory: {}", data_dir.display());
/// ```
pub fn default_data_dir() -> Result<PathBuf> {
    home::home_dir()
        .map(|home| home.join(".protege"))
        .ok_or_else(|| Error::Validation {
            field: "home_directory".into(),
            message: "Cannot determine home directory".into(),
        })
}

/// Resolves the data directory.
///
/// The resolution order is:
/// 1. `explicit`, when given (the CLI `--data-dir` flag)
/// 2. `$PROTEGE_DATA_DIR`
/// 3. `~/.protege`
///
/// # Errors
///
/// Returns an error if neither an explicit directory nor the environment
/// variable is set and the home directory cannot be determined.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    match std::env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => default_data_dir(),
    }
}
