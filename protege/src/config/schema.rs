//! Configuration schema definitions.
//!
//! Every field is optional so that partial files can be layered; the
//! accessors on [`Config`] fill in the built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::database::{
    AutosavePolicy, DatabaseConfig, SchemaSource, DEFAULT_BACKUP_PREFIX, DEFAULT_DATABASE_NAME,
    DEFAULT_OBJECT_STORE, DEFAULT_SLOT,
};
use crate::error::Result;
use crate::store::FileStore;

/// Complete configuration structure.
///
/// # Examples
///
/// ```
/// use protege::config::Config;
///
/// let config: Config = serde_yaml::from_str("store:\n  slot: staging\nforeign_keys: false\n").unwrap();
/// assert_eq!(config.slot(), "staging");
/// assert_eq!(config.database_name(), "ProtegeDB");
/// assert!(!config.database_config().foreign_keys);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where snapshots are stored.
    pub store: Option<StoreConfig>,

    /// Auto-save retry settings.
    pub autosave: Option<AutosaveConfig>,

    /// SQL file applied on first-run bootstrap instead of the embedded schema.
    pub schema_path: Option<PathBuf>,

    /// Enforce foreign key constraints.
    pub foreign_keys: Option<bool>,

    /// Prefix of backup filenames.
    pub backup_prefix: Option<String>,
}

/// Snapshot store location.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Namespace directory under the data directory.
    pub database_name: Option<String>,
    /// Object store directory inside the namespace.
    pub object_store: Option<String>,
    /// Slot holding the current snapshot.
    pub slot: Option<String>,
}

/// Auto-save retry settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AutosaveConfig {
    /// Retries after a failed write.
    pub max_retries: Option<u32>,
    /// First retry delay in milliseconds.
    pub initial_backoff_ms: Option<u64>,
    /// Retry delay cap in milliseconds.
    pub max_backoff_ms: Option<u64>,
}

impl Config {
    /// Store namespace, defaulting to `ProtegeDB`.
    #[must_use]
    pub fn database_name(&self) -> &str {
        self.store
            .as_ref()
            .and_then(|s| s.database_name.as_deref())
            .unwrap_or(DEFAULT_DATABASE_NAME)
    }

    /// Object store, defaulting to `database`.
    #[must_use]
    pub fn object_store(&self) -> &str {
        self.store
            .as_ref()
            .and_then(|s| s.object_store.as_deref())
            .unwrap_or(DEFAULT_OBJECT_STORE)
    }

    /// Snapshot slot, defaulting to `protege-lecture`.
    #[must_use]
    pub fn slot(&self) -> &str {
        self.store
            .as_ref()
            .and_then(|s| s.slot.as_deref())
            .unwrap_or(DEFAULT_SLOT)
    }

    /// The auto-save policy, with unset fields taken from the default policy.
    #[must_use]
    pub fn autosave_policy(&self) -> AutosavePolicy {
        let defaults = AutosavePolicy::default();
        let Some(autosave) = &self.autosave else {
            return defaults;
        };

        AutosavePolicy {
            max_retries: autosave.max_retries.unwrap_or(defaults.max_retries),
            initial_backoff: autosave
                .initial_backoff_ms
                .map_or(defaults.initial_backoff, Duration::from_millis),
            max_backoff: autosave
                .max_backoff_ms
                .map_or(defaults.max_backoff, Duration::from_millis),
        }
    }

    /// Builds the database service configuration.
    #[must_use]
    pub fn database_config(&self) -> DatabaseConfig {
        let schema = self
            .schema_path
            .clone()
            .map_or(SchemaSource::Embedded, SchemaSource::File);

        DatabaseConfig::default()
            .with_slot(self.slot())
            .with_foreign_keys(self.foreign_keys.unwrap_or(true))
            .with_autosave(self.autosave_policy())
            .with_schema(schema)
            .with_backup_prefix(
                self.backup_prefix
                    .as_deref()
                    .unwrap_or(DEFAULT_BACKUP_PREFIX),
            )
    }

    /// Opens the file store this configuration points at under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid store names.
    pub fn file_store(&self, data_dir: &Path) -> Result<FileStore> {
        FileStore::new(data_dir, self.database_name(), self.object_store())
    }
}
