//! Configuration file discovery and loading.
//!
//! This module loads protege configuration files from the data directory
//! and from explicitly named paths, tagging each with its precedence.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::{Error, Result};

/// Name of the user configuration file inside the data directory.
pub const USER_CONFIG_FILE: &str = "config.yaml";

/// Precedence of `<data_dir>/config.yaml`.
pub const USER_PRECEDENCE: u8 = 1;

/// Precedence of a configuration file named by the caller.
pub const EXPLICIT_PRECEDENCE: u8 = 2;

/// Configuration source with its precedence level.
///
/// Lower precedence values are overridden by higher ones.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the configuration file.
    pub path: PathBuf,
    /// Precedence level (higher values take priority).
    pub precedence: u8,
    /// Parsed configuration.
    pub config: Config,
}

/// Loads configuration from files.
///
/// # Examples
///
/// ```
/// use protege::config::ConfigLoader;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("config.yaml"), "foreign_keys: false\n").unwrap();
///
/// let sources = ConfigLoader::load_all(dir.path(), None).unwrap();
/// assert_eq!(sources.len(), 1);
/// assert_eq!(sources[0].config.foreign_keys, Some(false));
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the user config (if present) and the explicit file (if given).
    ///
    /// Sources are returned from lowest to highest precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed, or
    /// if the explicit file does not exist.
    pub fn load_all(data_dir: &Path, explicit: Option<&Path>) -> Result<Vec<ConfigSource>> {
        let mut sources = Vec::new();

        let user_path = data_dir.join(USER_CONFIG_FILE);
        if user_path.exists() {
            sources.push(ConfigSource {
                config: Self::load_file(&user_path)?,
                path: user_path,
                precedence: USER_PRECEDENCE,
            });
        }

        if let Some(path) = explicit {
            sources.push(ConfigSource {
                config: Self::load_file(path)?,
                path: path.to_path_buf(),
                precedence: EXPLICIT_PRECEDENCE,
            });
        }

        sources.sort_by_key(|s| s.precedence);
        Ok(sources)
    }

    /// Load and parse a YAML configuration file.
    ///
    /// An empty file is an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is invalid.
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|e| Error::Validation {
            field: path.display().to_string(),
            message: format!("Failed to read configuration file: {e}"),
        })?;

        if contents.trim().is_empty() {
            return Ok(Config::default());
        }

        log::debug!("loading configuration from {}", path.display());
        serde_yaml::from_str(&contents).map_err(|e| {
            log::error!("invalid configuration file {}", path.display());
            Error::Configuration(e)
        })
    }
}
