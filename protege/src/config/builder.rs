//! Configuration builder for assembling the final configuration.

use std::path::{Path, PathBuf};

use crate::config::environment::EnvironmentConfig;
use crate::config::loader::ConfigLoader;
use crate::config::merger::ConfigMerger;
use crate::config::schema::Config;
use crate::config::validator::ConfigValidator;
use crate::database::resolve_data_dir;
use crate::error::Result;

/// Builder that layers configuration sources and validates the result.
///
/// Sources are applied from lowest to highest precedence: the user config
/// in the data directory, an explicit config file, `PROTEGE_*` environment
/// variables, then programmatic overrides.
///
/// # Examples
///
/// ```
/// use protege::config::{Config, ConfigBuilder};
///
/// let config = ConfigBuilder::new()
///     .skip_files()
///     .skip_env()
///     .with_config(Config {
///         foreign_keys: Some(false),
///         ..Default::default()
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(config.foreign_keys, Some(false));
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    data_dir: Option<PathBuf>,
    config_file: Option<PathBuf>,
    overrides: Option<Config>,
    skip_files: bool,
    skip_env: bool,
}

impl ConfigBuilder {
    /// Creates a builder that reads every source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the data directory searched for `config.yaml`.
    ///
    /// Without it the directory is resolved from `PROTEGE_DATA_DIR` or the
    /// home directory.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: &Path) -> Self {
        self.data_dir = Some(data_dir.to_path_buf());
        self
    }

    /// Adds an explicit config file that overrides the user config.
    #[must_use]
    pub fn with_config_file(mut self, path: &Path) -> Self {
        self.config_file = Some(path.to_path_buf());
        self
    }

    /// Adds programmatic overrides, applied last.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.overrides = Some(config);
        self
    }

    /// Skips configuration files.
    #[must_use]
    pub fn skip_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Skips environment variable overrides.
    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Loads, merges and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, an environment
    /// variable is malformed, or the merged result fails validation.
    pub fn build(self) -> Result<Config> {
        let mut config = if self.skip_files {
            Config::default()
        } else {
            let data_dir = resolve_data_dir(self.data_dir)?;
            let sources = ConfigLoader::load_all(&data_dir, self.config_file.as_deref())?;
            ConfigMerger::merge(sources)
        };

        if !self.skip_env {
            EnvironmentConfig::apply_overrides(&mut config)?;
        }

        if let Some(ref overrides) = self.overrides {
            ConfigMerger::merge_into(&mut config, overrides);
        }

        ConfigValidator::validate(&config)?;
        log::debug!("configuration resolved: slot '{}'", config.slot());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::StoreConfig;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_skip_everything_yields_defaults() {
        let config = ConfigBuilder::new().skip_files().skip_env().build().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_user_config_loaded_from_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.yaml"),
            "store:\n  slot: from-file\n",
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .with_data_dir(temp_dir.path())
            .skip_env()
            .build()
            .unwrap();
        assert_eq!(config.slot(), "from-file");
    }

    #[test]
    fn test_explicit_file_overrides_user_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.yaml"),
            "foreign_keys: false\nbackup_prefix: user\n",
        )
        .unwrap();
        let explicit = temp_dir.path().join("other.yaml");
        fs::write(&explicit, "backup_prefix: explicit\n").unwrap();

        let config = ConfigBuilder::new()
            .with_data_dir(temp_dir.path())
            .with_config_file(&explicit)
            .skip_env()
            .build()
            .unwrap();
        assert_eq!(config.backup_prefix.as_deref(), Some("explicit"));
        assert_eq!(config.foreign_keys, Some(false));
    }

    #[test]
    fn test_programmatic_overrides_win() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.yaml"),
            "store:\n  slot: from-file\n",
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .with_data_dir(temp_dir.path())
            .skip_env()
            .with_config(Config {
                store: Some(StoreConfig {
                    slot: Some("override".into()),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .build()
            .unwrap();
        assert_eq!(config.slot(), "override");
    }

    #[test]
    #[serial]
    fn test_env_overrides_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.yaml"),
            "backup_prefix: from-file\n",
        )
        .unwrap();
        std::env::set_var("PROTEGE_BACKUP_PREFIX", "from-env");

        let result = ConfigBuilder::new().with_data_dir(temp_dir.path()).build();
        std::env::remove_var("PROTEGE_BACKUP_PREFIX");

        assert_eq!(result.unwrap().backup_prefix.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_invalid_merged_config_rejected() {
        let result = ConfigBuilder::new()
            .skip_files()
            .skip_env()
            .with_config(Config {
                backup_prefix: Some("a/b".into()),
                ..Default::default()
            })
            .build();
        assert!(result.is_err());
    }
}
