//! Configuration validation.

use crate::config::schema::{AutosaveConfig, Config, StoreConfig};
use crate::error::{Error, Result};
use crate::store::validate_name;

/// Validates a merged configuration.
///
/// # Examples
///
/// ```
/// use protege::config::{Config, ConfigValidator};
///
/// let config = Config::default();
/// ConfigValidator::validate(&config).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(ref store) = config.store {
            Self::validate_store(store)?;
        }

        if let Some(ref autosave) = config.autosave {
            Self::validate_autosave(autosave)?;
        }
        Self::validate_backoff_range(config)?;

        if let Some(ref prefix) = config.backup_prefix {
            validate_name("backup_prefix", prefix)?;
        }

        if let Some(ref path) = config.schema_path {
            if path.as_os_str().is_empty() {
                return Err(Error::Validation {
                    field: "schema_path".into(),
                    message: "cannot be empty".into(),
                });
            }
        }

        Ok(())
    }

    fn validate_store(store: &StoreConfig) -> Result<()> {
        if let Some(ref name) = store.database_name {
            validate_name("store.database_name", name)?;
        }
        if let Some(ref name) = store.object_store {
            validate_name("store.object_store", name)?;
        }
        if let Some(ref slot) = store.slot {
            validate_name("store.slot", slot)?;
        }
        Ok(())
    }

    fn validate_autosave(autosave: &AutosaveConfig) -> Result<()> {
        if autosave.initial_backoff_ms == Some(0) {
            return Err(Error::Validation {
                field: "autosave.initial_backoff_ms".into(),
                message: "must be greater than 0".into(),
            });
        }

        if autosave.max_backoff_ms == Some(0) {
            return Err(Error::Validation {
                field: "autosave.max_backoff_ms".into(),
                message: "must be greater than 0".into(),
            });
        }

        Ok(())
    }

    /// The first retry delay may not exceed the cap, defaults included.
    fn validate_backoff_range(config: &Config) -> Result<()> {
        let policy = config.autosave_policy();
        if policy.initial_backoff > policy.max_backoff {
            return Err(Error::Validation {
                field: "autosave".into(),
                message: format!(
                    "initial_backoff_ms ({}) cannot exceed max_backoff_ms ({})",
                    policy.initial_backoff.as_millis(),
                    policy.max_backoff.as_millis()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_is_valid() {
        ConfigValidator::validate(&Config::default()).unwrap();
    }

    #[test]
    fn test_slot_with_separator_rejected() {
        let config = Config {
            store: Some(StoreConfig {
                slot: Some("../escape".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("store.slot"));
    }

    #[test]
    fn test_empty_database_name_rejected() {
        let config = Config {
            store: Some(StoreConfig {
                database_name: Some("  ".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_zero_backoff_rejected() {
        let config = Config {
            autosave: Some(AutosaveConfig {
                initial_backoff_ms: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_initial_backoff_above_max_rejected() {
        let config = Config {
            autosave: Some(AutosaveConfig {
                max_retries: Some(1),
                initial_backoff_ms: Some(500),
                max_backoff_ms: Some(100),
            }),
            ..Default::default()
        };
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("cannot exceed"));
    }

    #[test]
    fn test_initial_backoff_above_default_cap_rejected() {
        let config = Config {
            autosave: Some(AutosaveConfig {
                initial_backoff_ms: Some(5000),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("max_backoff_ms (2000)"));
    }

    #[test]
    fn test_cap_below_default_initial_rejected() {
        let config = Config {
            autosave: Some(AutosaveConfig {
                max_backoff_ms: Some(10),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_zero_retries_allowed() {
        let config = Config {
            autosave: Some(AutosaveConfig {
                max_retries: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        ConfigValidator::validate(&config).unwrap();
    }

    #[test]
    fn test_empty_backup_prefix_rejected() {
        let config = Config {
            backup_prefix: Some(String::new()),
            ..Default::default()
        };
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_empty_schema_path_rejected() {
        let config = Config {
            schema_path: Some(PathBuf::new()),
            ..Default::default()
        };
        assert!(ConfigValidator::validate(&config).is_err());
    }
}
