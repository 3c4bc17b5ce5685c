//! Configuration merging and precedence handling.
//!
//! This module implements hierarchical merging of configuration sources.
//! Nested sections are merged field by field.

use crate::config::loader::ConfigSource;
use crate::config::schema::{AutosaveConfig, Config, StoreConfig};

/// Merges configuration sources according to precedence rules.
///
/// # Examples
///
/// ```
/// use protege::config::{Config, ConfigMerger};
///
/// let low = Config { backup_prefix: Some("low".to_string()), ..Default::default() };
/// let high = Config { backup_prefix: Some("high".to_string()), ..Default::default() };
///
/// let mut result = low;
/// ConfigMerger::merge_into(&mut result, &high);
/// assert_eq!(result.backup_prefix, Some("high".to_string()));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge multiple configuration sources into final config.
    ///
    /// Sources should be provided in order from lowest to highest precedence.
    #[must_use]
    pub fn merge(sources: Vec<ConfigSource>) -> Config {
        let mut result = Config::default();

        for source in sources {
            Self::merge_into(&mut result, &source.config);
        }

        result
    }

    /// Merge source config into target (source overwrites target).
    ///
    /// # Merging Rules
    ///
    /// - Simple fields: source overwrites if Some
    /// - Nested configs: field-by-field merge
    pub fn merge_into(target: &mut Config, source: &Config) {
        if source.schema_path.is_some() {
            target.schema_path.clone_from(&source.schema_path);
        }

        if source.foreign_keys.is_some() {
            target.foreign_keys = source.foreign_keys;
        }

        if source.backup_prefix.is_some() {
            target.backup_prefix.clone_from(&source.backup_prefix);
        }

        if let Some(ref store) = source.store {
            Self::merge_store(target.store.get_or_insert_with(StoreConfig::default), store);
        }

        if let Some(ref autosave) = source.autosave {
            Self::merge_autosave(
                target.autosave.get_or_insert_with(AutosaveConfig::default),
                autosave,
            );
        }
    }

    fn merge_store(target: &mut StoreConfig, source: &StoreConfig) {
        if source.database_name.is_some() {
            target.database_name.clone_from(&source.database_name);
        }
        if source.object_store.is_some() {
            target.object_store.clone_from(&source.object_store);
        }
        if source.slot.is_some() {
            target.slot.clone_from(&source.slot);
        }
    }

    fn merge_autosave(target: &mut AutosaveConfig, source: &AutosaveConfig) {
        if source.max_retries.is_some() {
            target.max_retries = source.max_retries;
        }
        if source.initial_backoff_ms.is_some() {
            target.initial_backoff_ms = source.initial_backoff_ms;
        }
        if source.max_backoff_ms.is_some() {
            target.max_backoff_ms = source.max_backoff_ms;
        }
    }
}
