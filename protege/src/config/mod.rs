//! Configuration system for protege.
//!
//! This module provides hierarchical configuration with support for:
//! - YAML configuration files (user config and an explicit file)
//! - Environment variable overrides
//! - Programmatic configuration via builder pattern
//!
//! # Configuration Precedence
//!
//! Configuration is merged from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Programmatic overrides (via `ConfigBuilder::with_config`)
//! 2. Environment variables (`PROTEGE_*`)
//! 3. Explicit config file (via `ConfigBuilder::with_config_file`)
//! 4. User config (`~/.protege/config.yaml`)
//! 5. Built-in defaults
//!
//! # Examples
//!
//! ```no_run
//! use protege::config::ConfigBuilder;
//! use protege::database::Database;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let data_dir = Path::new("/var/lib/protege");
//! let config = ConfigBuilder::new().with_data_dir(data_dir).build().unwrap();
//!
//! let store = config.file_store(data_dir).unwrap();
//! let db = Database::open(config.database_config(), Arc::new(store)).unwrap();
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

// Re-export key types at module root
pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::{ConfigLoader, ConfigSource, USER_CONFIG_FILE};
pub use merger::ConfigMerger;
pub use schema::{AutosaveConfig, Config, StoreConfig};
pub use validator::ConfigValidator;
