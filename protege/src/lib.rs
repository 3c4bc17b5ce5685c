#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # protege
//!
//! A persistent client-side database layer for a small library catalogue.
//!
//! The database lives entirely in memory inside an embedded `SQLite` engine.
//! After every mutation its full state is serialized into a snapshot and
//! written, in order, to a durable single-slot store, so the next process
//! picks up exactly where the last one stopped.
//!
//! ## Core Types
//!
//! - [`Database`] and [`DatabaseConfig`]: The database service
//! - [`Row`] and [`Value`]: Query results and positional parameters
//! - [`store::SnapshotStore`]: The durable store seam, with file and memory backends
//! - [`Config`] and [`ConfigBuilder`]: Layered YAML and environment configuration
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use protege::{sql_params, Database};
//!
//! let mut db = Database::in_memory().unwrap();
//! db.run(
//!     "INSERT INTO categories (nom, description) VALUES (?, ?)",
//!     &sql_params!["Poésie", "Recueils et anthologies"],
//! )
//! .unwrap();
//!
//! let id = db.last_insert_id().unwrap();
//! let row = db
//!     .query_one("SELECT nom FROM categories WHERE id = ?", &sql_params![id])
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(row.get_str("nom"), Some("Poésie"));
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod store;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigBuilder};
pub use database::{
    Backup, Database, DatabaseConfig, ExecResult, InitOutcome, Row, RunResult, SaveStatus,
    Snapshot, Value,
};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
