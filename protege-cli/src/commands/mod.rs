//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `init`: Restore or bootstrap the database
//! - `query`: Run a query and print the rows
//! - `run`: Run one mutating statement
//! - `exec`: Run an SQL script
//! - `backup`: Export a dated backup file
//! - `restore`: Replace the database with a backup file
//! - `clear`: Reset the database to its schema
//! - `status`: Show store, table and auto-save state

pub mod backup;
pub mod clear;
pub mod exec;
pub mod init;
pub mod query;
pub mod restore;
pub mod run;
pub mod status;

pub use backup::BackupCommand;
pub use clear::ClearCommand;
pub use exec::ExecCommand;
pub use init::InitCommand;
pub use query::QueryCommand;
pub use restore::RestoreCommand;
pub use run::RunCommand;
pub use status::StatusCommand;
