//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    BackupCommand, ClearCommand, ExecCommand, InitCommand, QueryCommand, RestoreCommand,
    RunCommand, StatusCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for the Protege library database.
#[derive(Parser)]
#[command(name = "protege")]
#[command(version, about = "Inspect and maintain a Protege library database", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "PROTEGE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Load an additional configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize the database (restore or create from schema)
    Init(InitCommand),

    /// Run a query and print the rows
    Query(QueryCommand),

    /// Run one mutating statement
    Run(RunCommand),

    /// Run an SQL script
    Exec(ExecCommand),

    /// Export a backup file
    Backup(BackupCommand),

    /// Restore from a backup file
    Restore(RestoreCommand),

    /// Reset the database to its schema
    Clear(ClearCommand),

    /// Show database status
    Status(StatusCommand),
}
