//! Exec command implementation.
//!
//! This module implements the `exec` command, which runs an SQL script
//! given inline or read from a file.

use crate::error::CliError;
use crate::utils::{finish, open_database, GlobalOptions};
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Run an SQL script.
#[derive(Args)]
pub struct ExecCommand {
    /// SQL script
    #[arg(conflicts_with = "file")]
    pub sql: Option<String>,

    /// Read the script from a file
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl ExecCommand {
    /// Execute the exec command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let script = match (self.sql, self.file) {
            (Some(sql), None) => sql,
            (None, Some(path)) => fs::read_to_string(&path)?,
            _ => {
                return Err(CliError::InvalidArguments(
                    "provide either an SQL script or --file".to_string(),
                ))
            }
        };

        let mut db = open_database(global)?;
        db.exec(&script)?;
        finish(&db)?;

        if !global.quiet {
            println!("Script executed");
        }
        Ok(())
    }
}
