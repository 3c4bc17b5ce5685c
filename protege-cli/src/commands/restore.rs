//! Restore command implementation.
//!
//! This module implements the `restore` command, which replaces the whole
//! database with the content of a backup file.

use crate::error::CliError;
use crate::utils::{finish, load_database, GlobalOptions};
use clap::Args;
use std::path::PathBuf;

/// Restore from a backup file.
#[derive(Args)]
pub struct RestoreCommand {
    /// Backup file to restore
    pub file: PathBuf,
}

impl RestoreCommand {
    /// Execute the restore command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if !self.file.is_file() {
            return Err(CliError::InvalidArguments(format!(
                "backup file not found: {}",
                self.file.display()
            )));
        }

        let mut db = load_database(global)?;
        db.restore_from_file(&self.file)?;
        finish(&db)?;

        if !global.quiet {
            println!("Restored database from {}", self.file.display());
        }
        Ok(())
    }
}
