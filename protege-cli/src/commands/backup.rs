//! Backup command implementation.
//!
//! This module implements the `backup` command, which writes the whole
//! database to a dated file.

use crate::error::CliError;
use crate::utils::{finish, open_database, GlobalOptions};
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Export a backup file.
#[derive(Args)]
pub struct BackupCommand {
    /// Directory to write the backup into (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl BackupCommand {
    /// Execute the backup command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let output = match self.output {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        fs::create_dir_all(&output)?;

        let db = open_database(global)?;
        let backup = db.backup()?;
        let path = backup.write_to_dir(&output)?;
        finish(&db)?;

        println!("{}", path.display());
        Ok(())
    }
}
