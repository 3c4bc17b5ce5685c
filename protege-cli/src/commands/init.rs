//! Init command implementation.
//!
//! This module implements the `init` command, which restores the database
//! from its stored snapshot or creates it from the schema on first run.

use crate::error::CliError;
use crate::utils::{create_database, data_dir, finish, load_configuration, GlobalOptions};
use clap::Args;
use protege::InitOutcome;

/// Initialize the database.
#[derive(Args)]
pub struct InitCommand {}

impl InitCommand {
    /// Execute the init command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let data_dir = data_dir(global)?;
        let config = load_configuration(global, &data_dir)?;
        let mut db = create_database(&config, &data_dir)?;

        let outcome = db.initialize()?;
        finish(&db)?;

        if global.quiet {
            return Ok(());
        }

        println!("Database ready in: {}", data_dir.display());
        match outcome {
            InitOutcome::Bootstrapped => {
                println!("  - Created database from schema in slot '{}'", config.slot());
            }
            InitOutcome::Restored => {
                println!("  - Restored database from slot '{}'", config.slot());
            }
            InitOutcome::AlreadyInitialized => {}
        }

        Ok(())
    }
}
