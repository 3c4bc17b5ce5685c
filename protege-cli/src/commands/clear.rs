//! Clear command implementation.

use crate::error::CliError;
use crate::utils::{finish, load_database, GlobalOptions};
use clap::Args;

/// Reset the database.
#[derive(Args)]
pub struct ClearCommand {
    /// Confirm that every stored row should be destroyed
    #[arg(long)]
    pub yes: bool,
}

impl ClearCommand {
    /// Execute the clear command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if !self.yes {
            return Err(CliError::SemanticFailure(
                "Refusing to clear the database without --yes".to_string(),
            ));
        }

        let mut db = load_database(global)?;
        db.clear_database()?;
        finish(&db)?;

        if !global.quiet {
            println!("Database cleared");
        }
        Ok(())
    }
}
