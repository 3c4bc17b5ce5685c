//! Run command implementation.
//!
//! This module implements the `run` command, which executes a single
//! mutating statement and waits until the result is saved.

use crate::error::CliError;
use crate::utils::{finish, open_database, parse_params, GlobalOptions};
use clap::Args;

/// Run one mutating statement.
#[derive(Args)]
pub struct RunCommand {
    /// SQL statement with `?` placeholders
    pub sql: String,

    /// Positional parameter (repeatable); `null`, numbers, otherwise text
    #[arg(long = "param", value_name = "VALUE", allow_hyphen_values = true)]
    pub params: Vec<String>,
}

impl RunCommand {
    /// Execute the run command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut db = open_database(global)?;
        let params = parse_params(&self.params);

        let result = db.run(&self.sql, &params)?;
        let last_id = db.last_insert_id()?;
        finish(&db)?;

        if !global.quiet {
            println!("Rows affected: {}", result.rows_affected);
            if let Some(id) = last_id {
                println!("Last insert id: {id}");
            }
        }
        Ok(())
    }
}
