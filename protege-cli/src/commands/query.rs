//! Query command implementation.
//!
//! This module implements the `query` command, which runs a read-only
//! statement and prints the resulting rows as a table or as JSON.

use crate::error::CliError;
use crate::utils::{finish, format_rows, open_database, parse_params, GlobalOptions, OutputFormat};
use clap::Args;

/// Run a query and print the rows.
#[derive(Args)]
pub struct QueryCommand {
    /// SQL query with `?` placeholders
    pub sql: String,

    /// Positional parameter (repeatable); `null`, numbers, otherwise text
    #[arg(long = "param", value_name = "VALUE", allow_hyphen_values = true)]
    pub params: Vec<String>,

    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "table",
        env = "PROTEGE_OUTPUT_FORMAT",
        ignore_case = true
    )]
    pub format: OutputFormat,
}

impl QueryCommand {
    /// Execute the query command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let params = parse_params(&self.params);

        let rows = db.query(&self.sql, &params)?;
        finish(&db)?;

        let output = format_rows(&rows, self.format)?;
        if !output.is_empty() {
            println!("{output}");
        }
        Ok(())
    }
}
