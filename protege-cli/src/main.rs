//! Main entry point for the protege CLI.
//!
//! This is the command-line interface for the Protege library database.
//! It provides commands for working with the stored database:
//! - `init`: Restore or create the database
//! - `query` / `run` / `exec`: Read and modify it with SQL
//! - `backup` / `restore`: Export and import whole-database files
//! - `clear`: Reset it to the schema
//! - `status`: Show store and auto-save state

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    let _logger = protege::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        data_dir: cli.data_dir,
        config: cli.config,
    };

    let result = match cli.command {
        cli::Command::Init(cmd) => cmd.execute(&global),
        cli::Command::Query(cmd) => cmd.execute(&global),
        cli::Command::Run(cmd) => cmd.execute(&global),
        cli::Command::Exec(cmd) => cmd.execute(&global),
        cli::Command::Backup(cmd) => cmd.execute(&global),
        cli::Command::Restore(cmd) => cmd.execute(&global),
        cli::Command::Clear(cmd) => cmd.execute(&global),
        cli::Command::Status(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
