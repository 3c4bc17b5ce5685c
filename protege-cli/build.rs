//! Build script for protege-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
fn build_cli() -> Command {
    Command::new("protege")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect and maintain a Protege library database")
        .long_about(
            "Command-line tool for querying, backing up and restoring the snapshot-persisted Protege library database",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Override the data directory location")
                .value_name("PATH")
                .global(true)
                .env("PROTEGE_DATA_DIR"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Load an additional configuration file")
                .value_name("FILE")
                .global(true),
        )
        .subcommands(vec![
            Command::new("init")
                .about("Initialize the database")
                .long_about("Restore the database from its stored snapshot, or create it from the schema"),
            Command::new("query")
                .about("Run a query and print the rows")
                .long_about("Run a read-only SQL query with positional parameters and print the result"),
            Command::new("run")
                .about("Run one mutating statement")
                .long_about("Run a single SQL statement with positional parameters and save the result"),
            Command::new("exec")
                .about("Run an SQL script")
                .long_about("Run a script of one or more SQL statements and save the result"),
            Command::new("backup")
                .about("Export a backup file")
                .long_about("Write the whole database to a dated backup file"),
            Command::new("restore")
                .about("Restore from a backup file")
                .long_about("Replace the whole database with the content of a backup file"),
            Command::new("clear")
                .about("Reset the database")
                .long_about("Destroy the stored database and start over from the schema"),
            Command::new("status")
                .about("Show database status")
                .long_about("Show the store location, snapshot size, table sizes and auto-save state"),
        ])
}

fn main() {
    // Generate man pages at build time
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let app = build_cli();
    let man = Man::new(app);
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("protege.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
