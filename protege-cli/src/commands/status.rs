//! Status command implementation.
//!
//! This module implements the `status` command, which reports where the
//! database is stored, how large it is, and the state of the auto-save queue.
//! It never creates a database: an empty slot is reported as such.

use crate::error::CliError;
use crate::utils::{
    create_database, data_dir, finish, format_timestamp, load_configuration, shorten_path,
    GlobalOptions, OutputFormat,
};
use clap::Args;
use protege::store::{SnapshotStore, STORE_VERSION};
use protege::Database;
use serde_json::json;
use std::path::Path;

/// Show database status.
#[derive(Args)]
pub struct StatusCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "table", ignore_case = true)]
    pub format: OutputFormat,
}

impl StatusCommand {
    /// Execute the status command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let data_dir = data_dir(global)?;
        let config = load_configuration(global, &data_dir)?;
        let store = config.file_store(&data_dir)?;
        let slot = config.slot().to_string();

        let Some(snapshot) = store.get(&slot)? else {
            self.report_empty(&data_dir, store.root(), &slot);
            return Ok(());
        };
        let snapshot_bytes = snapshot.len();

        let mut db = create_database(&config, &data_dir)?;
        db.initialize()?;
        let tables = table_counts(&db)?;
        let status = db.save_status()?;
        finish(&db)?;

        match self.format {
            OutputFormat::Json => {
                let tables: serde_json::Map<String, serde_json::Value> = tables
                    .into_iter()
                    .map(|(name, rows)| (name, json!(rows)))
                    .collect();
                let report = json!({
                    "data_dir": data_dir,
                    "store": store.root(),
                    "store_version": STORE_VERSION,
                    "slot": slot,
                    "snapshot_bytes": snapshot_bytes,
                    "tables": tables,
                    "save_status": status,
                });
                println!("{report:#}");
            }
            OutputFormat::Table => {
                println!("Data directory: {}", shorten_path(&data_dir));
                println!("Store:          {}", shorten_path(store.root()));
                println!("Slot:           {slot}");
                println!("Snapshot size:  {snapshot_bytes} bytes");
                println!(
                    "Saves:          {} persisted / {} requested",
                    status.persisted, status.requested
                );
                if let Some(saved_at) = status.last_saved_at {
                    println!("Last saved:     {}", format_timestamp(saved_at));
                }
                if let Some(ref error) = status.last_error {
                    println!("Last error:     {error}");
                }
                println!();
                println!("table\trows");
                for (name, rows) in tables {
                    println!("{name}\t{rows}");
                }
            }
        }

        Ok(())
    }

    /// Reports a store whose slot holds no snapshot yet, without creating one.
    fn report_empty(&self, data_dir: &Path, store_root: &Path, slot: &str) {
        match self.format {
            OutputFormat::Json => {
                let report = json!({
                    "data_dir": data_dir,
                    "store": store_root,
                    "store_version": STORE_VERSION,
                    "slot": slot,
                    "snapshot_bytes": 0,
                    "tables": {},
                    "save_status": null,
                });
                println!("{report:#}");
            }
            OutputFormat::Table => {
                println!("Data directory: {}", shorten_path(data_dir));
                println!("Store:          {}", shorten_path(store_root));
                println!("Slot:           {slot}");
                println!("Snapshot:       none (run `protege init` to create the database)");
            }
        }
    }
}

/// Row counts of every user table, by name.
fn table_counts(db: &Database) -> Result<Vec<(String, i64)>, CliError> {
    let tables = db.query(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        &[],
    )?;

    let mut counts = Vec::with_capacity(tables.len());
    for table in &tables {
        let name = table.require_str("name")?;
        let sql = format!("SELECT COUNT(*) AS n FROM \"{}\"", name.replace('"', "\"\""));
        let rows = db
            .query_one(&sql, &[])?
            .and_then(|row| row.get_i64("n"))
            .unwrap_or(0);
        counts.push((name.to_string(), rows));
    }
    Ok(counts)
}
