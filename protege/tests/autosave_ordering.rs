//! Integration tests for the auto-save queue.
//!
//! These tests check that snapshots reach the store in mutation order, that
//! queued snapshots are coalesced, and that failed writes are retried.

mod common;

use std::sync::Arc;
use std::time::Duration;

use protege::database::{AutosavePolicy, Database, DatabaseConfig, DEFAULT_SLOT};
use protege::sql_params;
use protege::store::SnapshotStore;

use common::{count_in_image, FailingStore, GatedStore, RecordingStore};

fn fast_config(max_retries: u32) -> DatabaseConfig {
    DatabaseConfig::default().with_autosave(AutosavePolicy {
        max_retries,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
    })
}

#[test]
fn test_stored_images_never_go_backwards() {
    let store = RecordingStore::new();
    let mut db = Database::open(DatabaseConfig::default(), Arc::new(store.clone())).unwrap();

    for i in 0..25 {
        db.run(
            "INSERT INTO categories (nom) VALUES (?)",
            &sql_params![format!("Catégorie {i}")],
        )
        .unwrap();
    }
    db.flush().unwrap();
    drop(db);

    // Any prefix of the history is what a crash could leave behind
    let counts: Vec<i64> = store
        .history()
        .iter()
        .map(|bytes| count_in_image(bytes, "categories"))
        .collect();
    assert_eq!(counts.first(), Some(&0));
    assert_eq!(counts.last(), Some(&25));
    assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]), "{counts:?}");
}

#[test]
fn test_queued_snapshots_are_coalesced() {
    let store = GatedStore::new();
    let mut db = Database::open(DatabaseConfig::default(), Arc::new(store.clone())).unwrap();
    assert_eq!(store.history().len(), 1);

    store.close();
    db.run("INSERT INTO categories (nom) VALUES (?)", &sql_params!["A"])
        .unwrap();
    store.wait_until_blocked();

    // The writer is busy with A; B and C wait in the single pending slot
    db.run("INSERT INTO categories (nom) VALUES (?)", &sql_params!["B"])
        .unwrap();
    db.run("INSERT INTO categories (nom) VALUES (?)", &sql_params!["C"])
        .unwrap();

    store.open();
    db.flush().unwrap();

    let history = store.history();
    assert_eq!(history.len(), 3);
    assert_eq!(count_in_image(&history[1], "categories"), 1);
    assert_eq!(count_in_image(&history[2], "categories"), 3);

    let status = db.save_status().unwrap();
    assert_eq!(status.requested, 4);
    assert_eq!(status.persisted, 4);
}

#[test]
fn test_failed_write_is_retried() {
    let store = FailingStore::new();
    let mut db = Database::open(fast_config(3), Arc::new(store.clone())).unwrap();

    store.fail_next(2);
    db.run("INSERT INTO categories (nom) VALUES (?)", &sql_params!["Retry"])
        .unwrap();
    db.flush().unwrap();

    let bytes = store.inner().get(DEFAULT_SLOT).unwrap().unwrap();
    assert_eq!(count_in_image(&bytes, "categories"), 1);
    assert!(db.save_status().unwrap().is_clean());
}

#[test]
fn test_exhausted_retries_surface_on_flush() {
    let store = FailingStore::new();
    let mut db = Database::open(fast_config(1), Arc::new(store.clone())).unwrap();

    store.fail_next(10);
    db.run("INSERT INTO categories (nom) VALUES (?)", &sql_params!["Lost"])
        .unwrap();

    let err = db.flush().unwrap_err();
    assert!(err.to_string().contains("disk full"));
    let status = db.save_status().unwrap();
    assert!(!status.is_clean());
    assert!(status.last_error.is_some());

    // The live engine is unaffected and the next save carries the change
    store.fail_next(0);
    db.run("INSERT INTO categories (nom) VALUES (?)", &sql_params!["Saved"])
        .unwrap();
    db.flush().unwrap();
    let bytes = store.inner().get(DEFAULT_SLOT).unwrap().unwrap();
    assert_eq!(count_in_image(&bytes, "categories"), 2);
}

#[test]
fn test_drop_drains_pending_snapshot() {
    let store = RecordingStore::new();
    {
        let mut db =
            Database::open(DatabaseConfig::default(), Arc::new(store.clone())).unwrap();
        db.run("INSERT INTO categories (nom) VALUES (?)", &sql_params!["Dernier"])
            .unwrap();
    }

    let history = store.history();
    let last = history.last().unwrap();
    assert_eq!(count_in_image(last, "categories"), 1);
}

#[test]
fn test_failed_statement_schedules_nothing() {
    let mut db = Database::in_memory().unwrap();
    let before = db.save_status().unwrap().requested;

    assert!(db.run("INSERT INTO missing_table VALUES (1)", &[]).is_err());
    assert!(db.exec("NOT SQL AT ALL").is_err());

    assert_eq!(db.save_status().unwrap().requested, before);
}
