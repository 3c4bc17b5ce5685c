//! Common test utilities for integration tests.
//!
//! This module provides instrumented snapshot stores and helpers for
//! inspecting what reached the durable slot.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use protege::database::{Database, DatabaseConfig, DEFAULT_SLOT};
use protege::store::{MemoryStore, SnapshotStore};
use protege::{Error, Result};

/// Opens an initialized database over `store`.
#[allow(dead_code)]
pub fn open_with<S: SnapshotStore + 'static>(store: S) -> Database {
    Database::open(DatabaseConfig::default(), Arc::new(store)).unwrap()
}

/// Counts the rows of `table` in a stored database image.
///
/// The image is loaded into a throwaway service, as a restarted process
/// would load it after a crash.
#[allow(dead_code)]
pub fn count_in_image(bytes: &[u8], table: &str) -> i64 {
    let store = MemoryStore::new();
    store.put(DEFAULT_SLOT, bytes).unwrap();
    let db = open_with(store);
    count(&db, table)
}

/// Counts the rows of `table`.
#[allow(dead_code)]
pub fn count(db: &Database, table: &str) -> i64 {
    db.query_one(&format!("SELECT COUNT(*) AS n FROM {table}"), &[])
        .unwrap()
        .unwrap()
        .get_i64("n")
        .unwrap()
}

/// Inserts the administrator, author and category a book row references.
///
/// Returns `(admin_id, author_id, category_id)`.
#[allow(dead_code)]
pub fn seed_catalogue(db: &mut Database) -> (i64, i64, i64) {
    db.run(
        "INSERT INTO administrateurs (email, password_hash, nom_complet, role) VALUES (?, ?, ?, ?)",
        &protege::sql_params!["admin@example.org", "hash", "Admin Principal", "super_admin"],
    )
    .unwrap();
    let admin = db.last_insert_id().unwrap().unwrap();

    db.run(
        "INSERT INTO auteurs (nom_complet, nationalite) VALUES (?, ?)",
        &protege::sql_params!["Ahmadou Kourouma", "Ivoirienne"],
    )
    .unwrap();
    let author = db.last_insert_id().unwrap().unwrap();

    db.run(
        "INSERT INTO categories (nom) VALUES (?)",
        &protege::sql_params!["Roman africain"],
    )
    .unwrap();
    let category = db.last_insert_id().unwrap().unwrap();

    (admin, author, category)
}

/// Inserts a book and returns its id.
#[allow(dead_code)]
pub fn insert_book(db: &mut Database, titre: &str, ids: (i64, i64, i64)) -> i64 {
    let (admin, author, category) = ids;
    db.run(
        "INSERT INTO livres (titre, auteur_id, resume, categorie_id, annee_publication, ajoute_par) \
         VALUES (?, ?, ?, ?, ?, ?)",
        &protege::sql_params![titre, author, "Résumé", category, 1968, admin],
    )
    .unwrap();
    db.last_insert_id().unwrap().unwrap()
}

/// A store that keeps every blob ever written, in write order.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingStore {
    inner: MemoryStore,
    history: Arc<Mutex<Vec<Vec<u8>>>>,
}

#[allow(dead_code)]
impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every blob written so far.
    pub fn history(&self) -> Vec<Vec<u8>> {
        self.history.lock().unwrap().clone()
    }
}

impl SnapshotStore for RecordingStore {
    fn get(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(slot)
    }

    fn put(&self, slot: &str, bytes: &[u8]) -> Result<()> {
        self.inner.put(slot, bytes)?;
        self.history.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        self.inner.delete_all()
    }
}

#[derive(Default)]
struct Gate {
    closed: bool,
    blocked: usize,
}

/// A recording store whose writes can be held back.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct GatedStore {
    recording: RecordingStore,
    gate: Arc<(Mutex<Gate>, Condvar)>,
}

#[allow(dead_code)]
impl GatedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent writes block until [`GatedStore::open`].
    pub fn close(&self) {
        self.gate.0.lock().unwrap().closed = true;
    }

    /// Releases every blocked write.
    pub fn open(&self) {
        let (lock, cvar) = &*self.gate;
        lock.lock().unwrap().closed = false;
        cvar.notify_all();
    }

    /// Waits until a write is blocked on the gate.
    pub fn wait_until_blocked(&self) {
        let (lock, cvar) = &*self.gate;
        let guard = lock.lock().unwrap();
        let (guard, timeout) = cvar
            .wait_timeout_while(guard, Duration::from_secs(10), |gate| gate.blocked == 0)
            .unwrap();
        assert!(!timeout.timed_out(), "no write reached the gate");
        drop(guard);
    }

    pub fn history(&self) -> Vec<Vec<u8>> {
        self.recording.history()
    }
}

impl SnapshotStore for GatedStore {
    fn get(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        self.recording.get(slot)
    }

    fn put(&self, slot: &str, bytes: &[u8]) -> Result<()> {
        {
            let (lock, cvar) = &*self.gate;
            let mut gate = lock.lock().unwrap();
            gate.blocked += 1;
            cvar.notify_all();
            while gate.closed {
                gate = cvar.wait(gate).unwrap();
            }
            gate.blocked -= 1;
        }
        self.recording.put(slot, bytes)
    }

    fn delete_all(&self) -> Result<()> {
        self.recording.delete_all()
    }
}

/// A memory store whose writes fail while failures remain.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct FailingStore {
    inner: MemoryStore,
    failures_left: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` writes fail.
    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl SnapshotStore for FailingStore {
    fn get(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(slot)
    }

    fn put(&self, slot: &str, bytes: &[u8]) -> Result<()> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::Store {
                operation: "put",
                slot: slot.to_string(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.put(slot, bytes)
    }

    fn delete_all(&self) -> Result<()> {
        self.inner.delete_all()
    }
}
