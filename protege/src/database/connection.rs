//! The database service and its lifecycle.
//!
//! A [`Database`] starts uninitialized. [`Database::initialize`] either
//! restores the engine from the snapshot in the durable store or, on first
//! run, bootstraps it from the schema and persists the result. Once ready,
//! the service stays ready for its whole lifetime.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::store::{validate_name, MemoryStore, SnapshotStore};

use super::autosave::{AutoSaver, SaveStatus};
use super::config::DatabaseConfig;
use super::engine::Engine;
use super::snapshot::Snapshot;

/// Lifecycle state of a [`Database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseState {
    /// `initialize()` has not completed successfully yet.
    Uninitialized,
    /// The engine is live and accepts queries.
    Ready,
}

/// Which path `initialize()` took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The service was already initialized; nothing happened.
    AlreadyInitialized,
    /// The engine was rebuilt from the stored snapshot.
    Restored,
    /// No snapshot existed; the schema was applied and persisted.
    Bootstrapped,
}

pub(super) enum State {
    Uninitialized,
    Ready(Ready),
}

pub(super) struct Ready {
    pub(super) engine: Engine,
    pub(super) saver: AutoSaver,
}

impl Ready {
    /// Schedules a snapshot of the engine, unless a transaction is open.
    ///
    /// The statement that closes a transaction schedules the snapshot for
    /// everything done inside it.
    pub(super) fn persist(&self) {
        if !self.engine.is_autocommit() {
            log::debug!("transaction open, snapshot deferred");
            return;
        }
        match self.engine.snapshot() {
            Ok(snapshot) => {
                let generation = self.saver.schedule(snapshot);
                log::debug!("scheduled snapshot generation {generation}");
            }
            Err(e) => log::error!("cannot serialize database for auto-save: {e}"),
        }
    }

    /// Replaces the engine and blocks until its snapshot is stored.
    pub(super) fn install(&mut self, engine: Engine) -> Result<()> {
        self.engine = engine;
        self.saver.schedule(self.engine.snapshot()?);
        self.saver.flush()
    }
}

/// The persistent database service.
///
/// Owns the live in-memory engine and the auto-save queue writing its
/// snapshots to a [`SnapshotStore`]. Mutations through [`Database::run`] and
/// [`Database::exec`] are visible immediately and become durable shortly
/// after; [`Database::flush`] waits for them.
///
/// # Examples
///
/// ```
/// use protege::{sql_params, Database};
///
/// let mut db = Database::in_memory().unwrap();
/// db.run("INSERT INTO categories (nom) VALUES (?)", &sql_params!["Fiction"]).unwrap();
/// assert_eq!(db.last_insert_id().unwrap(), Some(1));
///
/// let row = db
///     .query_one("SELECT nom FROM categories WHERE id = ?", &sql_params![1])
///     .unwrap()
///     .unwrap();
/// assert_eq!(row.get_str("nom"), Some("Fiction"));
/// ```
pub struct Database {
    pub(super) config: DatabaseConfig,
    pub(super) store: Arc<dyn SnapshotStore>,
    pub(super) state: State,
}

impl Database {
    /// Creates an uninitialized service over `store`.
    #[must_use]
    pub fn new(config: DatabaseConfig, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            config,
            store,
            state: State::Uninitialized,
        }
    }

    /// Creates a service and initializes it.
    ///
    /// # Errors
    ///
    /// Returns an initialization error if the store cannot be read, the
    /// stored snapshot is invalid, or the schema cannot be applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use protege::database::{Database, DatabaseConfig};
    /// use protege::store::FileStore;
    /// use std::sync::Arc;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = FileStore::new(dir.path(), "ProtegeDB", "database").unwrap();
    /// let db = Database::open(DatabaseConfig::default(), Arc::new(store)).unwrap();
    /// assert!(db.is_initialized());
    /// ```
    pub fn open(config: DatabaseConfig, store: Arc<dyn SnapshotStore>) -> Result<Self> {
        let mut db = Self::new(config, store);
        db.initialize()?;
        Ok(db)
    }

    /// Opens a service with default settings over a fresh [`MemoryStore`].
    ///
    /// # Errors
    ///
    /// Returns an initialization error if the embedded schema cannot be
    /// applied.
    pub fn in_memory() -> Result<Self> {
        Self::open(DatabaseConfig::default(), Arc::new(MemoryStore::new()))
    }

    /// Brings the service to the ready state.
    ///
    /// Calling it again once ready is a no-op. With a snapshot in the store
    /// the engine is rebuilt from it and no schema is applied. Without one,
    /// the schema is applied to an empty engine and the result is written
    /// to the store before this returns.
    ///
    /// On failure the service stays uninitialized and the call may be
    /// retried.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`] wrapping the underlying failure.
    pub fn initialize(&mut self) -> Result<InitOutcome> {
        if matches!(self.state, State::Ready(_)) {
            log::debug!("database already initialized");
            return Ok(InitOutcome::AlreadyInitialized);
        }

        let (ready, outcome) = self.start().map_err(|e| {
            log::error!("database initialization failed: {e}");
            Error::initialization(e)
        })?;
        self.state = State::Ready(ready);
        Ok(outcome)
    }

    fn start(&self) -> Result<(Ready, InitOutcome)> {
        let slot = &self.config.slot;
        validate_name("slot", slot)?;

        if let Some(bytes) = self.store.get(slot)? {
            log::info!("restoring database from slot '{slot}' ({} bytes)", bytes.len());
            let snapshot = Snapshot::from_bytes(bytes)?;
            let engine = Engine::from_snapshot(&snapshot, self.config.foreign_keys)?;
            let saver = self.spawn_saver()?;
            return Ok((Ready { engine, saver }, InitOutcome::Restored));
        }

        log::info!("slot '{slot}' is empty, bootstrapping schema");
        let engine = self.fresh_engine()?;
        Ok((self.start_with(engine)?, InitOutcome::Bootstrapped))
    }

    fn spawn_saver(&self) -> Result<AutoSaver> {
        AutoSaver::spawn(
            Arc::clone(&self.store),
            self.config.slot.clone(),
            self.config.autosave,
        )
    }

    /// Starts the save queue around `engine` and blocks until its snapshot
    /// is stored.
    pub(super) fn start_with(&self, engine: Engine) -> Result<Ready> {
        validate_name("slot", &self.config.slot)?;
        let saver = self.spawn_saver()?;
        saver.schedule(engine.snapshot()?);
        saver.flush()?;
        Ok(Ready { engine, saver })
    }

    /// Builds an engine with the configured schema applied.
    pub(super) fn fresh_engine(&self) -> Result<Engine> {
        let schema = self.config.schema.load()?;
        Engine::bootstrap(&schema, self.config.foreign_keys)
    }

    pub(super) fn ready(&self) -> Result<&Ready> {
        match &self.state {
            State::Ready(ready) => Ok(ready),
            State::Uninitialized => Err(Error::NotInitialized),
        }
    }

    /// Returns true once `initialize()` has succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> DatabaseState {
        match self.state {
            State::Uninitialized => DatabaseState::Uninitialized,
            State::Ready(_) => DatabaseState::Ready,
        }
    }

    /// Returns the service configuration.
    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Returns the durable store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// Reports the progress of the auto-save queue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before initialization.
    pub fn save_status(&self) -> Result<SaveStatus> {
        Ok(self.ready()?.saver.status())
    }

    /// Blocks until every scheduled snapshot has been written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if the newest snapshot could not be
    /// written, or [`Error::NotInitialized`] before initialization.
    pub fn flush(&self) -> Result<()> {
        self.ready()?.saver.flush()
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Database");
        debug
            .field("config", &self.config)
            .field("state", &self.state());
        if let State::Ready(ready) = &self.state {
            debug.field("saver", &ready.saver);
        }
        debug.finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SchemaSource;
    use crate::store::MockSnapshotStore;
    use std::io;

    #[test]
    fn test_first_run_bootstraps_and_persists() {
        let store = MemoryStore::new();
        let mut db = Database::new(DatabaseConfig::default(), Arc::new(store.clone()));
        assert_eq!(db.state(), DatabaseState::Uninitialized);

        assert_eq!(db.initialize().unwrap(), InitOutcome::Bootstrapped);
        assert_eq!(db.state(), DatabaseState::Ready);
        assert!(store.slot_len("protege-lecture").is_some());
        assert_eq!(db.save_status().unwrap().persisted, 1);
    }

    #[test]
    fn test_second_initialize_is_noop() {
        let mut db = Database::in_memory().unwrap();
        assert_eq!(db.initialize().unwrap(), InitOutcome::AlreadyInitialized);
        assert_eq!(db.save_status().unwrap().requested, 1);
    }

    #[test]
    fn test_existing_snapshot_is_restored() {
        let store = MemoryStore::new();
        Database::open(DatabaseConfig::default(), Arc::new(store.clone())).unwrap();

        let mut db = Database::new(DatabaseConfig::default(), Arc::new(store));
        assert_eq!(db.initialize().unwrap(), InitOutcome::Restored);
        assert_eq!(db.save_status().unwrap().requested, 0);
    }

    #[test]
    fn test_no_insert_id_after_either_startup_path() {
        let store = MemoryStore::new();
        let bootstrapped =
            Database::open(DatabaseConfig::default(), Arc::new(store.clone())).unwrap();
        assert_eq!(bootstrapped.last_insert_id().unwrap(), None);
        drop(bootstrapped);

        let restored = Database::open(DatabaseConfig::default(), Arc::new(store)).unwrap();
        assert_eq!(restored.last_insert_id().unwrap(), None);
    }

    #[test]
    fn test_uninitialized_queries_fail() {
        let db = Database::new(DatabaseConfig::default(), Arc::new(MemoryStore::new()));
        assert!(db.query("SELECT 1", &[]).unwrap_err().is_not_initialized());
        assert!(db.flush().unwrap_err().is_not_initialized());
        assert!(db.save_status().is_err());
        assert!(!db.is_initialized());
    }

    #[test]
    fn test_store_read_failure_leaves_uninitialized() {
        let mut store = MockSnapshotStore::new();
        store.expect_get().times(2).returning(|slot| {
            Err(Error::Store {
                operation: "get",
                slot: slot.to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "store blocked"),
            })
        });

        let mut db = Database::new(DatabaseConfig::default(), Arc::new(store));
        let err = db.initialize().unwrap_err();
        assert!(matches!(err, Error::Initialization { .. }));
        assert!(err.to_string().contains("store blocked"));
        assert!(!db.is_initialized());

        assert!(db.initialize().is_err());
        assert!(!db.is_initialized());
    }

    #[test]
    fn test_bad_schema_leaves_store_untouched() {
        let store = MemoryStore::new();
        let config = DatabaseConfig::default()
            .with_schema(SchemaSource::Inline("CREATE TABLE broken (".into()));
        let mut db = Database::new(config, Arc::new(store.clone()));

        assert!(db.initialize().is_err());
        assert!(!db.is_initialized());
        assert!(store.is_empty());
    }

    #[test]
    fn test_garbage_snapshot_fails_initialization() {
        let store = MemoryStore::new();
        store.put("protege-lecture", b"not a database").unwrap();

        let mut db = Database::new(DatabaseConfig::default(), Arc::new(store));
        let err = db.initialize().unwrap_err();
        assert!(err.to_string().contains("invalid snapshot"));
    }

    #[test]
    fn test_invalid_slot_rejected() {
        let config = DatabaseConfig::default().with_slot("../escape");
        let mut db = Database::new(config, Arc::new(MemoryStore::new()));
        assert!(db.initialize().is_err());
    }

    #[test]
    fn test_debug_output() {
        let db = Database::in_memory().unwrap();
        let debug = format!("{db:?}");
        assert!(debug.contains("Ready"));
        assert!(debug.contains("protege-lecture"));
    }
}
