//! Background persistence of snapshots.
//!
//! Every persisted mutation hands a fresh [`Snapshot`] to the [`AutoSaver`],
//! which writes it to the durable store on a dedicated thread. The saver
//! holds at most one pending snapshot: a newer one replaces an older one
//! that has not been picked up yet, since it already contains the older
//! effects. The single writer takes one snapshot at a time, so writes reach
//! the store in mutation order and an older image can never overwrite a
//! newer one.
//!
//! ```text
//!   run/exec ──schedule(gen n)──▶ [ pending slot ] ──▶ writer thread ──put──▶ store
//!                                  (replaced by n+1)     (retries with backoff)
//! ```

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::store::SnapshotStore;

use super::snapshot::Snapshot;

const WORKER_THREAD_NAME: &str = "protege-autosave";

/// Retry policy for failed snapshot writes.
///
/// # Examples
///
/// ```
/// use protege::database::AutosavePolicy;
/// use std::time::Duration;
///
/// let policy = AutosavePolicy::default();
/// assert_eq!(policy.backoff(0), Duration::from_millis(50));
/// assert_eq!(policy.backoff(1), Duration::from_millis(100));
/// assert_eq!(policy.backoff(30), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosavePolicy {
    /// Retries after the first failed write of a snapshot.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for the doubling delay.
    pub max_backoff: Duration,
}

impl Default for AutosavePolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl AutosavePolicy {
    /// Delay before retry number `attempt` (zero-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Progress of the auto-save queue.
///
/// Generations count scheduled snapshots, starting at 1. `persisted` is the
/// newest generation known to be in the durable store; since each snapshot
/// holds the full database, everything up to it is durable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveStatus {
    /// Generation of the newest scheduled snapshot.
    pub requested: u64,
    /// Generation of the newest snapshot written to the store.
    pub persisted: u64,
    /// When the last successful write completed.
    pub last_saved_at: Option<DateTime<Utc>>,
    /// The last write failure, cleared by the next successful write.
    pub last_error: Option<String>,
}

impl SaveStatus {
    /// True when every scheduled snapshot has been persisted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.persisted == self.requested && self.last_error.is_none()
    }
}

#[derive(Default)]
struct SaveState {
    pending: Option<(u64, Snapshot)>,
    requested: u64,
    completed: u64,
    persisted: u64,
    last_saved_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
    shutdown: bool,
    worker_exited: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<SaveState>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SaveState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, SaveState>) -> MutexGuard<'a, SaveState> {
        self.changed
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// The serialized save queue and its writer thread.
pub(crate) struct AutoSaver {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl AutoSaver {
    /// Spawns the writer thread for `slot` of `store`.
    pub(crate) fn spawn(
        store: Arc<dyn SnapshotStore>,
        slot: String,
        policy: AutosavePolicy,
    ) -> Result<Self> {
        let shared = Arc::new(Shared::default());
        let worker = Worker {
            shared: Arc::clone(&shared),
            store,
            slot,
            policy,
        };

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || worker.run())?;

        Ok(Self {
            shared,
            worker: Some(handle),
        })
    }

    /// Queues `snapshot` for writing and returns its generation.
    pub(crate) fn schedule(&self, snapshot: Snapshot) -> u64 {
        let mut state = self.shared.lock();
        state.requested += 1;
        let generation = state.requested;
        if let Some((replaced, _)) = state.pending.replace((generation, snapshot)) {
            log::debug!("snapshot generation {replaced} superseded by {generation}");
        }
        self.shared.changed.notify_all();
        generation
    }

    /// Blocks until every snapshot scheduled so far has been handled.
    ///
    /// Succeeds if the newest scheduled snapshot (or a later one) reached
    /// the store.
    pub(crate) fn flush(&self) -> Result<()> {
        let mut state = self.shared.lock();
        let target = state.requested;
        while state.completed < target && !state.worker_exited {
            state = self.shared.wait(state);
        }

        if state.persisted >= target {
            return Ok(());
        }
        let message = if state.completed < target {
            "auto-save worker stopped before the snapshot was written".to_string()
        } else {
            state
                .last_error
                .clone()
                .unwrap_or_else(|| "snapshot was not written".to_string())
        };
        Err(Error::Persistence { message })
    }

    pub(crate) fn status(&self) -> SaveStatus {
        let state = self.shared.lock();
        SaveStatus {
            requested: state.requested,
            persisted: state.persisted,
            last_saved_at: state.last_saved_at,
            last_error: state.last_error.clone(),
        }
    }
}

impl fmt::Debug for AutoSaver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoSaver")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock();
            state.shutdown = true;
            self.shared.changed.notify_all();
        }
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("auto-save worker panicked");
            }
        }
    }
}

struct Worker {
    shared: Arc<Shared>,
    store: Arc<dyn SnapshotStore>,
    slot: String,
    policy: AutosavePolicy,
}

// Marks the worker as gone even when it unwinds, so `flush` cannot hang.
struct ExitGuard(Arc<Shared>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.worker_exited = true;
        self.0.changed.notify_all();
    }
}

impl Worker {
    fn run(self) {
        let _guard = ExitGuard(Arc::clone(&self.shared));

        while let Some((generation, snapshot)) = self.next_job() {
            let outcome = self.write_with_retry(generation, &snapshot);

            let mut state = self.shared.lock();
            state.completed = generation;
            match outcome {
                Ok(()) => {
                    state.persisted = generation;
                    state.last_saved_at = Some(Utc::now());
                    state.last_error = None;
                }
                Err(e) => {
                    log::error!("giving up on snapshot generation {generation}: {e}");
                    state.last_error = Some(e.to_string());
                }
            }
            self.shared.changed.notify_all();
        }
    }

    /// Waits for a pending snapshot. Returns `None` once shut down and drained.
    fn next_job(&self) -> Option<(u64, Snapshot)> {
        let mut state = self.shared.lock();
        loop {
            if let Some(job) = state.pending.take() {
                return Some(job);
            }
            if state.shutdown {
                return None;
            }
            state = self.shared.wait(state);
        }
    }

    fn write_with_retry(&self, generation: u64, snapshot: &Snapshot) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.store.put(&self.slot, snapshot.as_bytes()) {
                Ok(()) => {
                    log::debug!(
                        "saved snapshot generation {generation} ({} bytes)",
                        snapshot.len()
                    );
                    return Ok(());
                }
                Err(e) if attempt < self.policy.max_retries => {
                    let delay = self.policy.backoff(attempt);
                    attempt += 1;
                    log::warn!(
                        "saving snapshot generation {generation} failed (attempt {attempt}): {e}; retrying in {delay:?}"
                    );
                    thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
