//! Store-backed pessimistic lock
//!
//! A lock record is a document whose identifier equals the locked resource's
//! id; its mere existence under the collection's unique constraint is the
//! lock. Acquisition is an atomic insert-if-absent; a duplicate-key conflict
//! means someone else holds the lock. Blocking acquisition polls the insert
//! on a fixed interval until it succeeds or the deadline passes; there is no
//! wake-up channel on the store, so polling is the wait mechanism.
//!
//! Each lock instance keeps a local set of ids it currently owns. Re-locking
//! an owned id returns immediately; two instances in one process are distinct
//! actors and contend normally.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use docmap_core::{Collection, Document, Error, Result, Value, ID_FIELD};

/// Default deadline for blocking acquisition
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(300);

/// Default interval between insert attempts while waiting
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Cross-process pessimistic lock over a document collection
pub struct PessimisticLock {
    collection: Arc<dyn Collection>,
    /// Ids currently held by this instance
    owned: Mutex<HashSet<String>>,
    poll_interval: Duration,
    default_timeout: Duration,
}

impl PessimisticLock {
    /// Create a lock over `collection` with the default timing
    /// ([`DEFAULT_LOCK_TIMEOUT`], [`DEFAULT_POLL_INTERVAL`])
    pub fn new(collection: Arc<dyn Collection>) -> Self {
        Self::with_timing(collection, DEFAULT_POLL_INTERVAL, DEFAULT_LOCK_TIMEOUT)
    }

    /// Create a lock with explicit poll interval and default timeout
    pub fn with_timing(
        collection: Arc<dyn Collection>,
        poll_interval: Duration,
        default_timeout: Duration,
    ) -> Self {
        PessimisticLock {
            collection,
            owned: Mutex::new(HashSet::new()),
            poll_interval,
            default_timeout,
        }
    }

    /// Ensure the unique constraint on the identifier field exists.
    ///
    /// Idempotent; called once at setup by the owning process, not on the
    /// per-lock hot path.
    pub fn create_indexes(&self) -> Result<()> {
        self.collection.create_unique_index(ID_FIELD)
    }

    /// Acquire the lock for `id`, blocking up to the default timeout
    pub fn lock(&self, id: &str) -> Result<()> {
        self.lock_with(id, true, self.default_timeout)
    }

    /// Acquire the lock for `id`.
    ///
    /// With `blocking` false a held lock fails immediately with
    /// [`Error::LockContention`]. With `blocking` true the insert is retried
    /// every poll interval until it succeeds or `timeout` elapses, then fails
    /// with [`Error::LockTimeout`] naming the id and the waited seconds.
    ///
    /// Re-locking an id this instance already owns returns immediately.
    /// Store failures other than the duplicate-key conflict propagate
    /// unchanged.
    pub fn lock_with(&self, id: &str, blocking: bool, timeout: Duration) -> Result<()> {
        if self.owned.lock().contains(id) {
            trace!(id, "lock re-entered");
            return Ok(());
        }

        let started = Instant::now();
        loop {
            match self.try_insert(id) {
                Ok(()) => {
                    self.owned.lock().insert(id.to_string());
                    debug!(id, "lock acquired");
                    return Ok(());
                }
                Err(Error::DuplicateKey { .. }) => {
                    if !blocking {
                        return Err(Error::LockContention { id: id.to_string() });
                    }
                    if started.elapsed() >= timeout {
                        return Err(Error::LockTimeout {
                            id: id.to_string(),
                            seconds: timeout.as_secs(),
                        });
                    }
                    trace!(id, "lock held elsewhere, polling");
                    thread::sleep(self.poll_interval);
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Release the lock for `id`.
    ///
    /// Deletes the lock record and clears local ownership. Unlocking an id
    /// that is not held deletes nothing and is not an error.
    pub fn unlock(&self, id: &str) -> Result<()> {
        self.collection.delete_one(&Self::record_criteria(id))?;
        self.owned.lock().remove(id);
        debug!(id, "lock released");
        Ok(())
    }

    /// Acquire the lock for `id` and return a guard releasing it on drop
    pub fn acquire(&self, id: &str) -> Result<LockGuard<'_>> {
        self.acquire_with(id, true, self.default_timeout)
    }

    /// Guard-returning form of [`lock_with`](Self::lock_with)
    pub fn acquire_with(&self, id: &str, blocking: bool, timeout: Duration) -> Result<LockGuard<'_>> {
        self.lock_with(id, blocking, timeout)?;
        Ok(LockGuard {
            lock: self,
            id: id.to_string(),
        })
    }

    fn try_insert(&self, id: &str) -> Result<()> {
        let mut record = Document::new();
        record.insert(ID_FIELD.to_string(), Value::from(id));
        record.insert(
            "acquired_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        self.collection.insert_one(record).map(|_| ())
    }

    fn record_criteria(id: &str) -> Document {
        let mut criteria = Document::new();
        criteria.insert(ID_FIELD.to_string(), Value::from(id));
        criteria
    }
}

/// Scoped lock ownership
///
/// Releases the lock when dropped, on every exit path including unwinding.
/// A failed release is logged, never propagated from `drop`.
pub struct LockGuard<'a> {
    lock: &'a PessimisticLock,
    id: String,
}

impl LockGuard<'_> {
    /// Id of the locked resource
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.lock.unlock(&self.id) {
            warn!(id = %self.id, error = %err, "failed to release lock");
        }
    }
}
