//! Per-session lock registry.

use crate::session::SessionId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Lock serializing turns on one session.
pub type SessionLock = Arc<tokio::sync::Mutex<()>>;

#[derive(Debug)]
struct Entry {
    lock: SessionLock,
    last_used: Instant,
}

/// Maps session ids to the lock that serializes their turns.
///
/// Insert, lookup, removal and eviction each happen under one registry-wide
/// mutex, so no caller observes a half-updated map. The registry mutex is
/// never held across an `.await`.
#[derive(Debug, Default)]
pub struct LockRegistry {
    entries: Mutex<HashMap<SessionId, Entry>>,
}

impl LockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh, unlocked lock for `id`, replacing any previous one.
    #[instrument(skip(self))]
    pub fn register(&self, id: SessionId) {
        let entry = Entry {
            lock: Arc::new(tokio::sync::Mutex::new(())),
            last_used: Instant::now(),
        };
        self.entries().insert(id, entry);
        debug!(session_id = %id, "Lock registered");
    }

    /// Returns the lock for `id` and marks it as used, or `None` if the
    /// session has no entry.
    #[instrument(skip(self))]
    pub fn get(&self, id: &SessionId) -> Option<SessionLock> {
        let mut entries = self.entries();
        let entry = entries.get_mut(id)?;
        entry.last_used = Instant::now();
        Some(Arc::clone(&entry.lock))
    }

    /// Removes the entry for `id`. Returns whether one existed.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &SessionId) -> bool {
        let removed = self.entries().remove(id).is_some();
        debug!(session_id = %id, removed, "Lock deregistered");
        removed
    }

    /// Checks if `id` has a registered lock.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.entries().contains_key(id)
    }

    /// Number of registered locks.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Checks if no lock is registered.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Removes entries unused for at least `max_idle`.
    ///
    /// An entry whose lock is held or awaited by any caller is kept, whatever
    /// its age: every such caller owns a clone of the `Arc`, and clones are
    /// only handed out under the registry mutex.
    #[instrument(skip(self))]
    pub fn evict_idle(&self, max_idle: Duration) -> Vec<SessionId> {
        let now = Instant::now();
        let mut entries = self.entries();
        let idle: Vec<SessionId> = entries
            .iter()
            .filter(|(_, entry)| {
                now.duration_since(entry.last_used) >= max_idle
                    && Arc::strong_count(&entry.lock) == 1
            })
            .map(|(id, _)| *id)
            .collect();

        for id in &idle {
            entries.remove(id);
        }

        if !idle.is_empty() {
            info!(evicted = idle.len(), remaining = entries.len(), "Evicted idle session locks");
        }
        idle
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<SessionId, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
