//! Per-record serialization for the overtime workflow.
//!
//! [`RecordLocks`] hands out one async mutex per attendance record id, so
//! submissions and reviews touching the same record run one at a time while
//! different records proceed in parallel. Entries are dropped from the map
//! once nobody holds or waits for them, including when a waiting `acquire`
//! future is cancelled.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// Keyed single-flight locks.
#[derive(Debug, Default)]
pub struct RecordLocks {
    locks: Arc<Mutex<LockMap>>,
}

/// Holds the lock for one key until dropped.
#[derive(Debug)]
pub struct RecordGuard {
    // Field order matters: the mutex guard must be released before the sweep runs.
    _guard: OwnedMutexGuard<()>,
    _sweep: Sweep,
}

/// Removes a key's entry on drop once the map holds the only handle to it.
#[derive(Debug)]
struct Sweep {
    key: String,
    locks: Arc<Mutex<LockMap>>,
}

impl RecordLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`.
    ///
    /// Dropping the returned future before it resolves leaves no entry
    /// behind.
    pub async fn acquire(&self, key: &str) -> RecordGuard {
        // Declared first so it drops last if this future is cancelled.
        let sweep = Sweep {
            key: key.to_string(),
            locks: self.locks.clone(),
        };

        let mutex = {
            let mut map = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(key.to_string()).or_default().clone()
        };

        RecordGuard {
            _guard: mutex.lock_owned().await,
            _sweep: sweep,
        }
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for Sweep {
    fn drop(&mut self) {
        let mut map = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        let idle = map
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1);
        if idle {
            map.remove(&self.key);
        }
    }
}
