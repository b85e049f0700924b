use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-key async mutexes with get-or-create semantics.
///
/// Submissions for the same (student, exercise) pair must derive their
/// attempt number and append their event as one unit; holding the key's lock
/// across both steps keeps attempt numbering monotonic under concurrent
/// resubmission. Locks for different keys never contend with each other; the
/// outer map lock is only held long enough to clone the entry's Arc.
pub struct KeyedLocks<K> {
    inner: parking_lot::Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            inner: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    pub async fn acquire(&self, key: K) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock();
            map.entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}
