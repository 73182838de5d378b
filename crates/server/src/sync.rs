//! Per-key mutation serialization.
//!
//! Cart and order mutations are serialized per owner/order key so that
//! read-modify-write cycles do not interleave. The versioned saves in
//! the store layer remain the backstop for writers that bypass the lock
//! (other processes against the same database).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// A registry of per-key async mutexes.
///
/// Locks are created on first use and live for the registry's lifetime;
/// the key space (users, orders) is small enough that reclamation is not
/// worth the bookkeeping.
#[derive(Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting behind earlier holders.
    pub async fn acquire(&self, key: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(key).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of keys ever locked. Test observability only.
    #[cfg(test)]
    async fn key_count(&self) -> usize {
        self.locks.lock().await.len()
    }
}
