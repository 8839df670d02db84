//! Per-admin serialization
//!
//! Publish, upgrade and grant hold the lock of the admin whose balance they
//! change for the whole load-check-commit sequence. The store's version check
//! still guards against writers in other processes.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of one async mutex per admin
#[derive(Debug, Clone, Default)]
pub struct AdminLocks {
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl AdminLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `admin_id`'s balance
    pub async fn lock(&self, admin_id: Uuid) -> OwnedMutexGuard<()> {
        // Entries nobody holds or waits on can go
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);

        let lock = self.locks.entry(admin_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Number of admins with a held or awaited lock
    pub fn active(&self) -> usize {
        self.locks
            .iter()
            .filter(|entry| Arc::strong_count(entry.value()) > 1)
            .count()
    }
}
