//! Whole-store read/write lock
//!
//! Resets and alert status writes take the write half; summaries take the
//! read half, so a summary never observes a partially reset grid.

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub struct StoreGuard {
    lock: RwLock<()>,
}

impl StoreGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().await
    }
}
