//! Counter store: route key -> hit count.
//!
//! The store is the only owner of counter records. `increment` creates the
//! record on first hit and bumps it in one atomic step per key, so concurrent
//! callers never lose an update.

pub mod file;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use hitcounter_core::error::Result;
use hitcounter_core::{CounterRecord, RouteKey};

use crate::config::{StoreKind, StoreSection};

pub use file::FileCounterStore;
pub use memory::MemoryCounterStore;

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Add one hit and return the committed post-increment value.
    ///
    /// Fails only with `StoreUnavailable`, and only when nothing was committed.
    async fn increment(&self, key: &RouteKey) -> Result<u64>;

    /// Read-only lookup.
    async fn get(&self, key: &RouteKey) -> Result<Option<u64>>;

    /// Snapshot of committed records, in no particular order.
    async fn list(&self) -> Result<Vec<CounterRecord>>;
}

/// Build the store selected by config.
pub async fn open(cfg: &StoreSection) -> Result<Arc<dyn CounterStore>> {
    match cfg.kind {
        StoreKind::Memory => Ok(Arc::new(MemoryCounterStore::new())),
        StoreKind::File => {
            let path = cfg.path.as_deref().unwrap_or_default();
            let store = FileCounterStore::open(
                path,
                std::time::Duration::from_millis(cfg.lock_timeout_ms),
            )
            .await?;
            Ok(Arc::new(store))
        }
    }
}
