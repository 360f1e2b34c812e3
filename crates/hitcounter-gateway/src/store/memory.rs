use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use hitcounter_core::error::Result;
use hitcounter_core::{CounterRecord, RouteKey};

use super::CounterStore;

/// Process-local counter store.
///
/// Existing keys are bumped under a shard read lock; a first hit takes the
/// shard write lock through `entry`, which makes create-if-absent and the
/// increment a single step.
#[derive(Default)]
pub struct MemoryCounterStore {
    map: DashMap<RouteKey, AtomicU64>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    fn bump(&self, key: &RouteKey) -> u64 {
        if let Some(c) = self.map.get(key) {
            return c.fetch_add(1, Ordering::AcqRel) + 1;
        }
        let c = self
            .map
            .entry(key.clone())
            .or_insert_with(|| AtomicU64::new(0));
        c.fetch_add(1, Ordering::AcqRel) + 1
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &RouteKey) -> Result<u64> {
        Ok(self.bump(key))
    }

    async fn get(&self, key: &RouteKey) -> Result<Option<u64>> {
        Ok(self.map.get(key).map(|c| c.load(Ordering::Acquire)))
    }

    async fn list(&self) -> Result<Vec<CounterRecord>> {
        Ok(self
            .map
            .iter()
            .map(|r| CounterRecord {
                key: r.key().clone(),
                hits: r.value().load(Ordering::Acquire),
            })
            .collect())
    }
}
