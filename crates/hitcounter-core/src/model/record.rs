use serde::{Deserialize, Serialize};

use super::route::RouteKey;

/// One counter entry as committed by the store.
///
/// `hits` never decreases over the lifetime of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRecord {
    pub key: RouteKey,
    pub hits: u64,
}

impl CounterRecord {
    pub fn new(key: impl Into<RouteKey>, hits: u64) -> Self {
        Self { key: key.into(), hits }
    }
}

/// Order records for display: descending hits, then ascending key.
pub fn sort_by_hits_desc(records: &mut [CounterRecord]) {
    records.sort_by(|a, b| b.hits.cmp(&a.hits).then_with(|| a.key.cmp(&b.key)));
}
