//! Counter store contracts, checked against both implementations.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use hitcounter_core::RouteKey;
use hitcounter_gateway::store::{CounterStore, FileCounterStore, MemoryCounterStore};

async fn stores(dir: &tempfile::TempDir) -> Vec<(&'static str, Arc<dyn CounterStore>)> {
    let file = FileCounterStore::open(dir.path().join("hits.log"), Duration::from_secs(5))
        .await
        .unwrap();
    let memory: Arc<dyn CounterStore> = Arc::new(MemoryCounterStore::new());
    let file: Arc<dyn CounterStore> = Arc::new(file);
    vec![("memory", memory), ("file", file)]
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_increments_are_never_lost() {
    let dir = tempfile::tempdir().unwrap();
    for (name, store) in stores(&dir).await {
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let key = RouteKey::from("/hot");
                let mut seen = Vec::new();
                for _ in 0..25 {
                    seen.push(store.increment(&key).await.unwrap());
                }
                seen
            }));
        }

        let mut all = Vec::new();
        for t in tasks {
            all.extend(t.await.unwrap());
        }
        all.sort_unstable();

        // Every returned value is distinct: each call was applied exactly once.
        let expected: Vec<u64> = (1..=400).collect();
        assert_eq!(all, expected, "store={name}");
        assert_eq!(store.get(&RouteKey::from("/hot")).await.unwrap(), Some(400), "store={name}");
    }
}

#[tokio::test]
async fn first_increment_creates_record_at_one() {
    let dir = tempfile::tempdir().unwrap();
    for (name, store) in stores(&dir).await {
        let key = RouteKey::from("/new");
        assert_eq!(store.get(&key).await.unwrap(), None, "store={name}");
        assert_eq!(store.increment(&key).await.unwrap(), 1, "store={name}");
        assert_eq!(store.get(&key).await.unwrap(), Some(1), "store={name}");
    }
}

#[tokio::test]
async fn get_does_not_mutate() {
    let dir = tempfile::tempdir().unwrap();
    for (name, store) in stores(&dir).await {
        let key = RouteKey::from("/read");
        store.increment(&key).await.unwrap();
        for _ in 0..3 {
            assert_eq!(store.get(&key).await.unwrap(), Some(1), "store={name}");
        }
        assert_eq!(store.list().await.unwrap().len(), 1, "store={name}");
    }
}

#[tokio::test]
async fn list_returns_exactly_the_incremented_keys() {
    let dir = tempfile::tempdir().unwrap();
    for (name, store) in stores(&dir).await {
        for k in ["a", "a", "b", "a"] {
            store.increment(&RouteKey::from(k)).await.unwrap();
        }

        let got: BTreeMap<String, u64> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.key.into_string(), r.hits))
            .collect();
        let want = BTreeMap::from([("a".to_string(), 3), ("b".to_string(), 1)]);
        assert_eq!(got, want, "store={name}");
    }
}
