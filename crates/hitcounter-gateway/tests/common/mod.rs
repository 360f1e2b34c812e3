//! Test doubles shared by the gateway integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use hitcounter_core::error::{HitCounterError, Result};
use hitcounter_core::{CounterRecord, InvocationRequest, InvocationResponse, RouteKey};
use hitcounter_gateway::forward::Forwarder;
use hitcounter_gateway::store::CounterStore;

/// Store whose durable medium is never reachable.
pub struct UnavailableStore;

#[async_trait]
impl CounterStore for UnavailableStore {
    async fn increment(&self, _key: &RouteKey) -> Result<u64> {
        Err(HitCounterError::StoreUnavailable("medium offline".into()))
    }
    async fn get(&self, _key: &RouteKey) -> Result<Option<u64>> {
        Err(HitCounterError::StoreUnavailable("medium offline".into()))
    }
    async fn list(&self) -> Result<Vec<CounterRecord>> {
        Err(HitCounterError::StoreUnavailable("medium offline".into()))
    }
}

/// Forwarder that records what it was given and replies with a fixed outcome.
/// When a store is attached it also records the hit count observed at
/// forward time.
pub struct RecordingForwarder {
    reply: Result<InvocationResponse>,
    pub seen: Mutex<Vec<(String, InvocationRequest)>>,
    pub hits_at_forward: Mutex<Vec<Option<u64>>>,
    observed: Option<Arc<dyn CounterStore>>,
}

impl RecordingForwarder {
    pub fn replying(reply: Result<InvocationResponse>) -> Self {
        Self {
            reply,
            seen: Mutex::new(Vec::new()),
            hits_at_forward: Mutex::new(Vec::new()),
            observed: None,
        }
    }

    pub fn observing(mut self, store: Arc<dyn CounterStore>) -> Self {
        self.observed = Some(store);
        self
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl Forwarder for RecordingForwarder {
    async fn forward(&self, target: &str, request: InvocationRequest) -> Result<InvocationResponse> {
        if let Some(store) = &self.observed {
            let hits = store.get(&RouteKey::of(&request)).await.unwrap();
            self.hits_at_forward.lock().unwrap().push(hits);
        }
        self.seen
            .lock()
            .unwrap()
            .push((target.to_string(), request));
        self.reply.clone()
    }
}
