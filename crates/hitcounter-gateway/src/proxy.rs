//! Hit-counting proxy.
//!
//! Per invocation: derive the route key, record one hit, forward the request
//! unchanged to the configured downstream, relay the outcome unchanged.
//!
//! Ordering is count-then-forward: a hit means "this endpoint was attempted",
//! so it is recorded even when the downstream then fails. Counting is
//! best-effort: a store failure is logged and metered, and the request is
//! forwarded anyway. Neither leg is retried or compensated, which gives
//! at-least-once counting under caller retries.
//!
//! The proxy keeps no state across invocations; everything durable lives in
//! the counter store.

use std::sync::Arc;
use std::time::Instant;

use hitcounter_core::error::Result;
use hitcounter_core::{InvocationRequest, InvocationResponse, RouteKey};

use crate::forward::Forwarder;
use crate::obs::ProxyMetrics;
use crate::store::CounterStore;

/// Construction options of the proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Fixed downstream handler identifier.
    pub downstream_target: String,
}

pub struct HitCountingProxy {
    store: Arc<dyn CounterStore>,
    forwarder: Arc<dyn Forwarder>,
    target: String,
    metrics: Arc<ProxyMetrics>,
}

impl HitCountingProxy {
    pub fn new(
        cfg: ProxyConfig,
        store: Arc<dyn CounterStore>,
        forwarder: Arc<dyn Forwarder>,
    ) -> Self {
        Self::with_metrics(cfg, store, forwarder, Arc::new(ProxyMetrics::default()))
    }

    pub fn with_metrics(
        cfg: ProxyConfig,
        store: Arc<dyn CounterStore>,
        forwarder: Arc<dyn Forwarder>,
        metrics: Arc<ProxyMetrics>,
    ) -> Self {
        Self {
            store,
            forwarder,
            target: cfg.downstream_target,
            metrics,
        }
    }

    pub fn downstream_target(&self) -> &str {
        &self.target
    }

    pub fn metrics(&self) -> &Arc<ProxyMetrics> {
        &self.metrics
    }

    pub async fn handle(&self, request: InvocationRequest) -> Result<InvocationResponse> {
        let key = RouteKey::of(&request);

        self.record_hit(&key).await;

        let _inflight = InflightGuard::new(&self.metrics);
        let started = Instant::now();
        let res = self.forwarder.forward(&self.target, request).await;
        self.metrics.forward_duration.observe(&[], started.elapsed());

        match &res {
            Ok(_) => self.metrics.invocations.inc(&[("outcome", "ok")]),
            Err(e) => {
                let outcome = e.client_code().as_str().to_ascii_lowercase();
                self.metrics.invocations.inc(&[("outcome", outcome.as_str())]);
                tracing::warn!(route = %key, downstream = %self.target, error = %e, "downstream failed");
            }
        }
        res
    }

    async fn record_hit(&self, key: &RouteKey) {
        match self.store.increment(key).await {
            Ok(hits) => {
                self.metrics.hits_recorded.inc(&[]);
                tracing::debug!(route = %key, hits, "hit recorded");
            }
            Err(e) => {
                self.metrics.store_failures.inc(&[]);
                tracing::warn!(route = %key, error = %e, "hit not recorded; forwarding anyway");
            }
        }
    }
}

/// Keeps `hitcounter_inflight` balanced even if the caller drops the future.
struct InflightGuard<'a> {
    metrics: &'a ProxyMetrics,
}

impl<'a> InflightGuard<'a> {
    fn new(metrics: &'a ProxyMetrics) -> Self {
        metrics.inflight.inc(&[]);
        Self { metrics }
    }
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.metrics.inflight.dec(&[]);
    }
}
