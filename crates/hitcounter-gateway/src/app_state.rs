//! Shared application state for the hitcounter gateway.
//!
//! Built once at startup from config: opens the counter store, builds the
//! forwarder, and wires both into the proxy. Startup errors are returned, not
//! panicked.

use std::sync::Arc;

use hitcounter_core::error::Result;

use crate::config::{DownstreamKind, GatewayConfig};
use crate::forward::{self, Forwarder};
use crate::obs::ProxyMetrics;
use crate::proxy::{HitCountingProxy, ProxyConfig};
use crate::store::{self, CounterStore};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    store: Arc<dyn CounterStore>,
    proxy: HitCountingProxy,
    metrics: Arc<ProxyMetrics>,
}

impl AppState {
    pub async fn new(cfg: GatewayConfig) -> Result<Self> {
        let store = store::open(&cfg.store).await?;
        let forwarder = forward::build(&cfg.downstream)?;
        Self::from_parts(cfg, store, forwarder)
    }

    /// Wire state from already-built collaborators.
    pub fn from_parts(
        cfg: GatewayConfig,
        store: Arc<dyn CounterStore>,
        forwarder: Arc<dyn Forwarder>,
    ) -> Result<Self> {
        cfg.validate()?;
        if cfg.downstream.kind == DownstreamKind::Local
            && !crate::handlers::BUILTIN.contains(&cfg.downstream.target.as_str())
        {
            tracing::warn!(downstream = %cfg.downstream.target, "downstream.target is not a built-in handler");
        }

        let metrics = Arc::new(ProxyMetrics::default());
        let proxy = HitCountingProxy::with_metrics(
            ProxyConfig {
                downstream_target: cfg.downstream.target.clone(),
            },
            Arc::clone(&store),
            forwarder,
            Arc::clone(&metrics),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                store,
                proxy,
                metrics,
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn proxy(&self) -> &HitCountingProxy {
        &self.inner.proxy
    }

    /// Read side of the counter store (dashboard).
    pub fn store(&self) -> Arc<dyn CounterStore> {
        Arc::clone(&self.inner.store)
    }

    pub fn metrics(&self) -> Arc<ProxyMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }
}
