//! Invocation forwarders.
//!
//! A forwarder delivers one request to a named downstream handler and returns
//! its output verbatim. It never retries: the single attempt is the only side
//! effect it adds.
//!
//! - `local`: in-process handlers registered by name.
//! - `http`: remote handlers reached by POSTing JSON to a URL.

pub mod http;
pub mod local;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use hitcounter_core::error::Result;
use hitcounter_core::{InvocationRequest, InvocationResponse};

use crate::config::{DownstreamKind, DownstreamSection};

pub use http::HttpForwarder;
pub use local::{DownstreamHandler, LocalForwarder};

#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Deliver `request` to `target`.
    ///
    /// Errors are `DownstreamError` when the handler ran and reported a fault,
    /// `DownstreamUnreachable` when it could not be invoked.
    async fn forward(&self, target: &str, request: InvocationRequest) -> Result<InvocationResponse>;
}

/// Build the forwarder selected by config. Local forwarders come with the
/// built-in handlers registered.
pub fn build(cfg: &DownstreamSection) -> Result<Arc<dyn Forwarder>> {
    let timeout = Duration::from_millis(cfg.timeout_ms);
    match cfg.kind {
        DownstreamKind::Local => {
            let fwd = LocalForwarder::new(timeout);
            crate::handlers::register_builtin(&fwd);
            Ok(Arc::new(fwd))
        }
        DownstreamKind::Http => Ok(Arc::new(HttpForwarder::new(timeout)?)),
    }
}
