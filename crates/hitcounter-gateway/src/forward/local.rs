use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use hitcounter_core::error::{HitCounterError, Result};
use hitcounter_core::{InvocationRequest, InvocationResponse};

use super::Forwarder;

/// In-process downstream handler.
#[async_trait]
pub trait DownstreamHandler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn invoke(&self, req: InvocationRequest) -> Result<InvocationResponse>;
}

/// Registry of named handlers, invoked with a per-call timeout.
pub struct LocalForwarder {
    handlers: DashMap<&'static str, Arc<dyn DownstreamHandler>>,
    timeout: Duration,
}

impl LocalForwarder {
    pub fn new(timeout: Duration) -> Self {
        Self {
            handlers: DashMap::new(),
            timeout,
        }
    }

    pub fn register(&self, handler: Arc<dyn DownstreamHandler>) {
        self.handlers.insert(handler.name(), handler);
    }
}

#[async_trait]
impl Forwarder for LocalForwarder {
    async fn forward(&self, target: &str, request: InvocationRequest) -> Result<InvocationResponse> {
        let handler = self
            .handlers
            .get(target)
            .ok_or_else(|| HitCounterError::DownstreamUnreachable(format!("unknown handler: {target}")))?
            .value()
            .clone();

        match tokio::time::timeout(self.timeout, handler.invoke(request)).await {
            Ok(Ok(resp)) => Ok(resp),
            Ok(Err(HitCounterError::DownstreamError(fault))) => {
                Err(HitCounterError::DownstreamError(fault))
            }
            Ok(Err(other)) => Err(HitCounterError::DownstreamError(other.to_string())),
            Err(_) => Err(HitCounterError::DownstreamUnreachable(format!(
                "handler {target} timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}
