use async_trait::async_trait;
use serde_json::json;

use hitcounter_core::error::Result;
use hitcounter_core::{InvocationRequest, InvocationResponse, RouteKey};

use crate::forward::DownstreamHandler;

/// Greets the caller with the path it hit (proxy-integration response shape).
#[derive(Default)]
pub struct HelloHandler;

impl HelloHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DownstreamHandler for HelloHandler {
    fn name(&self) -> &'static str {
        "hello"
    }

    async fn invoke(&self, req: InvocationRequest) -> Result<InvocationResponse> {
        let path = RouteKey::of(&req);
        tracing::debug!(%path, "hello handler invoked");
        Ok(InvocationResponse::new(json!({
            "statusCode": 200,
            "headers": { "Content-Type": "text/plain" },
            "body": format!("Hello! You've hit {path}\n"),
        })))
    }
}
