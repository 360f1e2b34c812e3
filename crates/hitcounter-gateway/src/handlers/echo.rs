use async_trait::async_trait;
use serde_json::{json, Value};

use hitcounter_core::error::Result;
use hitcounter_core::{InvocationRequest, InvocationResponse};

use crate::forward::DownstreamHandler;

/// Echo the request body back as `{"echo": body}`. Useful to prove pass-through.
#[derive(Default)]
pub struct EchoHandler;

impl EchoHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DownstreamHandler for EchoHandler {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn invoke(&self, req: InvocationRequest) -> Result<InvocationResponse> {
        let body = req.body().cloned().unwrap_or(Value::Null);
        Ok(InvocationResponse::new(json!({ "echo": body })))
    }
}
