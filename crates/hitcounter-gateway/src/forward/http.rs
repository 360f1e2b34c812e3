use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use hitcounter_core::error::{HitCounterError, Result};
use hitcounter_core::{InvocationRequest, InvocationResponse};

use super::Forwarder;

/// Forwards by POSTing the request JSON to the target URL.
///
/// 2xx bodies are returned as JSON (or as a JSON string when they are not
/// JSON). Once a status line has arrived, non-2xx statuses and unreadable
/// bodies are the downstream's own fault; send errors and timeouts before
/// that mean it was never reached.
pub struct HttpForwarder {
    client: reqwest::Client,
}

impl HttpForwarder {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HitCounterError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward(&self, target: &str, request: InvocationRequest) -> Result<InvocationResponse> {
        let resp = self
            .client
            .post(target)
            .json(request.as_value())
            .send()
            .await
            .map_err(|e| HitCounterError::DownstreamUnreachable(e.to_string()))?;

        // From here the handler has run; a broken body is its fault, not reachability.
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| {
            HitCounterError::DownstreamError(format!("{status}: response body unreadable: {e}"))
        })?;

        if !status.is_success() {
            let fault = if body.is_empty() {
                status.to_string()
            } else {
                String::from_utf8_lossy(&body).into_owned()
            };
            return Err(HitCounterError::DownstreamError(fault));
        }

        let payload = serde_json::from_slice::<Value>(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));
        Ok(InvocationResponse::new(payload))
    }
}
