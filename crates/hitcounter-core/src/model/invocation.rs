//! Opaque invocation payloads.
//!
//! Both wrappers expose read-only views only. The proxy borrows a request to
//! derive its route key and then moves it, untouched, to the forwarder.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload delivered to a downstream handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationRequest(Value);

impl InvocationRequest {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// Request path, if the payload is an object with a string `path`.
    pub fn path(&self) -> Option<&str> {
        self.0.get("path").and_then(Value::as_str)
    }

    /// Request body, if present.
    pub fn body(&self) -> Option<&Value> {
        self.0.get("body")
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for InvocationRequest {
    fn from(v: Value) -> Self {
        Self(v)
    }
}

/// Output of a downstream handler, relayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationResponse(Value);

impl InvocationResponse {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// `statusCode` of a proxy-integration style response.
    pub fn status_code(&self) -> Option<u16> {
        self.0
            .get("statusCode")
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for InvocationResponse {
    fn from(v: Value) -> Self {
        Self(v)
    }
}
