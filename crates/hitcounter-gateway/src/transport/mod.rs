//! Transport layer (HTTP).
//!
//! Exposes the catch-all invocation handler and the codec that maps HTTP
//! requests to invocation payloads and invocation outcomes back to HTTP.

pub mod codec;
pub mod http;
