//! hitcounter gateway library entry.
//!
//! This crate wires the counter store, the invocation forwarders and the
//! hit-counting proxy behind an HTTP router. It is intended to be consumed by
//! the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod forward;
pub mod handlers;
pub mod obs;
pub mod ops;
pub mod proxy;
pub mod router;
pub mod store;
pub mod transport;

pub use proxy::{HitCountingProxy, ProxyConfig};
