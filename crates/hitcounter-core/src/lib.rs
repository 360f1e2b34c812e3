//! hitcounter core: transport-agnostic model types and the shared error surface.
//!
//! This crate defines the route key, counter record and opaque invocation
//! payloads exchanged between the gateway, the counter store and the
//! downstream forwarders. It carries no runtime or transport dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod model;

/// Shared result type.
pub use error::{HitCounterError, Result};
pub use model::{record::sort_by_hits_desc, CounterRecord, InvocationRequest, InvocationResponse, RouteKey};
