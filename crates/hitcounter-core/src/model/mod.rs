//! Model types shared by the proxy, the counter store and the forwarders.
//!
//! - `RouteKey`: stable identifier of the logical endpoint being hit.
//! - `CounterRecord`: `(key, hits)` pair owned by the counter store.
//! - `InvocationRequest` / `InvocationResponse`: opaque JSON payloads relayed
//!   unchanged between caller and downstream handler.

pub mod invocation;
pub mod record;
pub mod route;

pub use invocation::{InvocationRequest, InvocationResponse};
pub use record::CounterRecord;
pub use route::RouteKey;
