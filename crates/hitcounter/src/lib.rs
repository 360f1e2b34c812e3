//! Top-level facade crate for hitcounter.
//!
//! Re-exports the core model and the gateway library so users can depend on a single crate.

pub mod core {
    pub use hitcounter_core::*;
}

pub mod gateway {
    pub use hitcounter_gateway::*;
}
