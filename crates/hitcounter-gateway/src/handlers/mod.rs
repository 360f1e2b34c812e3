//! Built-in downstream handlers for the local forwarder.

pub mod echo;
pub mod hello;

use std::sync::Arc;

use crate::forward::LocalForwarder;

pub use echo::EchoHandler;
pub use hello::HelloHandler;

/// Names of the handlers `register_builtin` installs.
pub const BUILTIN: [&str; 2] = ["hello", "echo"];

pub fn register_builtin(fwd: &LocalForwarder) {
    fwd.register(Arc::new(HelloHandler::new()));
    fwd.register(Arc::new(EchoHandler::new()));
}
