//! Axum router wiring.
//!
//! `/_ops/*` serves health, metrics and the hit records; every other path is
//! an invocation routed through the hit-counting proxy.

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/_ops/healthz", get(ops::healthz))
        .route("/_ops/readyz", get(ops::readyz))
        .route("/_ops/metrics", get(ops::metrics))
        .route("/_ops/hits", get(ops::hits))
        .fallback(transport::http::invoke)
        .with_state(state)
}
