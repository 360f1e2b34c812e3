//! hitcounter gateway
//!
//! - Every path except `/_ops/*` is an invocation of the configured downstream
//! - Each invocation records one hit for its path before it is forwarded
//! - `/_ops/hits` exposes the counters for a dashboard
//! - Ctrl-C drains: readiness flips to 503, in-flight requests complete

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use hitcounter_core::error::{HitCounterError, Result};
use hitcounter_gateway::{app_state, config, router};

const DEFAULT_CONFIG_PATH: &str = "hitcounter.yaml";

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "hitcounter-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .map_err(|e| HitCounterError::BadRequest(format!("gateway.listen: {e}")))?;

    let state = app_state::AppState::new(cfg).await?;
    let app = router::build_router(state.clone());

    tracing::info!(
        %listen,
        downstream = %state.proxy().downstream_target(),
        "hitcounter-gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| HitCounterError::Internal(format!("bind failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| HitCounterError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal(state: app_state::AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "ctrl-c handler failed; draining now");
    }
    state.set_draining();
    tracing::info!("draining");
}
