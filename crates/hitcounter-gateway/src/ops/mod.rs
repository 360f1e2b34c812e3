//! Operational HTTP endpoints.
//!
//! - `/_ops/healthz` : liveness
//! - `/_ops/readyz`  : readiness (503 when draining)
//! - `/_ops/metrics` : Prometheus text format
//! - `/_ops/hits`    : counter records for the dashboard, most hit first

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use hitcounter_core::sort_by_hits_desc;

use crate::app_state::AppState;
use crate::transport::codec;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.metrics().render();

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct HitsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

pub async fn hits(State(state): State<AppState>, Query(q): Query<HitsQuery>) -> Response {
    let mut records = match state.store().list().await {
        Ok(r) => r,
        Err(e) => return codec::error_response(&e),
    };
    sort_by_hits_desc(&mut records);
    if let Some(limit) = q.limit {
        records.truncate(limit);
    }

    Json(json!({
        "title": state.cfg().dashboard.title,
        "records": records,
    }))
    .into_response()
}
