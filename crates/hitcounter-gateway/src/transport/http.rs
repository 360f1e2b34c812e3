//! Catch-all invocation handler.
//!
//! Every request outside `/_ops/` is decoded once into an invocation and
//! handed to the proxy; the outcome is encoded back as-is.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::transport::codec;

pub const OPS_PREFIX: &str = "/_ops/";

pub async fn invoke(
    State(app): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Response {
    if uri.path().starts_with(OPS_PREFIX) {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }

    let req = codec::decode(&method, &uri, &headers, &query, &body);
    codec::encode(app.proxy().handle(req).await)
}
