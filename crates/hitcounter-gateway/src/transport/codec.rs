//! HTTP <-> invocation codec.
//!
//! - Request => proxy-integration style event (`path`, `httpMethod`, `headers`,
//!   `multiValueHeaders`, `queryStringParameters`,
//!   `multiValueQueryStringParameters`, `body`, `isBase64Encoded`)
//! - Response with numeric `statusCode` => status + headers + body, where a
//!   body flagged `isBase64Encoded` is decoded back to bytes
//! - Any other response => JSON 200
//! - Errors => `{"code", "msg"}` with a status derived from the client code
//!
//! Decoding never rejects a request: repeated headers and query parameters
//! keep every value, and non-UTF-8 bodies travel as base64.

use axum::{
    body::Bytes,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Map, Value};

use hitcounter_core::error::{ClientCode, HitCounterError, Result};
use hitcounter_core::{InvocationRequest, InvocationResponse};

/// Single-value map (last value wins) plus multi-value map (all values, in order).
fn collect_pairs<'a>(pairs: impl Iterator<Item = (&'a str, String)>) -> (Value, Value) {
    let mut single = Map::new();
    let mut multi = Map::new();
    for (k, v) in pairs {
        single.insert(k.to_string(), Value::String(v.clone()));
        if let Value::Array(vals) = multi
            .entry(k)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            vals.push(Value::String(v));
        }
    }
    if single.is_empty() {
        (Value::Null, Value::Null)
    } else {
        (Value::Object(single), Value::Object(multi))
    }
}

pub fn decode(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    query: &[(String, String)],
    body: &Bytes,
) -> InvocationRequest {
    let (hdrs, multi_hdrs) = collect_pairs(headers.iter().map(|(name, value)| {
        (name.as_str(), String::from_utf8_lossy(value.as_bytes()).into_owned())
    }));
    let (query, multi_query) =
        collect_pairs(query.iter().map(|(k, v)| (k.as_str(), v.clone())));

    let (body, is_base64) = if body.is_empty() {
        (Value::Null, false)
    } else {
        match std::str::from_utf8(body) {
            Ok(s) => (Value::String(s.to_string()), false),
            Err(_) => (Value::String(BASE64.encode(body)), true),
        }
    };

    InvocationRequest::new(json!({
        "path": uri.path(),
        "httpMethod": method.as_str(),
        "headers": hdrs,
        "multiValueHeaders": multi_hdrs,
        "queryStringParameters": query,
        "multiValueQueryStringParameters": multi_query,
        "body": body,
        "isBase64Encoded": is_base64,
    }))
}

pub fn encode(res: Result<InvocationResponse>) -> Response {
    match res {
        Ok(resp) => encode_ok(resp),
        Err(e) => error_response(&e),
    }
}

fn encode_ok(resp: InvocationResponse) -> Response {
    let Some(code) = resp.status_code() else {
        return (StatusCode::OK, Json(resp.into_value())).into_response();
    };
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);

    let value = resp.into_value();
    let is_base64 = value.get("isBase64Encoded").and_then(Value::as_bool) == Some(true);
    let body: Vec<u8> = match value.get("body") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) if is_base64 => match BASE64.decode(s) {
            Ok(b) => b,
            Err(e) => {
                return error_response(&HitCounterError::DownstreamError(format!(
                    "response body flagged base64 but is not: {e}"
                )))
            }
        },
        Some(Value::String(s)) => s.clone().into_bytes(),
        Some(other) => other.to_string().into_bytes(),
    };

    let mut out = (status, body).into_response();
    // Drop the octet-stream default; the handler's headers decide.
    out.headers_mut().remove(header::CONTENT_TYPE);

    if let Some(Value::Object(h)) = value.get("headers") {
        for (k, v) in h {
            let Some(v) = v.as_str() else { continue };
            if let (Ok(name), Ok(val)) = (HeaderName::try_from(k.as_str()), HeaderValue::from_str(v)) {
                out.headers_mut().insert(name, val);
            }
        }
    }
    if let Some(Value::Object(h)) = value.get("multiValueHeaders") {
        for (k, vals) in h {
            let Ok(name) = HeaderName::try_from(k.as_str()) else { continue };
            let Some(vals) = vals.as_array() else { continue };
            out.headers_mut().remove(&name);
            for v in vals.iter().filter_map(Value::as_str) {
                if let Ok(val) = HeaderValue::from_str(v) {
                    out.headers_mut().append(name.clone(), val);
                }
            }
        }
    }
    out
}

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest => StatusCode::BAD_REQUEST,
        ClientCode::DownstreamError => StatusCode::BAD_GATEWAY,
        ClientCode::DownstreamUnreachable => StatusCode::SERVICE_UNAVAILABLE,
        ClientCode::StoreUnavailable | ClientCode::UnsupportedVersion | ClientCode::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn error_response(e: &HitCounterError) -> Response {
    let code = e.client_code();
    let msg = match e {
        HitCounterError::DownstreamError(fault) => fault.clone(),
        other => other.to_string(),
    };
    let mut resp = (status_for(code), Json(json!({ "code": code.as_str(), "msg": msg }))).into_response();
    resp.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    resp
}
