//! HTTP forwarder and gateway router over loopback sockets.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};

use hitcounter_core::error::{HitCounterError, Result};
use hitcounter_core::{InvocationRequest, InvocationResponse};
use hitcounter_gateway::app_state::AppState;
use hitcounter_gateway::config;
use hitcounter_gateway::forward::{DownstreamHandler, Forwarder, HttpForwarder, LocalForwarder};
use hitcounter_gateway::handlers;
use hitcounter_gateway::router::build_router;
use hitcounter_gateway::store::MemoryCounterStore;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn downstream() -> SocketAddr {
    let app = Router::new()
        .route("/ok", post(|Json(v): Json<Value>| async move { Json(json!({ "got": v })) }))
        .route("/fail", post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "kaboom") }))
        .route("/text", post(|| async { "plain" }))
        .route(
            "/slow",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
    serve(app).await
}

#[tokio::test]
async fn http_forwarder_relays_json_verbatim() {
    let addr = downstream().await;
    let fwd = HttpForwarder::new(Duration::from_secs(2)).unwrap();

    let resp = fwd
        .forward(
            &format!("http://{addr}/ok"),
            InvocationRequest::new(json!({ "path": "/p", "body": "b" })),
        )
        .await
        .unwrap();
    assert_eq!(resp.as_value(), &json!({ "got": { "path": "/p", "body": "b" } }));

    let resp = fwd
        .forward(&format!("http://{addr}/text"), InvocationRequest::new(json!({})))
        .await
        .unwrap();
    assert_eq!(resp.as_value(), &json!("plain"));
}

#[tokio::test]
async fn http_forwarder_classifies_failures() {
    let addr = downstream().await;
    let fwd = HttpForwarder::new(Duration::from_millis(300)).unwrap();

    let err = fwd
        .forward(&format!("http://{addr}/fail"), InvocationRequest::new(json!({})))
        .await
        .expect_err("downstream fault");
    assert_eq!(err, HitCounterError::DownstreamError("kaboom".into()));

    let err = fwd
        .forward(&format!("http://{addr}/slow"), InvocationRequest::new(json!({})))
        .await
        .expect_err("timeout");
    assert!(matches!(err, HitCounterError::DownstreamUnreachable(_)), "{err}");

    let closed = {
        let l = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap()
    };
    let err = fwd
        .forward(&format!("http://{closed}/ok"), InvocationRequest::new(json!({})))
        .await
        .expect_err("nothing listening");
    assert!(matches!(err, HitCounterError::DownstreamUnreachable(_)), "{err}");
}

/// Answers every request with a 200 that promises more body than it sends.
async fn truncating_downstream() -> SocketAddr {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();

        // Drain the request (headers + Content-Length body) before replying.
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_ascii_lowercase();
            if let Some(end) = text.find("\r\n\r\n") {
                let want = text[..end]
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + want {
                    break;
                }
            }
        }

        sock.write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"par")
            .await
            .unwrap();
        sock.shutdown().await.unwrap();
    });
    addr
}

#[tokio::test]
async fn http_forwarder_treats_broken_body_as_downstream_fault() {
    let addr = truncating_downstream().await;
    let fwd = HttpForwarder::new(Duration::from_secs(2)).unwrap();

    let err = fwd
        .forward(&format!("http://{addr}/"), InvocationRequest::new(json!({ "path": "/t" })))
        .await
        .expect_err("body cut short");
    assert!(matches!(err, HitCounterError::DownstreamError(_)), "{err}");
}

struct FailingHandler;

#[async_trait]
impl DownstreamHandler for FailingHandler {
    fn name(&self) -> &'static str {
        "fail"
    }
    async fn invoke(&self, _req: InvocationRequest) -> Result<InvocationResponse> {
        Err(HitCounterError::DownstreamError("boom".into()))
    }
}

async fn gateway(target: &str) -> SocketAddr {
    let cfg = config::load_from_str(&format!(
        "version: 1\ndownstream: {{ target: {target} }}\ndashboard: {{ title: Test Hits }}\n"
    ))
    .unwrap();

    let fwd = LocalForwarder::new(Duration::from_secs(1));
    handlers::register_builtin(&fwd);
    fwd.register(Arc::new(FailingHandler));

    let state = AppState::from_parts(cfg, Arc::new(MemoryCounterStore::new()), Arc::new(fwd)).unwrap();
    serve(build_router(state)).await
}

#[tokio::test]
async fn gateway_proxies_and_exposes_hits() {
    let addr = gateway("hello").await;
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let resp = client.get(format!("http://{addr}/hello")).send().await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["content-type"].to_str().unwrap(),
            "text/plain"
        );
        assert_eq!(resp.text().await.unwrap(), "Hello! You've hit /hello\n");
    }
    client.get(format!("http://{addr}/other")).send().await.unwrap();

    let hits: Value = client
        .get(format!("http://{addr}/_ops/hits"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        hits,
        json!({
            "title": "Test Hits",
            "records": [
                { "key": "/hello", "hits": 3 },
                { "key": "/other", "hits": 1 }
            ]
        })
    );

    let top: Value = client
        .get(format!("http://{addr}/_ops/hits?limit=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(top["records"].as_array().unwrap().len(), 1);

    let metrics = client
        .get(format!("http://{addr}/_ops/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics.contains("hitcounter_invocations_total{outcome=\"ok\"} 4"), "{metrics}");
    assert!(metrics.contains("hitcounter_hits_recorded_total 4"), "{metrics}");
}

#[tokio::test]
async fn gateway_relays_downstream_errors() {
    let addr = gateway("fail").await;
    let client = reqwest::Client::new();

    let resp = client.post(format!("http://{addr}/boom")).body("x").send().await.unwrap();
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "code": "DOWNSTREAM_ERROR", "msg": "boom" }));

    let hits: Value = client
        .get(format!("http://{addr}/_ops/hits"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hits["records"], json!([{ "key": "/boom", "hits": 1 }]));
}

#[tokio::test]
async fn gateway_echo_returns_request_body() {
    let addr = gateway("echo").await;
    let client = reqwest::Client::new();

    let v: Value = client
        .put(format!("http://{addr}/items?id=7"))
        .body("payload")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(v, json!({ "echo": "payload" }));
}

#[tokio::test]
async fn gateway_passes_binary_body_through_as_base64() {
    let addr = gateway("echo").await;
    let client = reqwest::Client::new();

    let resp = client
        .put(format!("http://{addr}/blob"))
        .body(vec![0xffu8, 0xfe, 0x00])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let v: Value = resp.json().await.unwrap();
    assert_eq!(v, json!({ "echo": "//4A" }));

    let hits: Value = client
        .get(format!("http://{addr}/_ops/hits"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hits["records"], json!([{ "key": "/blob", "hits": 1 }]));
}

#[tokio::test]
async fn ops_endpoints_are_not_proxied() {
    let addr = gateway("echo").await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("http://{addr}/_ops/healthz")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let resp = client.get(format!("http://{addr}/_ops/readyz")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let resp = client.get(format!("http://{addr}/_ops/unknown")).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    let hits: Value = client
        .get(format!("http://{addr}/_ops/hits"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hits["records"], json!([]));
}
