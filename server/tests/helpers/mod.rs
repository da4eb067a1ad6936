//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum router,
//! plus utilities for signing bodies and counting handler calls.
//!
//! ## Test Servers
//!
//! Use [`spawn_test_server()`] when a test needs a real socket
//! instead of `tower::ServiceExt::oneshot`.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tokio::task::JoinHandle;
use tower::ServiceExt;
use wp_webhook::webhooks::{sign_payload, SIGNATURE_HEADER};
use wp_webhook::{Config, WebhookServer};

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping a [`WebhookServer`] and its router.
pub struct TestApp {
    pub server: WebhookServer,
    pub config: Config,
}

impl TestApp {
    /// Create a test app with the default test config.
    pub fn new() -> Self {
        Self::with_config(Config::default_for_test())
    }

    /// Create a test app with a custom config.
    pub fn with_config(config: Config) -> Self {
        Self {
            server: WebhookServer::new(config.clone()),
            config,
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Build a POST to `uri` carrying a valid signature for `body`.
    pub fn signed_post(&self, uri: &str, body: &[u8]) -> Request<Body> {
        let signature = sign_payload(self.config.secret.expose(), body);
        Self::request(Method::POST, uri)
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body.to_vec()))
            .expect("valid request")
    }

    /// Build a handshake GET for `uri` with the given token and challenge.
    pub fn handshake(uri: &str, mode: &str, token: &str, challenge: &str) -> Request<Body> {
        let uri = format!(
            "{uri}?hub.mode={mode}&hub.verify_token={token}&hub.challenge={challenge}"
        );
        Self::request(Method::GET, &uri)
            .body(Body::empty())
            .expect("valid request")
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.server
            .router()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }
}

/// Collect a response body into bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
        .to_vec()
}

/// Assert status and an empty body.
pub async fn assert_bare_status(response: Response<Body>, status: StatusCode) {
    assert_eq!(response.status(), status);
    assert!(body_bytes(response).await.is_empty(), "body should be empty");
}

// ============================================================================
// Handler helpers
// ============================================================================

/// Shared call counter for handler closures.
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Test Server
// ============================================================================

/// A running test server bound to a random port.
pub struct TestServer {
    /// Server address (127.0.0.1:PORT).
    pub addr: SocketAddr,
    /// Base URL for HTTP requests (e.g., `http://127.0.0.1:12345`).
    pub url: String,
    /// Handle to the server task for cleanup.
    _handle: JoinHandle<()>,
}

/// Spawn a real HTTP server on a random port.
pub async fn spawn_test_server(router: Router) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local addr");
    let url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    TestServer {
        addr,
        url,
        _handle: handle,
    }
}
