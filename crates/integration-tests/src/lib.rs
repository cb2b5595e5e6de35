//! Integration test harness for Order Keeper.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no database, no network)
//! cargo test -p order-keeper-integration-tests
//!
//! # Live-server tests against a running instance
//! ORDER_KEEPER_BASE_URL=http://localhost:8000 \
//!     cargo test -p order-keeper-integration-tests -- --ignored
//! ```
//!
//! [`TestApp`] drives the real router with `tower::ServiceExt::oneshot`,
//! backed by the in-memory stores.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use order_keeper_server::{
    app,
    db::memory::{MemoryCredentialStore, MemoryOrderStore},
    services::{Services, TokenAuthority},
    state::AppState,
};

/// Signing key shared by every in-process app.
pub const TEST_SIGNING_KEY: &str = "k7#Qp2!vX9@mL4$wR8^tY1&zN6*bC3%h";

/// Status, headers, and decoded body of one response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    /// Parsed JSON, or the raw text as a JSON string if it was not JSON.
    pub body: Value,
}

impl TestResponse {
    /// The `code` field of an error body.
    #[must_use]
    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}

/// The full application over fresh in-memory stores.
pub struct TestApp {
    router: Router,
    /// The authority the app validates against, for minting edge-case tokens.
    pub tokens: Arc<TokenAuthority>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_key(TEST_SIGNING_KEY)
    }

    /// An app whose tokens are signed with `key`.
    #[must_use]
    pub fn new_with_key(key: &str) -> Self {
        let tokens = Arc::new(TokenAuthority::new(&SecretString::from(key)));
        let services = Services::new(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryOrderStore::new()),
            Arc::clone(&tokens),
        );

        Self {
            router: app(AppState::without_database(services)),
            tokens,
        }
    }

    /// Send one request through the router.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.dispatch(request).await
    }

    /// Send a pre-built request through the router.
    pub async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Register a user and return the assigned ID.
    pub async fn sign_up(&self, username: &str, email: &str, password: &str) -> i64 {
        let res = self
            .send(
                Method::POST,
                "/auth/sign-up",
                None,
                Some(json!({"username": username, "email": email, "password": password})),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "sign-up failed: {}", res.body);
        res.body["id"].as_i64().unwrap()
    }

    /// Sign in and return the bearer token.
    pub async fn sign_in(&self, username: &str, password: &str) -> String {
        let res = self
            .send(
                Method::POST,
                "/auth/sign-in",
                None,
                Some(json!({"username": username, "password": password})),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "sign-in failed: {}", res.body);
        res.body["token"].as_str().unwrap().to_owned()
    }

    /// Register and sign in a user in one step.
    pub async fn user(&self, username: &str) -> String {
        let email = format!("{username}@example.test");
        self.sign_up(username, &email, "secret1").await;
        self.sign_in(username, "secret1").await
    }

    /// Create an order as the token holder and return its ID.
    pub async fn create_order(&self, token: &str, status: &str) -> i64 {
        let res = self
            .send(
                Method::POST,
                "/order",
                Some(token),
                Some(json!({ "status": status })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "create failed: {}", res.body);
        res.body["id"].as_i64().unwrap()
    }
}
