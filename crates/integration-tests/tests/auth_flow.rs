//! Registration and sign-in through the HTTP router.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use order_keeper_integration_tests::TestApp;

#[tokio::test]
async fn test_sign_up_then_sign_in() {
    let app = TestApp::new();

    let res = app
        .send(
            Method::POST,
            "/auth/sign-up",
            None,
            Some(json!({"username": "alice", "email": "a@x.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["id"].as_i64().unwrap() > 0);
    assert_eq!(res.body["message"], "User created successfully");

    let res = app
        .send(
            Method::POST,
            "/auth/sign-in",
            None,
            Some(json!({"username": "alice", "password": "secret1"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(!res.body["token"].as_str().unwrap().is_empty());
    assert!(res.body["expires_at"].is_string());
}

#[tokio::test]
async fn test_duplicate_sign_up_conflicts() {
    let app = TestApp::new();
    app.sign_up("alice", "a@x.com", "secret1").await;

    for body in [
        json!({"username": "alice", "email": "other@x.com", "password": "secret1"}),
        json!({"username": "alice2", "email": "a@x.com", "password": "secret1"}),
    ] {
        let res = app.send(Method::POST, "/auth/sign-up", None, Some(body)).await;
        assert_eq!(res.status, StatusCode::CONFLICT);
        assert_eq!(res.code(), "CONFLICT");
    }
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
    let app = TestApp::new();
    app.sign_up("alice", "a@x.com", "secret1").await;

    let wrong_password = app
        .send(
            Method::POST,
            "/auth/sign-in",
            None,
            Some(json!({"username": "alice", "password": "wrong-pass"})),
        )
        .await;
    let unknown_user = app
        .send(
            Method::POST,
            "/auth/sign-in",
            None,
            Some(json!({"username": "nobody", "password": "secret1"})),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.code(), "AUTHENTICATION_FAILED");
    assert_eq!(wrong_password.status, unknown_user.status);
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_sign_up_validation_errors() {
    let app = TestApp::new();

    let cases = [
        json!({"username": "alice", "email": "not-an-email", "password": "secret1"}),
        json!({"username": "alice", "email": "a@x.com", "password": "short"}),
        json!({"username": "a b", "email": "a@x.com", "password": "secret1"}),
        json!({"username": "alice", "email": "a@x.com"}),
    ];

    for body in cases {
        let res = app
            .send(Method::POST, "/auth/sign-up", None, Some(body.clone()))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert!(res.body["details"].is_string());
    }
}

#[tokio::test]
async fn test_sign_in_requires_fields() {
    let app = TestApp::new();

    let res = app
        .send(
            Method::POST,
            "/auth/sign-in",
            None,
            Some(json!({"username": "", "password": "secret1"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.code(), "VALIDATION_ERROR");

    let res = app.send(Method::POST, "/auth/sign-in", None, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_password_never_echoed() {
    let app = TestApp::new();

    let res = app
        .send(
            Method::POST,
            "/auth/sign-up",
            None,
            Some(json!({"username": "alice", "email": "bad", "password": "hunter2-secret"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(!res.body.to_string().contains("hunter2-secret"));
}
