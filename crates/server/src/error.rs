//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! Responses carry only the error taxonomy:
//!
//! ```json
//! { "error": "order not found", "code": "NOT_FOUND" }
//! ```
//!
//! `details` is present only for validation errors and only ever describes
//! the caller's own input. Store, hashing, and signing failures are logged
//! and reported, never echoed.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::{AuthError, TokenError};
use crate::services::orders::OrderError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body, path, or query could not be accepted.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// No `Authorization` header on a protected route.
    #[error("Missing credential")]
    MissingCredential,

    /// `Authorization` header is not `Bearer <token>`.
    #[error("Malformed credential")]
    MalformedCredential,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

const INTERNAL: (StatusCode, &str) = (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR");

impl AppError {
    /// HTTP status and stable machine-readable code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::MissingCredential => (StatusCode::UNAUTHORIZED, "MISSING_CREDENTIAL"),
            Self::MalformedCredential => (StatusCode::UNAUTHORIZED, "MALFORMED_CREDENTIAL"),
            Self::Internal(_) => INTERNAL,
            Self::Order(err) => repository_status(err.kind()),
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_)
                | AuthError::InvalidUsername(_)
                | AuthError::WeakPassword(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "AUTHENTICATION_FAILED")
                }
                AuthError::UserAlreadyExists => (StatusCode::CONFLICT, "CONFLICT"),
                AuthError::Token(token) => match token {
                    TokenError::Malformed => (StatusCode::UNAUTHORIZED, "MALFORMED_TOKEN"),
                    TokenError::InvalidSignature | TokenError::UnexpectedAlgorithm => {
                        (StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE")
                    }
                    TokenError::Expired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
                    TokenError::Signing(_) => INTERNAL,
                },
                AuthError::Repository(repo) => repository_status(repo),
                AuthError::PasswordHash => INTERNAL,
            },
        }
    }

    /// Client-safe message.
    fn public_message(&self) -> &'static str {
        let (status, code) = self.status_and_code();
        match code {
            "VALIDATION_ERROR" => "Invalid request",
            "AUTHENTICATION_FAILED" => "Invalid username or password",
            "MISSING_CREDENTIAL" => "Missing bearer token",
            "MALFORMED_CREDENTIAL" => "Authorization header must be 'Bearer <token>'",
            "MALFORMED_TOKEN" => "Malformed token",
            "INVALID_SIGNATURE" => "Invalid token signature",
            "TOKEN_EXPIRED" => "Token expired",
            "CONFLICT" => "Username or email already registered",
            "NOT_FOUND" => "Order not found",
            "TIMEOUT" => "Request timed out, please retry",
            _ if status.is_server_error() => "Internal server error",
            _ => "Request failed",
        }
    }

    /// Caller-input description for validation failures.
    fn details(&self) -> Option<String> {
        match self {
            Self::Validation(msg) => Some(msg.clone()),
            Self::Auth(
                err @ (AuthError::InvalidEmail(_)
                | AuthError::InvalidUsername(_)
                | AuthError::WeakPassword(_)),
            ) => Some(err.to_string()),
            _ => None,
        }
    }
}

/// Status and code for a store error surfacing through a service.
fn repository_status(err: &RepositoryError) -> (StatusCode, &'static str) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        RepositoryError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        RepositoryError::Timeout { .. } => (StatusCode::SERVICE_UNAVAILABLE, "TIMEOUT"),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => INTERNAL,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                code,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, code, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.public_message().to_string(),
            code,
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::to_bytes;
    use order_keeper_core::EmailError;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Validation("status: unknown".to_string());
        assert_eq!(err.to_string(), "Validation error: status: unknown");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation("x".into()), 400, "VALIDATION_ERROR"),
            (AppError::MissingCredential, 401, "MISSING_CREDENTIAL"),
            (AppError::MalformedCredential, 401, "MALFORMED_CREDENTIAL"),
            (
                AppError::Auth(AuthError::InvalidCredentials),
                401,
                "AUTHENTICATION_FAILED",
            ),
            (
                AppError::Auth(AuthError::Token(TokenError::Expired)),
                401,
                "TOKEN_EXPIRED",
            ),
            (
                AppError::Auth(AuthError::Token(TokenError::UnexpectedAlgorithm)),
                401,
                "INVALID_SIGNATURE",
            ),
            (
                AppError::Auth(AuthError::Token(TokenError::Malformed)),
                401,
                "MALFORMED_TOKEN",
            ),
            (AppError::Auth(AuthError::UserAlreadyExists), 409, "CONFLICT"),
            (AppError::Internal("boom".into()), 500, "INTERNAL_ERROR"),
            (AppError::Auth(AuthError::PasswordHash), 500, "INTERNAL_ERROR"),
        ];

        for (err, status, code) in cases {
            let (actual_status, actual_code) = err.status_and_code();
            assert_eq!(actual_status.as_u16(), status, "{err}");
            assert_eq!(actual_code, code, "{err}");
        }
    }

    #[test]
    fn test_store_errors_through_auth() {
        let timeout = AppError::Auth(AuthError::Repository(RepositoryError::Timeout {
            operation: "users.find_by_username",
            timeout: Duration::from_secs(5),
        }));
        assert_eq!(
            timeout.status_and_code(),
            (StatusCode::SERVICE_UNAVAILABLE, "TIMEOUT")
        );

        let corrupt = AppError::Auth(AuthError::Repository(RepositoryError::DataCorruption(
            "bad row".into(),
        )));
        assert_eq!(corrupt.status_and_code(), INTERNAL);
    }

    #[tokio::test]
    async fn test_validation_body_has_details() {
        let (status, body) =
            render(AppError::Auth(AuthError::InvalidEmail(EmailError::MissingAtSymbol))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"], "invalid email: email must contain an @ symbol");
    }

    #[tokio::test]
    async fn test_internal_body_hides_cause() {
        let (status, body) = render(AppError::Internal("pool exhausted at 10.0.0.5".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(body.get("details").is_none());
        assert!(!body.to_string().contains("10.0.0.5"));
    }
}
