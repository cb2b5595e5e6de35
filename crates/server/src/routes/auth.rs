//! Registration and sign-in handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use order_keeper_core::UserId;

use crate::error::{AppError, Result};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Sign-up request body.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: SecretString,
    pub username: String,
}

/// Sign-up response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignUpResponse {
    pub id: UserId,
    pub message: String,
}

/// Sign-in request body.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: SecretString,
}

/// Sign-in response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new user.
#[instrument(skip_all)]
pub async fn sign_up(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<Json<SignUpResponse>> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let id = state
        .auth()
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok(Json(SignUpResponse {
        id,
        message: "User created successfully".to_string(),
    }))
}

/// Exchange username and password for a bearer token.
#[instrument(skip_all)]
pub async fn sign_in(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<SignInResponse>> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    if req.username.trim().is_empty() {
        return Err(AppError::Validation("username is required".to_string()));
    }
    if req.password.expose_secret().is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }

    let issued = state.auth().login(&req.username, &req.password).await?;

    Ok(Json(SignInResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        message: "Signed in successfully".to_string(),
    }))
}
