//! Bearer-token identity resolution.
//!
//! Provides the extractor that order routes use to learn who is calling.

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, header::AUTHORIZATION, request::Parts},
};

use order_keeper_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Extractor that requires a valid `Authorization: Bearer <token>` header.
///
/// Resolves the token once per request and caches the identity in the
/// request extensions.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireIdentity(user): RequireIdentity) -> String {
///     format!("hello, user {user}")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireIdentity(pub UserId);

impl FromRequestParts<AppState> for RequireIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Self>() {
            return Ok(*identity);
        }

        let token = bearer_token(parts.headers.get(AUTHORIZATION))?;
        let user_id = state.auth().parse_identity(token)?;

        tracing::Span::current().record("user_id", user_id.as_i32());
        set_sentry_user(&user_id);

        let identity = Self(user_id);
        parts.extensions.insert(identity);
        Ok(identity)
    }
}

/// Pull the token out of an `Authorization` header value.
///
/// # Errors
///
/// Returns `AppError::MissingCredential` when the header is absent or blank,
/// and `AppError::MalformedCredential` unless it is exactly
/// `<Bearer> <token>` (scheme matched case-insensitively).
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, AppError> {
    let Some(value) = header else {
        return Err(AppError::MissingCredential);
    };
    let value = value.to_str().map_err(|_| AppError::MalformedCredential)?;
    if value.trim().is_empty() {
        return Err(AppError::MissingCredential);
    }

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Ok(token)
        }
        _ => Err(AppError::MalformedCredential),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<String, &'static str> {
        let value = HeaderValue::from_str(raw).unwrap();
        match bearer_token(Some(&value)) {
            Ok(token) => Ok(token.to_owned()),
            Err(AppError::MissingCredential) => Err("missing"),
            Err(AppError::MalformedCredential) => Err("malformed"),
            Err(_) => Err("unexpected"),
        }
    }

    #[test]
    fn test_accepts_bearer_in_any_case() {
        assert_eq!(parse("Bearer abc.def.ghi"), Ok("abc.def.ghi".to_owned()));
        assert_eq!(parse("bearer abc.def.ghi"), Ok("abc.def.ghi".to_owned()));
        assert_eq!(parse("BEARER abc.def.ghi"), Ok("abc.def.ghi".to_owned()));
    }

    #[test]
    fn test_missing_or_blank_header() {
        assert!(matches!(bearer_token(None), Err(AppError::MissingCredential)));
        assert_eq!(parse(""), Err("missing"));
        assert_eq!(parse("   "), Err("missing"));
    }

    #[test]
    fn test_malformed_header() {
        assert_eq!(parse("abc.def.ghi"), Err("malformed"));
        assert_eq!(parse("Basic abc.def.ghi"), Err("malformed"));
        assert_eq!(parse("Bearer"), Err("malformed"));
        assert_eq!(parse("Bearer "), Err("malformed"));
        assert_eq!(parse("Bearer  abc.def.ghi"), Err("malformed"));
        assert_eq!(parse("Bearer abc.def.ghi extra"), Err("malformed"));
    }
}
