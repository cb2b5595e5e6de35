//! Signed, time-bounded identity tokens (HS256 JWT).
//!
//! Tokens are stateless: validity depends only on the signature and the
//! `exp` claim. There is no revocation list and no refresh flow.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use order_keeper_core::UserId;

/// How long an issued token stays valid.
pub const TOKEN_TTL: TimeDelta = TimeDelta::hours(12);

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Token validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a decodable JWT, or required claims are missing.
    #[error("malformed token")]
    Malformed,

    /// Signature does not verify against the signing key.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Header names an algorithm other than HS256.
    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,

    /// Signature is valid but the token is past its expiry.
    #[error("token expired")]
    Expired,

    /// Encoding a new token failed.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    user_id: i32,
    iat: i64,
    exp: i64,
}

/// A freshly issued token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates identity tokens with a fixed symmetric key.
///
/// The key is captured once at construction and never re-read.
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenAuthority {
    /// Create an authority signing with `key`.
    #[must_use]
    pub fn new(key: &SecretString) -> Self {
        let secret = key.expose_secret().as_bytes();

        // Expiry is checked against an explicit clock in `validate_at`.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `user_id`, valid for [`TOKEN_TTL`] from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user_id: UserId) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now + TOKEN_TTL;
        let claims = Claims {
            user_id: user_id.as_i32(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Validate `token` and return the user it identifies.
    ///
    /// # Errors
    ///
    /// See [`TokenAuthority::validate_at`].
    pub fn validate(&self, token: &str) -> Result<UserId, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate `token` as if the current time were `now`.
    ///
    /// A token is expired once `now >= exp`. No clock-skew leeway is applied.
    ///
    /// # Errors
    ///
    /// Returns `Malformed`, `InvalidSignature`, `UnexpectedAlgorithm`, or
    /// `Expired`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => TokenError::UnexpectedAlgorithm,
                _ => TokenError::Malformed,
            })?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(UserId::new(data.claims.user_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn authority() -> TokenAuthority {
        TokenAuthority::new(&SecretString::from("k7#Qp2!vX9@mL4$wR8^tY1&zN6*bC3%h"))
    }

    fn at(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap()
    }

    #[test]
    fn test_round_trip_identifies_user() {
        let tokens = authority();
        let issued = tokens.issue(UserId::new(42)).unwrap();
        assert_eq!(tokens.validate(&issued.token).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_valid_just_after_issue_and_expired_after_ttl() {
        let tokens = authority();
        let issued_at = at(1_700_000_000);
        let issued = tokens.issue_at(UserId::new(1), issued_at).unwrap();
        assert_eq!(issued.expires_at, issued_at + TimeDelta::hours(12));

        let one_second = TimeDelta::seconds(1);
        assert!(tokens.validate_at(&issued.token, issued_at + one_second).is_ok());
        assert_eq!(
            tokens.validate_at(&issued.token, issued.expires_at + one_second),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let tokens = authority();
        let issued = tokens.issue_at(UserId::new(1), at(1_700_000_000)).unwrap();

        assert!(
            tokens
                .validate_at(&issued.token, issued.expires_at - TimeDelta::seconds(1))
                .is_ok()
        );
        assert_eq!(
            tokens.validate_at(&issued.token, issued.expires_at),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_other_key_is_invalid_signature() {
        let issued = authority().issue(UserId::new(1)).unwrap();
        let other = TokenAuthority::new(&SecretString::from("Zz9!yY8@xX7#wW6$vV5%uU4^tT3&sS2*"));
        assert_eq!(
            other.validate(&issued.token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_tampered_payload_is_invalid_signature() {
        let tokens = authority();
        let issued = tokens.issue(UserId::new(1)).unwrap();
        let forged = tokens.issue(UserId::new(2)).unwrap();

        let mut parts: Vec<&str> = issued.token.split('.').collect();
        let forged_payload = forged.token.split('.').nth(1).unwrap();
        parts[1] = forged_payload;
        let spliced = parts.join(".");

        assert_eq!(tokens.validate(&spliced), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let key = "k7#Qp2!vX9@mL4$wR8^tY1&zN6*bC3%h";
        let claims = Claims {
            user_id: 1,
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + TOKEN_TTL).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            authority().validate(&token),
            Err(TokenError::UnexpectedAlgorithm)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = authority();
        assert_eq!(tokens.validate("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(tokens.validate(""), Err(TokenError::Malformed));
        assert_eq!(tokens.validate("a.b.c"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_missing_claims_is_malformed() {
        #[derive(Serialize)]
        struct Partial {
            iat: i64,
        }

        let key = "k7#Qp2!vX9@mL4$wR8^tY1&zN6*bC3%h";
        let token = jsonwebtoken::encode(
            &Header::new(ALGORITHM),
            &Partial { iat: 0 },
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap();

        assert_eq!(authority().validate(&token), Err(TokenError::Malformed));
    }
}
