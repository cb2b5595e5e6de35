//! Authentication service.
//!
//! Password registration and login, plus turning bearer tokens back into
//! user identities.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{IssuedToken, TokenAuthority, TokenError};

use std::sync::{Arc, LazyLock};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};

use order_keeper_core::{Email, UserId, Username};

use crate::db::{CredentialStore, RepositoryError};
use crate::models::NewUser;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash verified against when the username is unknown, so a miss costs the
/// same as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    Argon2::default()
        .hash_password(b"order-keeper-dummy", &SaltString::generate(&mut OsRng))
        .map(|hash| hash.to_string())
        .ok()
});

/// Authentication service.
///
/// Handles user registration, login, and token parsing.
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    tokens: Arc<TokenAuthority>,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(users: Arc<dyn CredentialStore>, tokens: Arc<TokenAuthority>) -> Self {
        Self { users, tokens }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` or `AuthError::InvalidEmail` for
    /// malformed input, `AuthError::WeakPassword` if the password is too
    /// short, and `AuthError::UserAlreadyExists` if the username or email is
    /// taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<UserId, AuthError> {
        let username = Username::parse(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password.clone()).await?;

        let id = self
            .users
            .create_user(&NewUser {
                username,
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %id, "user registered");
        Ok(id)
    }

    /// Verify credentials and issue a token.
    ///
    /// An unknown username and a wrong password are indistinguishable to the
    /// caller; the distinction is only logged.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is
    /// wrong.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<IssuedToken, AuthError> {
        let user = match Username::parse(username) {
            Ok(username) => match self.users.find_by_username(&username).await {
                Ok(user) => Some(user),
                Err(RepositoryError::NotFound) => None,
                Err(e) => return Err(e.into()),
            },
            Err(_) => None,
        };

        let Some(user) = user else {
            burn_verification(password.clone()).await;
            tracing::warn!(username, reason = "unknown user", "login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        if let Err(e) = verify_password(password.clone(), user.password_hash.clone()).await {
            tracing::warn!(user_id = %user.id, reason = "password mismatch", "login rejected");
            return Err(e);
        }

        let issued = self.tokens.issue(user.id)?;
        tracing::info!(user_id = %user.id, "user signed in");
        Ok(issued)
    }

    /// Resolve a bearer token to the user it identifies.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if the token is malformed, forged, or
    /// expired.
    pub fn parse_identity(&self, token: &str) -> Result<UserId, AuthError> {
        Ok(self.tokens.validate(token)?)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password requirements.
fn validate_password(password: &SecretString) -> Result<(), AuthError> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id on the blocking pool.
async fn hash_password(password: SecretString) -> Result<SecretString, AuthError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map(|hash| SecretString::from(hash.to_string()))
            .map_err(|_| AuthError::PasswordHash)
    })
    .await
    .map_err(|_| AuthError::PasswordHash)?
}

/// Verify a password against a stored hash on the blocking pool.
async fn verify_password(password: SecretString, hash: SecretString) -> Result<(), AuthError> {
    tokio::task::spawn_blocking(move || {
        let parsed_hash =
            PasswordHash::new(hash.expose_secret()).map_err(|_| AuthError::InvalidCredentials)?;

        Argon2::default()
            .verify_password(password.expose_secret().as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    })
    .await
    .map_err(|_| AuthError::PasswordHash)?
}

/// Spend the same work as a real verification, discarding the result.
async fn burn_verification(password: SecretString) {
    let _ = tokio::task::spawn_blocking(move || {
        if let Some(hash) = DUMMY_HASH.as_deref().and_then(|h| PasswordHash::new(h).ok()) {
            let _ = Argon2::default().verify_password(password.expose_secret().as_bytes(), &hash);
        }
    })
    .await;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryCredentialStore;

    fn service() -> AuthService {
        let tokens = Arc::new(TokenAuthority::new(&SecretString::from(
            "k7#Qp2!vX9@mL4$wR8^tY1&zN6*bC3%h",
        )));
        AuthService::new(Arc::new(MemoryCredentialStore::new()), tokens)
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s)
    }

    #[tokio::test]
    async fn test_register_login_parse_round_trip() {
        let auth = service();
        let id = auth
            .register("alice", "a@x.com", &secret("secret1"))
            .await
            .unwrap();

        let issued = auth.login("alice", &secret("secret1")).await.unwrap();
        assert_eq!(auth.parse_identity(&issued.token).unwrap(), id);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let auth = service();
        auth.register("alice", "a@x.com", &secret("secret1"))
            .await
            .unwrap();

        let wrong = auth.login("alice", &secret("secret2")).await.unwrap_err();
        let unknown = auth.login("mallory", &secret("secret1")).await.unwrap_err();
        let unparseable = auth.login("x", &secret("secret1")).await.unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(unparseable, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let auth = service();
        auth.register("alice", "a@x.com", &secret("secret1"))
            .await
            .unwrap();

        let same_name = auth
            .register("alice", "other@x.com", &secret("secret1"))
            .await;
        assert!(matches!(same_name, Err(AuthError::UserAlreadyExists)));

        let same_email = auth.register("bob", "a@x.com", &secret("secret1")).await;
        assert!(matches!(same_email, Err(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let auth = service();

        assert!(matches!(
            auth.register("alice", "a@x.com", &secret("short")).await,
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            auth.register("alice", "not-an-email", &secret("secret1"))
                .await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            auth.register("a!", "a@x.com", &secret("secret1")).await,
            Err(AuthError::InvalidUsername(_))
        ));
    }

    #[tokio::test]
    async fn test_parse_identity_rejects_garbage() {
        let auth = service();
        assert!(matches!(
            auth.parse_identity("nope"),
            Err(AuthError::Token(TokenError::Malformed))
        ));
    }

    #[test]
    fn test_password_length_counts_characters() {
        assert!(validate_password(&secret("pässwö")).is_ok());
        assert!(validate_password(&secret("12345")).is_err());
    }
}
