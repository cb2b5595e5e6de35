//! User domain types.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use order_keeper_core::{Email, UserId, Username};

/// A registered user (domain type).
///
/// Users are created once at registration and never modified by the server.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID, assigned by the store.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// Contact address.
    pub email: Email,
    /// Argon2 PHC string. Redacted from `Debug`.
    pub password_hash: SecretString,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// Data needed to persist a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    pub password_hash: SecretString,
}
