//! Credential store: persistence for registered users.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use order_keeper_core::{Email, UserId, Username};

use super::{QueryPolicy, RepositoryError, bounded, conflict_or_database};
use crate::models::{NewUser, User};

/// Persists and looks up users by username.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user and return the assigned ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    async fn create_user(&self, user: &NewUser) -> Result<UserId, RepositoryError>;

    /// Fetch a user by exact username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such user exists.
    async fn find_by_username(&self, username: &Username) -> Result<User, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            email,
            password_hash: SecretString::from(row.password_hash),
            created_at: row.created_at,
        })
    }
}

/// `PostgreSQL`-backed [`CredentialStore`].
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
    policy: QueryPolicy,
}

impl PgCredentialStore {
    /// Create a new credential store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool, policy: QueryPolicy) -> Self {
        Self { pool, policy }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create_user(&self, user: &NewUser) -> Result<UserId, RepositoryError> {
        bounded(self.policy, "users.create", async {
            let id: i32 = sqlx::query_scalar(
                r"
                INSERT INTO users (username, email, password_hash)
                VALUES ($1, $2, $3)
                RETURNING id
                ",
            )
            .bind(user.username.as_str())
            .bind(user.email.as_str())
            .bind(user.password_hash.expose_secret())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_or_database(e, "username or email"))?;

            Ok(UserId::new(id))
        })
        .await
    }

    async fn find_by_username(&self, username: &Username) -> Result<User, RepositoryError> {
        bounded(self.policy, "users.find_by_username", async {
            let row: Option<UserRow> = sqlx::query_as(
                r"
                SELECT id, username, email, password_hash, created_at
                FROM users
                WHERE username = $1
                ",
            )
            .bind(username.as_str())
            .fetch_optional(&self.pool)
            .await?;

            row.ok_or(RepositoryError::NotFound)?.try_into()
        })
        .await
    }
}
