//! Persistence for users and orders.
//!
//! # Tables
//!
//! - `users` - Credentials (username, email, argon2 password hash)
//! - `orders` - Orders, each owned by exactly one user
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p order-keeper-cli -- migrate
//! ```
//!
//! Every store operation is wrapped in [`bounded`], which enforces the
//! per-operation deadline and flags slow queries.

pub mod memory;
pub mod orders;
pub mod users;

use std::future::Future;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio::time::Instant;

pub use orders::{OrderStore, PgOrderStore};
pub use users::{CredentialStore, PgCredentialStore};

use crate::config::DatabaseConfig;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found (or is owned by someone else).
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The operation did not finish within its deadline.
    #[error("{operation} timed out after {}ms", timeout.as_millis())]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

/// Deadline and slow-query threshold applied to each store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Hard deadline; the operation is abandoned once it elapses.
    pub timeout: Duration,
    /// Operations slower than this are reported at `WARN`.
    pub slow_threshold: Duration,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            slow_threshold: Duration::from_millis(100),
        }
    }
}

/// Run a store operation under `policy`.
///
/// The future is dropped if it outlives `policy.timeout`, which cancels the
/// in-flight query. Slow but successful (or failed) operations keep their
/// result and only produce a warning.
///
/// # Errors
///
/// Returns `RepositoryError::Timeout` when the deadline elapses, otherwise
/// whatever the operation itself returned.
pub async fn bounded<T, F>(
    policy: QueryPolicy,
    operation: &'static str,
    fut: F,
) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    let started = Instant::now();
    tracing::debug!(operation, "executing database operation");

    let Ok(result) = tokio::time::timeout(policy.timeout, fut).await else {
        tracing::error!(
            operation,
            timeout_ms = policy.timeout.as_millis(),
            "database operation timed out"
        );
        return Err(RepositoryError::Timeout {
            operation,
            timeout: policy.timeout,
        });
    };

    let elapsed = started.elapsed();
    if elapsed > policy.slow_threshold {
        tracing::warn!(
            operation,
            elapsed_ms = elapsed.as_millis(),
            threshold_ms = policy.slow_threshold.as_millis(),
            "slow database query detected"
        );
    }

    result
}

/// Map a unique-constraint violation to `Conflict`, everything else to `Database`.
pub(crate) fn conflict_or_database(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the options are invalid or the connection cannot
/// be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.max_connections.min(2))
        .acquire_timeout(config.queries.timeout)
        .connect_with(config.connect_options()?)
        .await
}
