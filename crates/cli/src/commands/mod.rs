//! Subcommand implementations.

pub mod migrate;
pub mod token;

use order_keeper_server::config::ConfigError;
use order_keeper_server::services::auth::TokenError;

/// Errors surfaced by any subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}
