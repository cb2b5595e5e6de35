//! Database migration command.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`, or `DB_HOST`/`DB_PORT`/`DB_USERNAME`/`DB_PASSWORD`/`DB_NAME`/`DB_SSLMODE`
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/` and are embedded at
//! compile time:
//! ```text
//! migrations/
//! ├── 20261016000001_create_users.sql
//! └── 20261016000002_create_orders.sql
//! ```

use order_keeper_server::config::DatabaseConfig;
use order_keeper_server::db;

use super::CommandError;

/// Apply all pending migrations.
pub async fn run() -> Result<(), CommandError> {
    let config = DatabaseConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    pool.close().await;
    tracing::info!("Migrations complete!");
    Ok(())
}
