//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::{AuthService, OrderService, Services};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Everything reachable from it
/// is immutable after startup apart from the pool's own internals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    services: Services,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create state backed by a Postgres pool.
    #[must_use]
    pub fn new(services: Services, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                services,
                pool: Some(pool),
            }),
        }
    }

    /// Create state with no database (in-memory stores).
    ///
    /// Readiness checks always succeed in this mode.
    #[must_use]
    pub fn without_database(services: Services) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                services,
                pool: None,
            }),
        }
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.services.auth
    }

    /// Get a reference to the order service.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.services.orders
    }

    /// Get a reference to the database connection pool, if any.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
