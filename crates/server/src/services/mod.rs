//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login, and token parsing
//! - `orders` - Owner-scoped order management

pub mod auth;
pub mod orders;

use std::sync::Arc;

use crate::db::{CredentialStore, OrderStore};

pub use auth::{AuthService, TokenAuthority};
pub use orders::OrderService;

/// The full set of services a request handler may use.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<AuthService>,
    pub orders: Arc<OrderService>,
}

impl Services {
    /// Wire services over the given stores and token authority.
    #[must_use]
    pub fn new(
        users: Arc<dyn CredentialStore>,
        orders: Arc<dyn OrderStore>,
        tokens: Arc<TokenAuthority>,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(users, tokens)),
            orders: Arc::new(OrderService::new(orders)),
        }
    }
}
