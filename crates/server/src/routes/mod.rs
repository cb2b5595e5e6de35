//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (database ping)
//!
//! # Auth
//! POST   /auth/sign-up         - Register a user
//! POST   /auth/sign-in         - Exchange credentials for a bearer token
//!
//! # Orders (requires `Authorization: Bearer <token>`)
//! POST   /order                - Create an order
//! GET    /order?id=N           - Fetch one order
//! GET    /order/orders         - List the caller's orders
//! GET    /order/{id}           - Fetch one order
//! PUT    /order/{id}           - Update an order's status
//! DELETE /order/{id}           - Delete an order
//! ```
//!
//! `/order` and `/order/` are both accepted.

pub mod auth;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-in", post(auth::sign_in))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/order", post(orders::create).get(orders::get_by_query))
        .route("/order/", post(orders::create).get(orders::get_by_query))
        .route("/order/orders", get(orders::list))
        .route(
            "/order/{id}",
            get(orders::get_by_path)
                .put(orders::update)
                .delete(orders::delete),
        )
}

/// Create the full API router.
pub fn routes() -> Router<AppState> {
    Router::new().merge(auth_routes()).merge(order_routes())
}
