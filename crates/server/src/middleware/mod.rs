//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! Identity is resolved per-route by the [`RequireIdentity`] extractor rather
//! than a blanket layer, so public routes never touch the token authority.

pub mod auth;
pub mod request_id;

pub use auth::RequireIdentity;
pub use request_id::request_id_middleware;
