//! Order Keeper Core - Shared domain types.
//!
//! This crate provides the types shared by every Order Keeper component:
//! - `server` - HTTP API, services, and storage
//! - `cli` - Migrations and operator tooling
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database encodings are available behind the `postgres`
//! feature so the types can be bound directly in sqlx queries.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, usernames, emails, and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
