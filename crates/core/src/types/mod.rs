//! Core types for Order Keeper.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod status;
pub mod username;

pub use email::{Email, EmailError};
pub use id::*;
pub use status::{OrderStatus, OrderStatusError};
pub use username::{Username, UsernameError};
