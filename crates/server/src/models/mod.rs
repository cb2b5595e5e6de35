//! Domain models.
//!
//! These types represent validated domain objects separate from database row types.

pub mod order;
pub mod user;

pub use order::{NewOrder, Order, OrderUpdate};
pub use user::{NewUser, User};
