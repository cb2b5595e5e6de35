//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use order_keeper_core::{OrderId, OrderStatus, UserId};

/// An order (domain type).
///
/// `created_at` never changes; `updated_at` starts equal to it and moves
/// strictly forward on every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    /// Unique order ID, assigned by the store.
    pub id: OrderId,
    /// The user who owns this order.
    #[serde(rename = "user_id")]
    pub owner_id: UserId,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Data needed to persist a new order. The owner is passed separately.
#[derive(Debug, Clone, Copy)]
pub struct NewOrder {
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A partial update. `None` fields are left unchanged.
#[derive(Debug, Clone, Copy)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    /// Wall-clock time of the update; the stored `updated_at` is never
    /// moved backwards by it.
    pub touched_at: DateTime<Utc>,
}
