//! Order service.
//!
//! Thin layer over [`OrderStore`] that stamps timestamps and scopes every
//! call to the requesting user.

mod error;

pub use error::OrderError;

use std::sync::Arc;

use chrono::Utc;

use order_keeper_core::{OrderId, OrderStatus, UserId};

use crate::db::OrderStore;
use crate::models::{NewOrder, Order, OrderUpdate};

/// Fields a caller may change on an existing order.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderUpdateInput {
    pub status: Option<OrderStatus>,
}

/// Order service.
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
}

impl OrderService {
    /// Create a new order service.
    #[must_use]
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }

    /// Create an order owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError` if the store fails or times out.
    pub async fn create(&self, user: UserId, status: OrderStatus) -> Result<OrderId, OrderError> {
        let now = Utc::now();
        let id = self
            .orders
            .insert(
                user,
                &NewOrder {
                    status,
                    created_at: now,
                    updated_at: now,
                },
            )
            .await
            .map_err(|e| OrderError::new("create order", e))?;

        tracing::info!(user_id = %user, order_id = %id, %status, "order created");
        Ok(id)
    }

    /// All orders owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError` if the store fails or times out.
    pub async fn list(&self, user: UserId) -> Result<Vec<Order>, OrderError> {
        self.orders
            .list_by_owner(user)
            .await
            .map_err(|e| OrderError::new("list orders", e))
    }

    /// One order, if `user` owns it.
    ///
    /// # Errors
    ///
    /// Returns `OrderError` wrapping `NotFound` if the order is missing or
    /// belongs to someone else.
    pub async fn get_by_id(&self, user: UserId, id: OrderId) -> Result<Order, OrderError> {
        self.orders
            .find_one(user, id)
            .await
            .map_err(|e| OrderError::new("get order", e))
    }

    /// Apply `input` to an order `user` owns.
    ///
    /// # Errors
    ///
    /// Returns `OrderError` wrapping `NotFound` if the order is missing or
    /// belongs to someone else.
    pub async fn update(
        &self,
        user: UserId,
        id: OrderId,
        input: OrderUpdateInput,
    ) -> Result<(), OrderError> {
        let update = OrderUpdate {
            status: input.status,
            touched_at: Utc::now(),
        };
        self.orders
            .update(user, id, &update)
            .await
            .map_err(|e| OrderError::new("update order", e))?;

        tracing::info!(user_id = %user, order_id = %id, "order updated");
        Ok(())
    }

    /// Delete an order `user` owns.
    ///
    /// # Errors
    ///
    /// Returns `OrderError` wrapping `NotFound` if the order is missing or
    /// belongs to someone else.
    pub async fn delete(&self, user: UserId, id: OrderId) -> Result<(), OrderError> {
        self.orders
            .delete(user, id)
            .await
            .map_err(|e| OrderError::new("delete order", e))?;

        tracing::info!(user_id = %user, order_id = %id, "order deleted");
        Ok(())
    }
}
