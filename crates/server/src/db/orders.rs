//! Order store: owner-scoped persistence for orders.
//!
//! Every statement filters on `user_id`, so an order belonging to someone
//! else is indistinguishable from one that does not exist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use order_keeper_core::{OrderId, OrderStatus, UserId};

use super::{QueryPolicy, RepositoryError, bounded};
use crate::models::{NewOrder, Order, OrderUpdate};

/// Owner-scoped order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert an order for `owner` and return the assigned ID.
    async fn insert(&self, owner: UserId, order: &NewOrder) -> Result<OrderId, RepositoryError>;

    /// All orders owned by `owner`, ordered by ID.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// A single order, if `owner` owns it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is missing or foreign.
    async fn find_one(&self, owner: UserId, id: OrderId) -> Result<Order, RepositoryError>;

    /// Apply `update` to an order `owner` owns.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is missing or foreign.
    async fn update(
        &self,
        owner: UserId,
        id: OrderId,
        update: &OrderUpdate,
    ) -> Result<(), RepositoryError>;

    /// Remove an order `owner` owns.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is missing or foreign.
    async fn delete(&self, owner: UserId, id: OrderId) -> Result<(), RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            owner_id: UserId::new(row.user_id),
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `PostgreSQL`-backed [`OrderStore`].
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
    policy: QueryPolicy,
}

impl PgOrderStore {
    /// Create a new order store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool, policy: QueryPolicy) -> Self {
        Self { pool, policy }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, owner: UserId, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        bounded(self.policy, "orders.insert", async {
            let id: i32 = sqlx::query_scalar(
                r"
                INSERT INTO orders (user_id, status, created_at, updated_at)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                ",
            )
            .bind(owner)
            .bind(order.status)
            .bind(order.created_at)
            .bind(order.updated_at)
            .fetch_one(&self.pool)
            .await?;

            Ok(OrderId::new(id))
        })
        .await
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Order>, RepositoryError> {
        bounded(self.policy, "orders.list_by_owner", async {
            let rows: Vec<OrderRow> = sqlx::query_as(
                r"
                SELECT id, user_id, status, created_at, updated_at
                FROM orders
                WHERE user_id = $1
                ORDER BY id
                ",
            )
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

            Ok(rows.into_iter().map(Order::from).collect())
        })
        .await
    }

    async fn find_one(&self, owner: UserId, id: OrderId) -> Result<Order, RepositoryError> {
        bounded(self.policy, "orders.find_one", async {
            let row: Option<OrderRow> = sqlx::query_as(
                r"
                SELECT id, user_id, status, created_at, updated_at
                FROM orders
                WHERE id = $1 AND user_id = $2
                ",
            )
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

            row.map(Order::from).ok_or(RepositoryError::NotFound)
        })
        .await
    }

    async fn update(
        &self,
        owner: UserId,
        id: OrderId,
        update: &OrderUpdate,
    ) -> Result<(), RepositoryError> {
        bounded(self.policy, "orders.update", async {
            let result = sqlx::query(
                r"
                UPDATE orders
                SET status = COALESCE($3, status),
                    updated_at = GREATEST($4, updated_at + interval '1 microsecond')
                WHERE id = $1 AND user_id = $2
                ",
            )
            .bind(id)
            .bind(owner)
            .bind(update.status)
            .bind(update.touched_at)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, owner: UserId, id: OrderId) -> Result<(), RepositoryError> {
        bounded(self.policy, "orders.delete", async {
            let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(owner)
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
        .await
    }
}
