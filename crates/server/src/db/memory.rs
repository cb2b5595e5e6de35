//! In-process stores for tests and local development.
//!
//! These honour the same contracts as the Postgres stores: owner scoping,
//! unique usernames and emails, monotonic `updated_at`, and the query
//! deadline.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tokio::sync::RwLock;

use order_keeper_core::{OrderId, UserId, Username};

use super::{CredentialStore, OrderStore, QueryPolicy, RepositoryError, bounded};
use crate::models::{NewOrder, NewUser, Order, OrderUpdate, User};

/// In-memory [`CredentialStore`].
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<Vec<User>>,
    policy: QueryPolicy,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create_user(&self, user: &NewUser) -> Result<UserId, RepositoryError> {
        bounded(self.policy, "users.create", async {
            let mut users = self.users.write().await;
            if users
                .iter()
                .any(|u| u.username == user.username || u.email == user.email)
            {
                return Err(RepositoryError::Conflict(
                    "username or email already exists".to_owned(),
                ));
            }

            let id = UserId::new(users.last().map_or(1, |u| u.id.as_i32() + 1));
            users.push(User {
                id,
                username: user.username.clone(),
                email: user.email.clone(),
                password_hash: user.password_hash.clone(),
                created_at: Utc::now(),
            });
            Ok(id)
        })
        .await
    }

    async fn find_by_username(&self, username: &Username) -> Result<User, RepositoryError> {
        bounded(self.policy, "users.find_by_username", async {
            self.users
                .read()
                .await
                .iter()
                .find(|u| &u.username == username)
                .cloned()
                .ok_or(RepositoryError::NotFound)
        })
        .await
    }
}

#[derive(Default)]
struct OrderTable {
    rows: BTreeMap<OrderId, Order>,
    last_id: i32,
}

/// In-memory [`OrderStore`].
#[derive(Default)]
pub struct MemoryOrderStore {
    table: RwLock<OrderTable>,
    policy: QueryPolicy,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, owner: UserId, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        bounded(self.policy, "orders.insert", async {
            let mut table = self.table.write().await;
            table.last_id += 1;
            let id = OrderId::new(table.last_id);
            table.rows.insert(
                id,
                Order {
                    id,
                    owner_id: owner,
                    status: order.status,
                    created_at: order.created_at,
                    updated_at: order.updated_at,
                },
            );
            Ok(id)
        })
        .await
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Order>, RepositoryError> {
        bounded(self.policy, "orders.list_by_owner", async {
            Ok(self
                .table
                .read()
                .await
                .rows
                .values()
                .filter(|o| o.owner_id == owner)
                .cloned()
                .collect())
        })
        .await
    }

    async fn find_one(&self, owner: UserId, id: OrderId) -> Result<Order, RepositoryError> {
        bounded(self.policy, "orders.find_one", async {
            self.table
                .read()
                .await
                .rows
                .get(&id)
                .filter(|o| o.owner_id == owner)
                .cloned()
                .ok_or(RepositoryError::NotFound)
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
            let mut table = self.table.write().await;
            let order = table
                .rows
                .get_mut(&id)
                .filter(|o| o.owner_id == owner)
                .ok_or(RepositoryError::NotFound)?;

            if let Some(status) = update.status {
                order.status = status;
            }
            order.updated_at = update
                .touched_at
                .max(order.updated_at + TimeDelta::microseconds(1));
            Ok(())
        })
        .await
    }

    async fn delete(&self, owner: UserId, id: OrderId) -> Result<(), RepositoryError> {
        bounded(self.policy, "orders.delete", async {
            let mut table = self.table.write().await;
            if !table.rows.get(&id).is_some_and(|o| o.owner_id == owner) {
                return Err(RepositoryError::NotFound);
            }
            table.rows.remove(&id);
            Ok(())
        })
        .await
    }
}
