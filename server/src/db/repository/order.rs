//! Order Repository
//!
//! Persistence for order documents. All business logic (reservation,
//! rollback, restoration) lives in the order engine; this layer only reads
//! and writes records.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{ORDER_TABLE, Order, OrderStatus};
use crate::utils::now_millis;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    /// Set status + update timestamp. `None` when the order does not exist.
    pub async fn update_status(
        &self,
        id: &RecordId,
        status: OrderStatus,
    ) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET status = $status, updated_at = $now RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("status", status.as_str()))
            .bind(("now", now_millis()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Orders placed by a consumer, newest first.
    pub async fn list_by_consumer(&self, consumer: &RecordId) -> RepoResult<Vec<Order>> {
        self.list_by_party("consumer", consumer).await
    }

    /// Orders addressed to a farmer, newest first.
    pub async fn list_by_farmer(&self, farmer: &RecordId) -> RepoResult<Vec<Order>> {
        self.list_by_party("farmer", farmer).await
    }

    async fn list_by_party(&self, field: &str, user: &RecordId) -> RepoResult<Vec<Order>> {
        // References are stored in the "table:id" string form
        let query_str = format!(
            "SELECT * FROM order WHERE {} = $user ORDER BY created_at DESC",
            field
        );
        let mut result = self
            .base
            .db()
            .query(query_str)
            .bind(("user", user.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders)
    }
}
