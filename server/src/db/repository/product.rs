//! Product Repository
//!
//! Catalog CRUD plus the two stock-mutation primitives used by the order
//! engine. Stock changes go through single conditional UPDATE statements so
//! a check can never race its own write.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{PRODUCT_TABLE, Product, ProductCreate, ProductFilter, ProductUpdate, User};
use crate::utils::now_millis;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new product. Availability is computed from stock, never
    /// taken from the caller.
    pub async fn create(&self, data: ProductCreate, farmer: &User) -> RepoResult<Product> {
        // 校验必填字段
        let name = match data.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => return Err(RepoError::Validation("name is required".into())),
        };
        let category = match data.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => return Err(RepoError::Validation("category is required".into())),
        };
        let price = match data.price {
            Some(p) if p > 0.0 => p,
            Some(_) => return Err(RepoError::Validation("price must be positive".into())),
            None => return Err(RepoError::Validation("price is required".into())),
        };
        let stock = data.stock.unwrap_or(0);
        if stock < 0 {
            return Err(RepoError::Validation("stock cannot be negative".into()));
        }

        let farmer_id = farmer
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Farmer record has no id".to_string()))?;

        let now = now_millis();
        let product = Product {
            id: None,
            farmer: farmer_id,
            farmer_telegram_id: farmer.telegram_id,
            farmer_name: data.farmer_name.or_else(|| Some(farmer.first_name.clone())),
            farmer_username: data.farmer_username.or_else(|| farmer.username.clone()),
            name,
            description: data.description,
            price,
            category,
            images: data.images.unwrap_or_default(),
            stock,
            is_available: stock > 0,
            location: data.location,
            tags: data.tags.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Catalog listing: always restricted to available products, newest
    /// first. Filters combine with AND; `search` uses the full-text indexes
    /// over name/description/tags.
    pub async fn list(&self, filter: &ProductFilter) -> RepoResult<Vec<Product>> {
        let mut where_parts = vec!["is_available = true"];

        if filter.category.is_some() {
            where_parts.push("category = $category");
        }
        if filter.farmer_telegram_id.is_some() {
            where_parts.push("farmer_telegram_id = $farmer_telegram_id");
        }
        if filter.search.is_some() {
            where_parts.push("(name @@ $search OR description @@ $search OR tags @@ $search)");
        }

        let query_str = format!(
            "SELECT * FROM product WHERE {} ORDER BY created_at DESC",
            where_parts.join(" AND ")
        );

        let mut query = self.base.db().query(query_str);
        if let Some(category) = filter.category.clone() {
            query = query.bind(("category", category));
        }
        if let Some(farmer_telegram_id) = filter.farmer_telegram_id {
            query = query.bind(("farmer_telegram_id", farmer_telegram_id));
        }
        if let Some(search) = filter.search.clone() {
            query = query.bind(("search", search));
        }

        let products: Vec<Product> = query.await?.take(0)?;
        Ok(products)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(id.clone()).await?;
        Ok(product)
    }

    /// Patch a product. No business-rule validation beyond what the store
    /// enforces; callers are trusted.
    pub async fn update(&self, id: &RecordId, data: ProductUpdate) -> RepoResult<Product> {
        let mut set_parts: Vec<&str> = Vec::new();

        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.category.is_some() {
            set_parts.push("category = $category");
        }
        if data.stock.is_some() {
            set_parts.push("stock = $stock");
        }
        if data.location.is_some() {
            set_parts.push("location = $location");
        }
        if data.images.is_some() {
            set_parts.push("images = $images");
        }
        if data.tags.is_some() {
            set_parts.push("tags = $tags");
        }
        if data.is_available.is_some() {
            set_parts.push("is_available = $is_available");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }
        set_parts.push("updated_at = $now");

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));

        let mut query = self
            .base
            .db()
            .query(query_str)
            .bind(("id", id.clone()))
            .bind(("now", now_millis()));

        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.category {
            query = query.bind(("category", v));
        }
        if let Some(v) = data.stock {
            query = query.bind(("stock", v));
        }
        if let Some(v) = data.location {
            query = query.bind(("location", v));
        }
        if let Some(v) = data.images {
            query = query.bind(("images", v));
        }
        if let Some(v) = data.tags {
            query = query.bind(("tags", v));
        }
        if let Some(v) = data.is_available {
            query = query.bind(("is_available", v));
        }

        let mut result = query.await?;
        let products: Vec<Product> = result.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let deleted: Option<Product> = self.base.db().delete(id.clone()).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Product {} not found", id)));
        }
        Ok(())
    }

    /// Atomically reserve `quantity` units.
    ///
    /// One conditional UPDATE: the availability flag and the final stock
    /// value are computed against the same document version the guard saw,
    /// so two concurrent reservations can never drive stock negative.
    ///
    /// Returns `None` when the guard rejected the update (missing record,
    /// unavailable, or insufficient stock - callers classify by re-reading).
    pub async fn reserve_stock(
        &self,
        id: &RecordId,
        quantity: i64,
    ) -> RepoResult<Option<Product>> {
        // 扣减与检查在同一条语句内, 避免超卖
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET is_available = (stock - $quantity) > 0, \
                 stock -= $quantity, updated_at = $now \
                 WHERE is_available = true AND stock >= $quantity RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("quantity", quantity))
            .bind(("now", now_millis()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Return `quantity` units to stock and mark the product available.
    ///
    /// Restoration trusts the order snapshot: availability is set
    /// unconditionally. A product deleted since order creation is a silent
    /// no-op (`None`).
    pub async fn restore_stock(
        &self,
        id: &RecordId,
        quantity: i64,
    ) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET stock += $quantity, is_available = true, \
                 updated_at = $now RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("quantity", quantity))
            .bind(("now", now_millis()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }
}
