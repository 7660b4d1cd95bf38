//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine). Tables are schemaless; the startup
//! pass only defines the indexes the queries rely on:
//!
//! | Index | Purpose |
//! |-------|---------|
//! | `user.telegram_id` (unique) | external-id lookups, login upsert guard |
//! | `product.category`, `product.farmer_telegram_id` | catalog filters |
//! | search indexes on `product.name/description/tags` | free-text catalog search |
//! | `order.consumer`, `order.farmer` | order history queries |
//! | `image_ref.hash` (unique) | upload deduplication |

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

const NAMESPACE: &str = "agrilink";
const DATABASE: &str = "marketplace";

/// Idempotent schema definitions, applied on every startup.
const SCHEMA: &[&str] = &[
    "DEFINE ANALYZER IF NOT EXISTS product_text TOKENIZERS class FILTERS lowercase, ascii",
    "DEFINE INDEX IF NOT EXISTS user_telegram_id ON user FIELDS telegram_id UNIQUE",
    "DEFINE INDEX IF NOT EXISTS product_category ON product FIELDS category",
    "DEFINE INDEX IF NOT EXISTS product_farmer_telegram_id ON product FIELDS farmer_telegram_id",
    "DEFINE INDEX IF NOT EXISTS product_name_search ON product FIELDS name SEARCH ANALYZER product_text BM25",
    "DEFINE INDEX IF NOT EXISTS product_description_search ON product FIELDS description SEARCH ANALYZER product_text BM25",
    "DEFINE INDEX IF NOT EXISTS product_tags_search ON product FIELDS tags SEARCH ANALYZER product_text BM25",
    "DEFINE INDEX IF NOT EXISTS order_consumer ON order FIELDS consumer",
    "DEFINE INDEX IF NOT EXISTS order_farmer ON order FIELDS farmer",
    "DEFINE INDEX IF NOT EXISTS image_ref_hash ON image_ref FIELDS hash UNIQUE",
];

/// Database service - owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the database at `db_path` and apply the schema.
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        for statement in SCHEMA {
            db.query(*statement)
                .await
                .map_err(|e| AppError::database(format!("Schema definition failed: {e}")))?;
        }

        tracing::info!(path = %db_path, "Database connection established (SurrealDB RocksDB)");

        Ok(Self { db })
    }
}
