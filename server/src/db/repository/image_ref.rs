//! Image Reference Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{IMAGE_REF_TABLE, ImageRef};
use crate::utils::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct ImageRefRepository {
    base: BaseRepository,
}

impl ImageRefRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_hash(&self, hash: &str) -> RepoResult<Option<ImageRef>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM image_ref WHERE hash = $hash LIMIT 1")
            .bind(("hash", hash.to_string()))
            .await?;
        let image_ref: Option<ImageRef> = result.take(0)?;
        Ok(image_ref)
    }

    pub async fn insert(&self, hash: &str, url: &str, size: i64) -> RepoResult<ImageRef> {
        let image_ref = ImageRef {
            id: None,
            hash: hash.to_string(),
            url: url.to_string(),
            size,
            created_at: now_millis(),
        };
        let created: Option<ImageRef> = self
            .base
            .db()
            .create(IMAGE_REF_TABLE)
            .content(image_ref)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to record image ref".to_string()))
    }
}
