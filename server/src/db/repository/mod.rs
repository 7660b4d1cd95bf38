//! Repository Module
//!
//! CRUD operations over the embedded SurrealDB tables.
//!
//! ID convention: the full stack uses the `"table:id"` string form. Parse
//! with `RecordId` (`"product:abc".parse()?`), create with
//! `RecordId::from_table_key`, and pass `RecordId` values directly to
//! `db.select()` / `db.delete()` and query bindings.

// Identity
pub mod user;

// Catalog
pub mod product;

// Orders
pub mod order;

// Upload dedup
pub mod image_ref;

// Re-exports
pub use image_ref::ImageRefRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use user::UserRepository;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => crate::utils::AppError::NotFound(msg),
            RepoError::Validation(msg) => crate::utils::AppError::Validation(msg),
            RepoError::Database(msg) => crate::utils::AppError::Database(msg),
        }
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Parse a path/id parameter into a `RecordId` for the given table.
///
/// Accepts both the full `"table:key"` form and the bare key. A full form
/// naming a different table is rejected rather than silently rewritten.
pub fn parse_record_id(table: &str, raw: &str) -> Option<RecordId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<RecordId>() {
        Ok(id) if id.table() == table => Some(id),
        Ok(_) => None,
        Err(_) => Some(RecordId::from_table_key(table, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_record_id_accepts_both_forms() {
        let full = parse_record_id("product", "product:abc").unwrap();
        assert_eq!(full.table(), "product");

        let bare = parse_record_id("product", "abc").unwrap();
        assert_eq!(bare.table(), "product");
        assert_eq!(full, bare);
    }

    #[test]
    fn parse_record_id_rejects_foreign_table() {
        assert!(parse_record_id("product", "user:abc").is_none());
        assert!(parse_record_id("product", "").is_none());
    }
}
