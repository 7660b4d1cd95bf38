//! Product Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

pub const PRODUCT_TABLE: &str = "product";

/// Product record
///
/// Invariant: `is_available == (stock > 0)` after every stock mutation.
/// The flag is a cached predicate over stock, not independently
/// authoritative; both stock-mutation paths (reserve/restore) recompute it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Record link to the owning farmer
    #[serde(with = "serde_helpers::record_id")]
    pub farmer: RecordId,
    /// Redundant external id of the owner, kept for direct filtering
    pub farmer_telegram_id: i64,
    #[serde(default)]
    pub farmer_name: Option<String>,
    #[serde(default)]
    pub farmer_username: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Create payload
///
/// `is_available` is not accepted from the caller; it is computed from
/// stock at creation time. Required fields stay optional here so their
/// absence maps to a validation error instead of a deserialization reject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    pub farmer_telegram_id: i64,
    #[serde(default)]
    pub farmer_name: Option<String>,
    #[serde(default)]
    pub farmer_username: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Update payload - direct patch, no business-rule validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

/// Catalog list filter (all optional, combined with AND)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub farmer_telegram_id: Option<i64>,
    pub search: Option<String>,
}
