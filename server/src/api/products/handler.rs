//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::models::{PRODUCT_TABLE, Product, ProductCreate, ProductFilter, ProductUpdate};
use crate::db::repository::{ProductRepository, UserRepository, parse_record_id};
use crate::utils::{AppError, AppResult};

/// POST /api/products - create a product
///
/// The owning farmer is resolved by external id so the record can carry
/// both the internal link and the redundant telegram id.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let users = UserRepository::new(state.db.clone());
    let farmer = users
        .find_by_telegram_id(payload.farmer_telegram_id)
        .await?
        .ok_or_else(|| AppError::not_found("Farmer not found"))?;

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(payload, &farmer).await?;

    tracing::info!(
        product = %product.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
        farmer_telegram_id = product.farmer_telegram_id,
        "Product created"
    );

    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/products - available products, filtered, newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.list(&filter).await?;
    Ok(Json(products))
}

/// GET /api/products/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let record_id = parse_record_id(PRODUCT_TABLE, &id)
        .ok_or_else(|| AppError::validation(format!("Invalid product id: {}", id)))?;

    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&record_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    Ok(Json(product))
}

/// PUT /api/products/:id - direct patch, callers are trusted
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    let record_id = parse_record_id(PRODUCT_TABLE, &id)
        .ok_or_else(|| AppError::validation(format!("Invalid product id: {}", id)))?;

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.update(&record_id, payload).await?;
    Ok(Json(product))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// DELETE /api/products/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    let record_id = parse_record_id(PRODUCT_TABLE, &id)
        .ok_or_else(|| AppError::validation(format!("Invalid product id: {}", id)))?;

    let repo = ProductRepository::new(state.db.clone());
    repo.delete(&record_id).await?;

    tracing::info!(product = %record_id, "Product deleted");

    Ok(Json(DeleteResponse {
        message: "Product deleted successfully".to_string(),
    }))
}
