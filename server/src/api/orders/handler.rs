//! Order API Handlers
//!
//! Thin mapping over the order manager; every business rule lives there.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{OrderCreate, OrderDetail};
use crate::utils::{AppError, AppResult};

/// Order plus a human-readable message, matching the legacy response shape
#[derive(Debug, Serialize)]
pub struct OrderWithMessage {
    #[serde(flatten)]
    pub order: OrderDetail,
    pub message: String,
}

/// POST /api/orders - place an order
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<OrderWithMessage>)> {
    let order = state
        .order_manager()
        .create_order(payload)
        .await
        .map_err(AppError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(OrderWithMessage {
            order,
            message: "Order created successfully".to_string(),
        }),
    ))
}

/// GET /api/orders/consumer/:id - consumer's orders (either id scheme)
pub async fn list_for_consumer(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<OrderDetail>>> {
    let orders = state
        .order_manager()
        .list_for_consumer(&id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(orders))
}

/// GET /api/orders/farmer/:id - farmer's orders (either id scheme)
pub async fn list_for_farmer(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<OrderDetail>>> {
    let orders = state
        .order_manager()
        .list_for_farmer(&id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(orders))
}

/// GET /api/orders/:id - single order with expanded references
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let order = state
        .order_manager()
        .get_detail(&id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// PATCH /api/orders/:id/status - transition order status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<OrderWithMessage>> {
    let status = payload
        .status
        .ok_or_else(|| AppError::validation("Invalid status"))?;

    let order = state
        .order_manager()
        .update_status(&id, &status)
        .await
        .map_err(AppError::from)?;

    Ok(Json(OrderWithMessage {
        message: format!("Order status updated to {}", status),
        order,
    }))
}
