//! Health check

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::repository::UserRepository;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: String,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_count: Option<i64>,
}

/// Liveness + database probe
async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let repo = UserRepository::new(state.db.clone());
    let (database, user_count) = match repo.count().await {
        Ok(count) => ("connected".to_string(), Some(count)),
        Err(e) => {
            tracing::warn!(error = %e, "Health check database probe failed");
            ("unreachable".to_string(), None)
        }
    };

    Json(HealthResponse {
        message: "AgriLink API is running".to_string(),
        database,
        user_count,
    })
}
