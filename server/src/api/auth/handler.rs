//! Authentication Handlers
//!
//! Telegram login, role changes, and session introspection.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::{CurrentUser, InitDataError};
use crate::core::ServerState;
use crate::db::models::{User, UserRole};
use crate::db::repository::{UserRepository, parse_record_id};
use crate::utils::{AppError, AppResult};

/// User projection returned by the auth endpoints
#[derive(Debug, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub telegram_id: i64,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub role: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_string()).unwrap_or_default(),
            telegram_id: user.telegram_id,
            first_name: user.first_name,
            username: user.username,
            role: user.role.as_str().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TelegramLoginRequest {
    #[serde(default)]
    pub init_data: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TelegramLoginResponse {
    pub success: bool,
    pub token: String,
    pub user: AuthUser,
}

/// Telegram login
///
/// Verifies the Mini App initData assertion, creates or refreshes the user
/// record, and issues a session token.
pub async fn telegram_login(
    State(state): State<ServerState>,
    Json(req): Json<TelegramLoginRequest>,
) -> AppResult<Json<TelegramLoginResponse>> {
    let init_data = match req.init_data.as_deref() {
        Some(data) if !data.is_empty() => data,
        _ => return Err(AppError::validation("No init data provided")),
    };

    let claim = state.telegram_auth.verify(init_data).map_err(|e| {
        tracing::warn!(error = %e, "Telegram initData verification failed");
        match e {
            InitDataError::MissingHash | InitDataError::SignatureMismatch => {
                AppError::InvalidAssertion("Invalid Telegram data".to_string())
            }
            InitDataError::MissingUser | InitDataError::BadUserClaim(_) => {
                AppError::validation(e.to_string())
            }
        }
    })?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .upsert_login(claim.id, &claim.first_name, claim.username.as_deref())
        .await?;

    let token = state
        .jwt_service
        .generate_token(&user)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        telegram_id = user.telegram_id,
        role = user.role.as_str(),
        "User logged in"
    );

    Ok(Json(TelegramLoginResponse {
        success: true,
        token,
        user: user.into(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub telegram_id: i64,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SetRoleResponse {
    pub success: bool,
    pub user: AuthUser,
}

/// Change a user's marketplace role
pub async fn set_role(
    State(state): State<ServerState>,
    Json(req): Json<SetRoleRequest>,
) -> AppResult<Json<SetRoleResponse>> {
    let role = req
        .role
        .as_deref()
        .and_then(UserRole::parse)
        .ok_or_else(|| AppError::validation("Invalid role"))?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo.set_role(req.telegram_id, role).await?;

    tracing::info!(
        telegram_id = user.telegram_id,
        role = user.role.as_str(),
        "User role updated"
    );

    Ok(Json(SetRoleResponse {
        success: true,
        user: user.into(),
    }))
}

/// Current user info, freshly loaded from the store
pub async fn me(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<AuthUser>> {
    let repo = UserRepository::new(state.db.clone());
    let id = parse_record_id(crate::db::models::USER_TABLE, &current.id)
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let user = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(user.into()))
}
