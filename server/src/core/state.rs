//! Server state

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{JwtService, TelegramAuth};
use crate::core::Config;
use crate::db::DbService;
use crate::orders::OrderManager;
use crate::services::ImageHostClient;

/// Shared per-request state - cheap to clone, all services behind Arc
///
/// | Field | Purpose |
/// |-------|---------|
/// | config | immutable configuration |
/// | db | embedded SurrealDB handle |
/// | jwt_service | session token issue/validate |
/// | telegram_auth | initData verification |
/// | image_host | external image hosting client |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub telegram_auth: Arc<TelegramAuth>,
    pub image_host: Arc<ImageHostClient>,
}

impl ServerState {
    /// Initialize all services.
    ///
    /// # Panics
    ///
    /// Panics when the data directory cannot be created or the database
    /// fails to open - the server cannot run without either.
    pub async fn initialize(config: &Config) -> Self {
        let db_dir = config.database_dir();
        std::fs::create_dir_all(&db_dir).expect("Failed to create data directory");

        let db_path = db_dir.join("agrilink.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        if config.telegram_bot_token.is_empty() {
            tracing::warn!("TELEGRAM_BOT_TOKEN not set - identity verification will reject all logins");
        }

        Self {
            config: config.clone(),
            db: db_service.db,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            telegram_auth: Arc::new(TelegramAuth::new(&config.telegram_bot_token)),
            image_host: Arc::new(ImageHostClient::new(
                config.imgbb_api_key.clone(),
                config.imgbb_endpoint.clone(),
            )),
        }
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn order_manager(&self) -> OrderManager {
        OrderManager::new(self.db.clone())
    }
}
