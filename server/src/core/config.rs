//! Server configuration
//!
//! All settings come from environment variables with sensible defaults:
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | HTTP_PORT | 6969 | HTTP API port |
//! | DATA_DIR | /var/lib/agrilink | database + log storage |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | TELEGRAM_BOT_TOKEN | (empty) | initData verification secret |
//! | IMGBB_API_KEY | (empty) | image host API key |
//! | IMGBB_ENDPOINT | api.imgbb.com | image host endpoint override |
//! | JWT_SECRET / JWT_* | see auth::jwt | session token settings |

use std::path::PathBuf;

use crate::auth::JwtConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API service port
    pub http_port: u16,
    /// Data directory holding the database and logs
    pub data_dir: String,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Bot token shared with the identity platform
    pub telegram_bot_token: String,
    /// Image host credentials
    pub imgbb_api_key: String,
    pub imgbb_endpoint: Option<String>,
    /// Session token configuration
    pub jwt: JwtConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(6969),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/var/lib/agrilink".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            imgbb_api_key: std::env::var("IMGBB_API_KEY").unwrap_or_default(),
            imgbb_endpoint: std::env::var("IMGBB_ENDPOINT").ok(),
            jwt: JwtConfig::default(),
        }
    }

    /// Override data dir and port, typically for tests.
    pub fn with_overrides(data_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.data_dir = data_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("database")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
