//! AgriLink Server - farmers marketplace backend
//!
//! # Overview
//!
//! Connects farmers and consumers: identity comes from Telegram Mini App
//! assertions, produce listings live in an embedded document store, and the
//! order engine keeps stock and orders consistent.
//!
//! # Module structure
//!
//! ```text
//! server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # initData verification, JWT, middleware
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # embedded SurrealDB: models + repositories
//! ├── orders/        # order engine (reserve / transition / restore)
//! ├── services/      # external image host client
//! └── utils/         # errors, logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod services;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService, TelegramAuth};
pub use core::{Config, Server, ServerState, build_router};
pub use orders::{OrderError, OrderManager};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
    ___             _ __    _       __
   /   | ____ _____(_) /   (_)___  / /__
  / /| |/ __ `/ ___/ / /   / / __ \/ //_/
 / ___ / /_/ / /  / / /___/ / / / / ,<
/_/  |_\__, /_/  /_/_____/_/_/ /_/_/|_|
      /____/
    "#
    );
}
