//! Utility module - shared helpers and types
//!
//! - [`AppError`] - application error type
//! - [`logger`] - tracing setup

pub mod error;
pub mod logger;

pub use error::AppError;

/// Result alias used by API handlers
pub type AppResult<T> = Result<T, AppError>;

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
