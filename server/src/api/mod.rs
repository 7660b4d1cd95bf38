//! API routing module
//!
//! # Structure
//!
//! - [`health`] - liveness and database probe
//! - [`auth`] - Telegram login, role change, session info
//! - [`products`] - catalog management
//! - [`orders`] - order placement and lifecycle
//! - [`upload`] - image upload proxy

pub mod auth;
pub mod health;
pub mod orders;
pub mod products;
pub mod upload;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
