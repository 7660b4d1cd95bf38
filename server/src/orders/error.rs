//! Order engine errors

use thiserror::Error;

use crate::db::repository::RepoError;
use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order must contain at least one item")]
    EmptyOrder,

    #[error("Consumer not found. Please make sure you are logged in.")]
    ConsumerNotFound,

    #[error("Invalid product id format: {0}")]
    InvalidProductId(String),

    #[error("Invalid quantity for product {0}")]
    InvalidQuantity(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Product not available: {0}")]
    Unavailable(String),

    #[error("Insufficient stock for: {name}. Available: {available}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    #[error("Order items must belong to a single farmer")]
    MixedFarmers,

    #[error("Invalid status")]
    InvalidStatus(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("{0} not found")]
    UserNotFound(&'static str),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::EmptyOrder
            | OrderError::InvalidProductId(_)
            | OrderError::InvalidQuantity(_)
            | OrderError::MixedFarmers => AppError::Validation(e.to_string()),
            OrderError::InvalidStatus(_) => AppError::Validation("Invalid status".to_string()),
            OrderError::ConsumerNotFound
            | OrderError::ProductNotFound(_)
            | OrderError::OrderNotFound(_)
            | OrderError::UserNotFound(_) => AppError::NotFound(e.to_string()),
            OrderError::Unavailable(_) => AppError::Unavailable(e.to_string()),
            OrderError::InsufficientStock { .. } => AppError::InsufficientStock(e.to_string()),
            OrderError::Repo(repo) => match repo {
                RepoError::NotFound(msg) => AppError::NotFound(msg),
                RepoError::Validation(msg) => AppError::Validation(msg),
                RepoError::Database(msg) => AppError::Database(msg),
            },
        }
    }
}
