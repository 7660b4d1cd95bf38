//! Database Models

// Serde helpers
pub mod serde_helpers;

// Identity
pub mod user;

// Catalog
pub mod product;

// Orders
pub mod order;

// Upload dedup
pub mod image_ref;

// Re-exports
pub use image_ref::{IMAGE_REF_TABLE, ImageRef};
pub use order::{
    IdentifierValue, ORDER_TABLE, Order, OrderCreate, OrderDetail, OrderItem, OrderItemInput,
    OrderStatus,
};
pub use product::{PRODUCT_TABLE, Product, ProductCreate, ProductFilter, ProductUpdate};
pub use user::{USER_TABLE, User, UserBrief, UserRef, UserRole};
