//! Order Model
//!
//! Line items are denormalized snapshots of product fields at order time;
//! the only live link back to the product is the record id used for stock
//! restoration.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;
use super::user::UserBrief;

pub const ORDER_TABLE: &str = "order";

/// Order lifecycle status
///
/// `pending → confirmed → shipped → delivered`, any non-cancelled state may
/// move to `cancelled`. No transition table beyond the five-value check;
/// stock accounting only keys off transitions into `cancelled`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a status string from the API. `None` for anything outside the
    /// five recognized values.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// One product/quantity/price snapshot within an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at order time, never recomputed afterwards
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
}

/// Order record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub consumer: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub farmer: RecordId,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_notes: Option<String>,
    pub payment_method: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

// =============================================================================
// API Request Types
// =============================================================================

/// A caller-supplied user identifier: clients built against the Telegram
/// scheme send numbers, newer ones send `"user:<key>"` strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdentifierValue {
    Int(i64),
    Text(String),
}

impl IdentifierValue {
    pub fn as_user_ref(&self) -> Option<super::user::UserRef> {
        match self {
            IdentifierValue::Int(telegram_id) => {
                Some(super::user::UserRef::Telegram(*telegram_id))
            }
            IdentifierValue::Text(raw) => super::user::UserRef::parse(raw),
        }
    }
}

/// One requested line in an order creation call
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemInput {
    pub product_id: String,
    pub quantity: i64,
}

/// Create order payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    #[serde(default)]
    pub consumer_id: Option<IdentifierValue>,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_notes: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

// =============================================================================
// API Response Types
// =============================================================================

/// Order with consumer/farmer references expanded to display form
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub consumer: UserBrief,
    pub farmer: UserBrief,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub delivery_address: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_notes: Option<String>,
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl OrderDetail {
    pub fn from_parts(order: Order, consumer: UserBrief, farmer: UserBrief) -> Self {
        Self {
            id: order.id,
            consumer,
            farmer,
            items: order.items,
            total_amount: order.total_amount,
            delivery_address: order.delivery_address,
            customer_phone: order.customer_phone,
            customer_notes: order.customer_notes,
            payment_method: order.payment_method,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}
