//! Order manager
//!
//! The one place where multiple entities must stay consistent: order
//! creation reserves stock across every requested product, and a transition
//! into `cancelled` gives it back.
//!
//! Reservation discipline: each product is reserved with a single
//! conditional update (no read-then-write window), and every successful
//! reservation is recorded in a ledger. If any later step fails - a bad
//! line item, a second farmer, the order insert itself - the ledger is
//! drained and all reserved stock is returned before the error surfaces.

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{
    ORDER_TABLE, Order, OrderCreate, OrderDetail, OrderItem, OrderItemInput, OrderStatus,
    PRODUCT_TABLE, User, UserBrief, UserRef,
};
use crate::db::repository::{
    OrderRepository, ProductRepository, RepoError, UserRepository, parse_record_id,
};
use crate::utils::now_millis;

use super::error::OrderError;

/// Every persisted user carries a record id; a missing one is store
/// corruption, not caller error.
fn require_id(user: &User) -> Result<RecordId, OrderError> {
    user.id.clone().ok_or_else(|| {
        OrderError::Repo(RepoError::Database("User record has no id".to_string()))
    })
}

#[derive(Clone)]
pub struct OrderManager {
    users: UserRepository,
    products: ProductRepository,
    orders: OrderRepository,
}

impl OrderManager {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            orders: OrderRepository::new(db),
        }
    }

    /// Create an order: resolve the consumer, reserve stock for every line
    /// in input order, snapshot prices, persist.
    pub async fn create_order(&self, request: OrderCreate) -> Result<OrderDetail, OrderError> {
        if request.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let consumer = match &request.consumer_id {
            Some(identifier) => match identifier.as_user_ref() {
                Some(user_ref) => self.users.resolve(&user_ref).await?,
                None => None,
            },
            None => None,
        };
        let consumer = consumer.ok_or(OrderError::ConsumerNotFound)?;
        let consumer_id = require_id(&consumer)?;

        // Reservation ledger: every decrement that must be undone on failure
        let mut reserved: Vec<(RecordId, i64)> = Vec::new();
        let mut line_items: Vec<OrderItem> = Vec::new();
        let mut total_amount = 0.0;
        let mut farmer: Option<RecordId> = None;

        for item in &request.items {
            match self.reserve_line(item, &mut farmer).await {
                Ok(line) => {
                    reserved.push((line.product.clone(), line.quantity));
                    total_amount += line.price * line.quantity as f64;
                    line_items.push(line);
                }
                Err(e) => {
                    self.rollback(&reserved).await;
                    return Err(e);
                }
            }
        }

        let farmer = match farmer {
            Some(f) => f,
            None => {
                // Unreachable with a non-empty item list
                self.rollback(&reserved).await;
                return Err(OrderError::EmptyOrder);
            }
        };

        let now = now_millis();
        let order = Order {
            id: None,
            consumer: consumer_id,
            farmer,
            items: line_items,
            total_amount,
            delivery_address: request
                .delivery_address
                .or_else(|| consumer.delivery_address.clone()),
            customer_phone: request.customer_phone,
            customer_notes: request.customer_notes,
            payment_method: request.payment_method.unwrap_or_else(|| "cash".to_string()),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let persisted = match self.orders.create(order).await {
            Ok(order) => order,
            Err(e) => {
                // No order record may exist while its stock is held
                self.rollback(&reserved).await;
                return Err(e.into());
            }
        };

        tracing::info!(
            order = %persisted.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            consumer = %persisted.consumer,
            total = persisted.total_amount,
            items = persisted.items.len(),
            "Order created"
        );

        self.expand(persisted).await
    }

    /// Validate one requested line and reserve its stock.
    ///
    /// The first line fixes the order's farmer; a later line owned by
    /// someone else fails the order (its own reservation is returned
    /// immediately, the caller rolls back the rest).
    async fn reserve_line(
        &self,
        item: &OrderItemInput,
        farmer: &mut Option<RecordId>,
    ) -> Result<OrderItem, OrderError> {
        let product_id = match item.product_id.parse::<RecordId>() {
            Ok(id) if id.table() == PRODUCT_TABLE => id,
            _ => return Err(OrderError::InvalidProductId(item.product_id.clone())),
        };
        if item.quantity < 1 {
            return Err(OrderError::InvalidQuantity(item.product_id.clone()));
        }

        let product = match self.products.reserve_stock(&product_id, item.quantity).await? {
            Some(product) => product,
            None => return Err(self.classify_rejection(&product_id, item.quantity).await),
        };

        match farmer {
            None => *farmer = Some(product.farmer.clone()),
            Some(first) if *first != product.farmer => {
                // This line's own reservation must not leak
                if let Err(e) = self
                    .products
                    .restore_stock(&product_id, item.quantity)
                    .await
                {
                    tracing::error!(
                        product = %product_id,
                        error = %e,
                        "Failed to release reservation of mixed-farmer line"
                    );
                }
                return Err(OrderError::MixedFarmers);
            }
            Some(_) => {}
        }

        Ok(OrderItem {
            product: product_id,
            product_name: product.name.clone(),
            quantity: item.quantity,
            price: product.price,
            image: product.images.first().cloned(),
        })
    }

    /// A reservation was rejected by the conditional update; read the
    /// record once to report why.
    async fn classify_rejection(&self, product_id: &RecordId, requested: i64) -> OrderError {
        match self.products.find_by_id(product_id).await {
            Ok(None) => OrderError::ProductNotFound(product_id.to_string()),
            Ok(Some(product)) if !product.is_available => OrderError::Unavailable(product.name),
            Ok(Some(product)) => OrderError::InsufficientStock {
                name: product.name,
                available: product.stock,
                requested,
            },
            Err(e) => e.into(),
        }
    }

    async fn rollback(&self, reserved: &[(RecordId, i64)]) {
        for (product_id, quantity) in reserved {
            if let Err(e) = self.products.restore_stock(product_id, *quantity).await {
                tracing::error!(
                    product = %product_id,
                    quantity,
                    error = %e,
                    "Failed to roll back stock reservation"
                );
            }
        }
    }

    /// Transition an order to a new status.
    ///
    /// Stock is restored only when the transition lands on `cancelled` from
    /// a non-cancelled state - cancelling twice never double-restores.
    pub async fn update_status(
        &self,
        order_id: &str,
        status_raw: &str,
    ) -> Result<OrderDetail, OrderError> {
        let status = OrderStatus::parse(status_raw)
            .ok_or_else(|| OrderError::InvalidStatus(status_raw.to_string()))?;

        let id = parse_record_id(ORDER_TABLE, order_id)
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        let previous = self
            .orders
            .find_by_id(&id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        let updated = self
            .orders
            .update_status(&id, status)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        if status == OrderStatus::Cancelled && previous.status != OrderStatus::Cancelled {
            self.restore_items(&updated.items).await;
        }

        tracing::info!(
            order = %id,
            from = previous.status.as_str(),
            to = status.as_str(),
            "Order status updated"
        );

        self.expand(updated).await
    }

    /// Return each line's quantity to its product.
    ///
    /// Items restore independently: a product deleted since order creation
    /// is skipped, a store failure on one line does not block the others.
    async fn restore_items(&self, items: &[OrderItem]) {
        for item in items {
            match self
                .products
                .restore_stock(&item.product, item.quantity)
                .await
            {
                Ok(Some(product)) => {
                    tracing::debug!(
                        product = %item.product,
                        quantity = item.quantity,
                        stock = product.stock,
                        "Stock restored"
                    );
                }
                Ok(None) => {
                    tracing::debug!(
                        product = %item.product,
                        "Product deleted since order creation, skipping restore"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        product = %item.product,
                        quantity = item.quantity,
                        error = %e,
                        "Failed to restore stock"
                    );
                }
            }
        }
    }

    pub async fn get_detail(&self, order_id: &str) -> Result<OrderDetail, OrderError> {
        let id = parse_record_id(ORDER_TABLE, order_id)
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        let order = self
            .orders
            .find_by_id(&id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        self.expand(order).await
    }

    /// Orders placed by a consumer, newest first. Accepts either id scheme.
    pub async fn list_for_consumer(
        &self,
        identifier: &str,
    ) -> Result<Vec<OrderDetail>, OrderError> {
        let consumer = self.resolve_party(identifier, "Consumer").await?;
        let consumer_id = require_id(&consumer)?;
        let orders = self.orders.list_by_consumer(&consumer_id).await?;
        self.expand_all(orders).await
    }

    /// Orders addressed to a farmer, newest first. Accepts either id scheme.
    pub async fn list_for_farmer(&self, identifier: &str) -> Result<Vec<OrderDetail>, OrderError> {
        let farmer = self.resolve_party(identifier, "Farmer").await?;
        let farmer_id = require_id(&farmer)?;
        let orders = self.orders.list_by_farmer(&farmer_id).await?;
        self.expand_all(orders).await
    }

    async fn resolve_party(
        &self,
        identifier: &str,
        who: &'static str,
    ) -> Result<User, OrderError> {
        let user_ref = UserRef::parse(identifier).ok_or(OrderError::UserNotFound(who))?;
        self.users
            .resolve(&user_ref)
            .await?
            .ok_or(OrderError::UserNotFound(who))
    }

    async fn expand_all(&self, orders: Vec<Order>) -> Result<Vec<OrderDetail>, OrderError> {
        let mut details = Vec::with_capacity(orders.len());
        for order in orders {
            details.push(self.expand(order).await?);
        }
        Ok(details)
    }

    /// Expand consumer/farmer links into display form.
    async fn expand(&self, order: Order) -> Result<OrderDetail, OrderError> {
        let consumer = self.expand_user(&order.consumer).await?;
        let farmer = self.expand_user(&order.farmer).await?;
        Ok(OrderDetail::from_parts(order, consumer, farmer))
    }

    async fn expand_user(&self, id: &RecordId) -> Result<UserBrief, OrderError> {
        match self.users.find_by_id(id).await? {
            Some(user) => Ok(user.into()),
            // Users are never deleted in normal operation; keep the order
            // readable if one ever is.
            None => Ok(UserBrief {
                id: Some(id.clone()),
                telegram_id: 0,
                first_name: String::new(),
                username: None,
                farm_name: None,
                location: None,
                phone_number: None,
                delivery_address: None,
            }),
        }
    }
}
