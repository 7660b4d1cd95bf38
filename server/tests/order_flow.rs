//! Order engine end-to-end tests
//!
//! Run against a real embedded store in a temp directory: reservation,
//! totals, availability invariant, rollback, and restoration.

use agrilink_server::db::DbService;
use agrilink_server::db::models::{
    IdentifierValue, OrderCreate, OrderItemInput, OrderStatus, Product, ProductCreate, User,
    UserRole,
};
use agrilink_server::db::repository::{ProductRepository, UserRepository};
use agrilink_server::orders::{OrderError, OrderManager};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tempfile::TempDir;

const FARMER_TG: i64 = 777_001;
const CONSUMER_TG: i64 = 12345;

struct TestEnv {
    _tmp: TempDir,
    db: Surreal<Db>,
    users: UserRepository,
    products: ProductRepository,
    manager: OrderManager,
}

async fn setup() -> TestEnv {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("agrilink.db");
    let service = DbService::new(&path.to_string_lossy())
        .await
        .expect("open db");
    let db = service.db;
    TestEnv {
        _tmp: tmp,
        users: UserRepository::new(db.clone()),
        products: ProductRepository::new(db.clone()),
        manager: OrderManager::new(db.clone()),
        db,
    }
}

async fn seed_farmer(env: &TestEnv, telegram_id: i64) -> User {
    env.users
        .upsert_login(telegram_id, "Bob", Some("bobs_farm"))
        .await
        .expect("create farmer");
    env.users
        .set_role(telegram_id, UserRole::Farmer)
        .await
        .expect("set farmer role")
}

async fn seed_consumer(env: &TestEnv, telegram_id: i64) -> User {
    env.users
        .upsert_login(telegram_id, "Alice", Some("alice"))
        .await
        .expect("create consumer")
}

async fn seed_product(env: &TestEnv, farmer: &User, name: &str, price: f64, stock: i64) -> Product {
    let spec = ProductCreate {
        name: Some(name.to_string()),
        description: Some(format!("{name} fresh from the farm")),
        price: Some(price),
        category: Some("vegetables".to_string()),
        stock: Some(stock),
        location: None,
        farmer_telegram_id: farmer.telegram_id,
        farmer_name: None,
        farmer_username: None,
        images: Some(vec![format!("https://img.example/{name}.jpg")]),
        tags: None,
    };
    env.products.create(spec, farmer).await.expect("create product")
}

fn order_of(consumer_tg: i64, lines: &[(&Product, i64)]) -> OrderCreate {
    OrderCreate {
        consumer_id: Some(IdentifierValue::Int(consumer_tg)),
        items: lines
            .iter()
            .map(|(product, quantity)| OrderItemInput {
                product_id: product.id.as_ref().unwrap().to_string(),
                quantity: *quantity,
            })
            .collect(),
        delivery_address: Some("42 Market Street".to_string()),
        customer_phone: Some("+100000000".to_string()),
        customer_notes: None,
        payment_method: None,
    }
}

async fn reload(env: &TestEnv, product: &Product) -> Product {
    env.products
        .find_by_id(product.id.as_ref().unwrap())
        .await
        .expect("reload product")
        .expect("product exists")
}

#[tokio::test]
async fn order_totals_and_stock_decrement() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;
    let consumer = seed_consumer(&env, CONSUMER_TG).await;
    let tomatoes = seed_product(&env, &farmer, "Tomatoes", 10.0, 5).await;

    let detail = env
        .manager
        .create_order(order_of(CONSUMER_TG, &[(&tomatoes, 2)]))
        .await
        .expect("order should succeed");

    assert_eq!(detail.total_amount, 20.0);
    assert_eq!(detail.status, OrderStatus::Pending);
    assert_eq!(detail.payment_method, "cash");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].price, 10.0);
    assert_eq!(detail.items[0].quantity, 2);
    assert_eq!(detail.items[0].product_name, "Tomatoes");
    assert_eq!(
        detail.items[0].image.as_deref(),
        Some("https://img.example/Tomatoes.jpg")
    );
    assert_eq!(detail.consumer.telegram_id, consumer.telegram_id);
    assert_eq!(detail.farmer.telegram_id, farmer.telegram_id);

    let after = reload(&env, &tomatoes).await;
    assert_eq!(after.stock, 3);
    assert!(after.is_available);
}

#[tokio::test]
async fn total_spans_multiple_lines() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;
    seed_consumer(&env, CONSUMER_TG).await;
    let tomatoes = seed_product(&env, &farmer, "Tomatoes", 10.0, 5).await;
    let carrots = seed_product(&env, &farmer, "Carrots", 2.5, 10).await;

    let detail = env
        .manager
        .create_order(order_of(CONSUMER_TG, &[(&tomatoes, 2), (&carrots, 4)]))
        .await
        .expect("order should succeed");

    // total == sum over line items of price * quantity
    let expected: f64 = detail
        .items
        .iter()
        .map(|item| item.price * item.quantity as f64)
        .sum();
    assert_eq!(detail.total_amount, expected);
    assert_eq!(detail.total_amount, 30.0);

    assert_eq!(reload(&env, &tomatoes).await.stock, 3);
    assert_eq!(reload(&env, &carrots).await.stock, 6);
}

#[tokio::test]
async fn draining_stock_flips_availability() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;
    seed_consumer(&env, CONSUMER_TG).await;
    let tomatoes = seed_product(&env, &farmer, "Tomatoes", 10.0, 2).await;

    env.manager
        .create_order(order_of(CONSUMER_TG, &[(&tomatoes, 2)]))
        .await
        .expect("order should succeed");

    let after = reload(&env, &tomatoes).await;
    assert_eq!(after.stock, 0);
    assert!(!after.is_available);
}

#[tokio::test]
async fn cancellation_restores_stock_once() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;
    seed_consumer(&env, CONSUMER_TG).await;
    let tomatoes = seed_product(&env, &farmer, "Tomatoes", 10.0, 2).await;

    let detail = env
        .manager
        .create_order(order_of(CONSUMER_TG, &[(&tomatoes, 2)]))
        .await
        .expect("order should succeed");
    let order_id = detail.id.as_ref().unwrap().to_string();

    let drained = reload(&env, &tomatoes).await;
    assert_eq!(drained.stock, 0);
    assert!(!drained.is_available);

    let cancelled = env
        .manager
        .update_status(&order_id, "cancelled")
        .await
        .expect("cancel should succeed");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let restored = reload(&env, &tomatoes).await;
    assert_eq!(restored.stock, 2);
    assert!(restored.is_available);

    // Cancelling an already-cancelled order must not double-restore
    env.manager
        .update_status(&order_id, "cancelled")
        .await
        .expect("repeat cancel is accepted");
    assert_eq!(reload(&env, &tomatoes).await.stock, 2);
}

#[tokio::test]
async fn forward_transitions_leave_stock_alone() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;
    seed_consumer(&env, CONSUMER_TG).await;
    let tomatoes = seed_product(&env, &farmer, "Tomatoes", 10.0, 5).await;

    let detail = env
        .manager
        .create_order(order_of(CONSUMER_TG, &[(&tomatoes, 2)]))
        .await
        .unwrap();
    let order_id = detail.id.as_ref().unwrap().to_string();

    for (raw, expected) in [
        ("confirmed", OrderStatus::Confirmed),
        ("shipped", OrderStatus::Shipped),
        ("delivered", OrderStatus::Delivered),
    ] {
        let updated = env.manager.update_status(&order_id, raw).await.unwrap();
        assert_eq!(updated.status, expected);
    }
    assert_eq!(reload(&env, &tomatoes).await.stock, 3);

    let err = env
        .manager
        .update_status(&order_id, "returned")
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidStatus(_)));
}

#[tokio::test]
async fn empty_item_list_is_rejected() {
    let env = setup().await;
    seed_consumer(&env, CONSUMER_TG).await;

    let request = OrderCreate {
        consumer_id: Some(IdentifierValue::Int(CONSUMER_TG)),
        items: vec![],
        delivery_address: None,
        customer_phone: None,
        customer_notes: None,
        payment_method: None,
    };

    let err = env.manager.create_order(request).await.unwrap_err();
    assert!(matches!(err, OrderError::EmptyOrder));
}

#[tokio::test]
async fn unknown_consumer_is_rejected() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;
    let tomatoes = seed_product(&env, &farmer, "Tomatoes", 10.0, 5).await;

    let err = env
        .manager
        .create_order(order_of(99_999, &[(&tomatoes, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::ConsumerNotFound));
    assert_eq!(reload(&env, &tomatoes).await.stock, 5);
}

#[tokio::test]
async fn insufficient_stock_mutates_nothing() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;
    seed_consumer(&env, CONSUMER_TG).await;
    let tomatoes = seed_product(&env, &farmer, "Tomatoes", 10.0, 1).await;

    let err = env
        .manager
        .create_order(order_of(CONSUMER_TG, &[(&tomatoes, 2)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InsufficientStock { .. }));

    let untouched = reload(&env, &tomatoes).await;
    assert_eq!(untouched.stock, 1);
    assert!(untouched.is_available);
}

#[tokio::test]
async fn failed_line_rolls_back_earlier_reservations() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;
    seed_consumer(&env, CONSUMER_TG).await;
    let tomatoes = seed_product(&env, &farmer, "Tomatoes", 10.0, 5).await;
    let carrots = seed_product(&env, &farmer, "Carrots", 2.5, 1).await;

    let err = env
        .manager
        .create_order(order_of(CONSUMER_TG, &[(&tomatoes, 2), (&carrots, 2)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InsufficientStock { .. }));

    // The tomato reservation must have been compensated
    assert_eq!(reload(&env, &tomatoes).await.stock, 5);
    assert_eq!(reload(&env, &carrots).await.stock, 1);
}

#[tokio::test]
async fn unavailable_product_is_rejected() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;
    seed_consumer(&env, CONSUMER_TG).await;
    let tomatoes = seed_product(&env, &farmer, "Tomatoes", 10.0, 0).await;

    assert!(!tomatoes.is_available);

    let err = env
        .manager
        .create_order(order_of(CONSUMER_TG, &[(&tomatoes, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Unavailable(_)));
}

#[tokio::test]
async fn mixed_farmer_orders_are_rejected_and_rolled_back() {
    let env = setup().await;
    let farmer_a = seed_farmer(&env, FARMER_TG).await;
    let farmer_b = seed_farmer(&env, FARMER_TG + 1).await;
    seed_consumer(&env, CONSUMER_TG).await;
    let tomatoes = seed_product(&env, &farmer_a, "Tomatoes", 10.0, 5).await;
    let honey = seed_product(&env, &farmer_b, "Honey", 15.0, 3).await;

    let err = env
        .manager
        .create_order(order_of(CONSUMER_TG, &[(&tomatoes, 1), (&honey, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::MixedFarmers));

    assert_eq!(reload(&env, &tomatoes).await.stock, 5);
    assert_eq!(reload(&env, &honey).await.stock, 3);
}

#[tokio::test]
async fn invalid_product_id_is_a_validation_error() {
    let env = setup().await;
    seed_consumer(&env, CONSUMER_TG).await;

    let request = OrderCreate {
        consumer_id: Some(IdentifierValue::Int(CONSUMER_TG)),
        items: vec![OrderItemInput {
            product_id: "not-a-record-id".to_string(),
            quantity: 1,
        }],
        delivery_address: None,
        customer_phone: None,
        customer_notes: None,
        payment_method: None,
    };

    let err = env.manager.create_order(request).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidProductId(_)));
}

#[tokio::test]
async fn missing_product_is_not_found() {
    let env = setup().await;
    seed_consumer(&env, CONSUMER_TG).await;

    let request = OrderCreate {
        consumer_id: Some(IdentifierValue::Int(CONSUMER_TG)),
        items: vec![OrderItemInput {
            product_id: "product:doesnotexist".to_string(),
            quantity: 1,
        }],
        delivery_address: None,
        customer_phone: None,
        customer_notes: None,
        payment_method: None,
    };

    let err = env.manager.create_order(request).await.unwrap_err();
    assert!(matches!(err, OrderError::ProductNotFound(_)));
}

#[tokio::test]
async fn order_lists_resolve_either_identifier_scheme() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;
    let consumer = seed_consumer(&env, CONSUMER_TG).await;
    let tomatoes = seed_product(&env, &farmer, "Tomatoes", 10.0, 5).await;

    env.manager
        .create_order(order_of(CONSUMER_TG, &[(&tomatoes, 1)]))
        .await
        .unwrap();

    // By external telegram id
    let by_telegram = env
        .manager
        .list_for_consumer(&CONSUMER_TG.to_string())
        .await
        .unwrap();
    assert_eq!(by_telegram.len(), 1);

    // By internal record id
    let record_id = consumer.id.as_ref().unwrap().to_string();
    let by_record = env.manager.list_for_consumer(&record_id).await.unwrap();
    assert_eq!(by_record.len(), 1);

    // Farmer side too
    let farmer_orders = env
        .manager
        .list_for_farmer(&FARMER_TG.to_string())
        .await
        .unwrap();
    assert_eq!(farmer_orders.len(), 1);
    assert_eq!(farmer_orders[0].consumer.telegram_id, CONSUMER_TG);

    // Unrecognized external id resolves to nothing
    let err = env.manager.list_for_consumer("99999").await.unwrap_err();
    assert!(matches!(err, OrderError::UserNotFound(_)));
}

#[tokio::test]
async fn orders_list_newest_first() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;
    seed_consumer(&env, CONSUMER_TG).await;
    let tomatoes = seed_product(&env, &farmer, "Tomatoes", 10.0, 50).await;

    for quantity in [1, 2, 3] {
        env.manager
            .create_order(order_of(CONSUMER_TG, &[(&tomatoes, quantity)]))
            .await
            .unwrap();
        // created_at has millisecond resolution
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let orders = env
        .manager
        .list_for_consumer(&CONSUMER_TG.to_string())
        .await
        .unwrap();
    assert_eq!(orders.len(), 3);
    assert!(orders[0].created_at >= orders[1].created_at);
    assert!(orders[1].created_at >= orders[2].created_at);
    // Newest order was the quantity-3 one
    assert_eq!(orders[0].items[0].quantity, 3);
}

#[tokio::test]
async fn delivery_address_defaults_to_consumer_profile() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;
    let consumer = seed_consumer(&env, CONSUMER_TG).await;
    let tomatoes = seed_product(&env, &farmer, "Tomatoes", 10.0, 5).await;

    // Give the consumer a stored delivery address
    env.db
        .query("UPDATE $id SET delivery_address = $addr")
        .bind(("id", consumer.id.clone().unwrap()))
        .bind(("addr", "7 Orchard Lane"))
        .await
        .unwrap();

    let mut request = order_of(CONSUMER_TG, &[(&tomatoes, 1)]);
    request.delivery_address = None;

    let detail = env.manager.create_order(request).await.unwrap();
    assert_eq!(detail.delivery_address.as_deref(), Some("7 Orchard Lane"));
}
