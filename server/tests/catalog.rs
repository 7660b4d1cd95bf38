//! Catalog and user directory tests

use agrilink_server::db::DbService;
use agrilink_server::db::models::{Product, ProductCreate, ProductFilter, ProductUpdate, User, UserRole};
use agrilink_server::db::repository::{ProductRepository, RepoError, UserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tempfile::TempDir;

const FARMER_TG: i64 = 555_001;

struct TestEnv {
    _tmp: TempDir,
    _db: Surreal<Db>,
    users: UserRepository,
    products: ProductRepository,
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
        _db: db,
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
        .expect("set role")
}

fn payload(name: &str, price: f64, stock: i64, farmer_tg: i64) -> ProductCreate {
    ProductCreate {
        name: Some(name.to_string()),
        description: None,
        price: Some(price),
        category: Some("vegetables".to_string()),
        stock: Some(stock),
        location: None,
        farmer_telegram_id: farmer_tg,
        farmer_name: None,
        farmer_username: None,
        images: None,
        tags: None,
    }
}

async fn create(env: &TestEnv, farmer: &User, data: ProductCreate) -> Product {
    env.products.create(data, farmer).await.expect("create product")
}

#[tokio::test]
async fn availability_is_computed_from_stock() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;

    let in_stock = create(&env, &farmer, payload("Tomatoes", 10.0, 5, FARMER_TG)).await;
    assert!(in_stock.is_available);

    let sold_out = create(&env, &farmer, payload("Carrots", 2.0, 0, FARMER_TG)).await;
    assert!(!sold_out.is_available);
}

#[tokio::test]
async fn create_validates_required_fields() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;

    let mut missing_name = payload("x", 10.0, 5, FARMER_TG);
    missing_name.name = None;
    let err = env.products.create(missing_name, &farmer).await.unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let mut free_of_charge = payload("Tomatoes", 10.0, 5, FARMER_TG);
    free_of_charge.price = Some(0.0);
    let err = env
        .products
        .create(free_of_charge, &farmer)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let mut no_category = payload("Tomatoes", 10.0, 5, FARMER_TG);
    no_category.category = None;
    let err = env.products.create(no_category, &farmer).await.unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[tokio::test]
async fn listing_hides_unavailable_and_filters() {
    let env = setup().await;
    let farmer_a = seed_farmer(&env, FARMER_TG).await;
    let farmer_b = seed_farmer(&env, FARMER_TG + 1).await;

    create(&env, &farmer_a, payload("Tomatoes", 10.0, 5, FARMER_TG)).await;
    create(&env, &farmer_a, payload("Sold Out Beans", 4.0, 0, FARMER_TG)).await;
    let mut fruit = payload("Apples", 3.0, 8, FARMER_TG + 1);
    fruit.category = Some("fruit".to_string());
    create(&env, &farmer_b, fruit).await;

    // No filter: only available products
    let all = env.products.list(&ProductFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|p| p.is_available));

    // Category filter
    let fruit_only = env
        .products
        .list(&ProductFilter {
            category: Some("fruit".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(fruit_only.len(), 1);
    assert_eq!(fruit_only[0].name, "Apples");

    // Farmer filter
    let from_a = env
        .products
        .list(&ProductFilter {
            farmer_telegram_id: Some(FARMER_TG),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(from_a.len(), 1);
    assert_eq!(from_a[0].name, "Tomatoes");
}

#[tokio::test]
async fn free_text_search_matches_name_and_description() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;

    let mut heirloom = payload("Heirloom Tomatoes", 12.0, 5, FARMER_TG);
    heirloom.description = Some("Sweet vine-ripened heirloom variety".to_string());
    create(&env, &farmer, heirloom).await;
    create(&env, &farmer, payload("Carrots", 2.0, 5, FARMER_TG)).await;

    let hits = env
        .products
        .list(&ProductFilter {
            search: Some("heirloom".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Heirloom Tomatoes");
}

#[tokio::test]
async fn update_patches_and_delete_removes() {
    let env = setup().await;
    let farmer = seed_farmer(&env, FARMER_TG).await;
    let product = create(&env, &farmer, payload("Tomatoes", 10.0, 5, FARMER_TG)).await;
    let id = product.id.clone().unwrap();

    let patched = env
        .products
        .update(
            &id,
            ProductUpdate {
                name: None,
                description: Some("Now with a description".to_string()),
                price: Some(11.5),
                category: None,
                stock: None,
                location: None,
                images: None,
                tags: None,
                is_available: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.price, 11.5);
    assert_eq!(patched.name, "Tomatoes");

    env.products.delete(&id).await.unwrap();
    assert!(env.products.find_by_id(&id).await.unwrap().is_none());

    let err = env.products.delete(&id).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn login_upsert_refreshes_name_but_never_role() {
    let env = setup().await;

    let first = env
        .users
        .upsert_login(42, "Alice", Some("alice"))
        .await
        .unwrap();
    assert_eq!(first.role, UserRole::Consumer);

    env.users.set_role(42, UserRole::Farmer).await.unwrap();

    let refreshed = env
        .users
        .upsert_login(42, "Alicia", Some("alicia_farm"))
        .await
        .unwrap();
    assert_eq!(refreshed.first_name, "Alicia");
    assert_eq!(refreshed.username.as_deref(), Some("alicia_farm"));
    // Role survives the refresh
    assert_eq!(refreshed.role, UserRole::Farmer);

    // Still a single record for that telegram id
    let looked_up = env.users.find_by_telegram_id(42).await.unwrap().unwrap();
    assert_eq!(looked_up.id, first.id);
}

#[tokio::test]
async fn set_role_on_unknown_user_is_not_found() {
    let env = setup().await;
    let err = env
        .users
        .set_role(99_999, UserRole::Farmer)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}
