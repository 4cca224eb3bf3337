//! Repository integration tests against a real database.
//!
//! Covers constraint behaviour, transactional stock and coupon helpers,
//! list filters and the seeded settings.

use assert_matches::assert_matches;
use backoffice_db::models::campaign::CreateCampaign;
use backoffice_db::models::category::CreateCategory;
use backoffice_db::models::coupon::CreateCoupon;
use backoffice_db::models::customer::CreateCustomer;
use backoffice_db::models::inventory::CreateMovement;
use backoffice_db::models::order::{NewOrder, NewOrderItem};
use backoffice_db::models::product::CreateProduct;
use backoffice_db::models::user::CreateUser;
use backoffice_db::repositories::order_repo::OrderFilter;
use backoffice_db::repositories::product_repo::ProductFilter;
use backoffice_db::repositories::{
    CampaignRepo, CategoryRepo, CouponRepo, CustomerRepo, DashboardRepo, InventoryRepo, OrderRepo,
    ProductRepo, SettingRepo, UserRepo,
};
use chrono::{Duration, Utc};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_product(sku: &str, stock: i32) -> CreateProduct {
    CreateProduct {
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        slug: None,
        description: None,
        price: 10_000,
        compare_at_price: None,
        cost_price: None,
        stock: Some(stock),
        low_stock_threshold: None,
        category_id: None,
        brand_id: None,
        status: Some("ACTIVE".to_string()),
        images: None,
    }
}

async fn seed_product(pool: &PgPool, sku: &str, stock: i32) -> i64 {
    let mut conn = pool.acquire().await.unwrap();
    ProductRepo::create(&mut conn, &new_product(sku, stock), sku, &sku.to_lowercase())
        .await
        .unwrap()
        .id
}

fn new_customer(name: &str, email: Option<&str>) -> CreateCustomer {
    CreateCustomer {
        name: name.to_string(),
        email: email.map(str::to_string),
        phone: None,
        address: None,
        notes: None,
    }
}

async fn seed_user(pool: &PgPool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: "staff@example.com".to_string(),
            name: "Staff".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role: "STAFF".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn unique_constraint(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            db.constraint().map(str::to_string)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_sku_violates_unique_constraint(pool: PgPool) {
    seed_product(&pool, "SKU-001", 5).await;

    let mut conn = pool.acquire().await.unwrap();
    let err = ProductRepo::create(&mut conn, &new_product("SKU-001", 5), "SKU-001", "other-slug")
        .await
        .unwrap_err();
    assert_eq!(unique_constraint(&err).as_deref(), Some("uq_products_sku"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn negative_stock_is_rejected_by_check(pool: PgPool) {
    let id = seed_product(&pool, "SKU-002", 1).await;

    let mut conn = pool.acquire().await.unwrap();
    let err = ProductRepo::set_stock(&mut conn, id, -1).await.unwrap_err();
    assert_matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23514"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_email_lookup_is_case_insensitive(pool: PgPool) {
    seed_user(&pool).await;
    let found = UserRepo::find_by_email(&pool, "STAFF@Example.com")
        .await
        .unwrap();
    assert_matches!(found, Some(user) if user.role == "STAFF");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_logins_accumulate_and_reset(pool: PgPool) {
    let id = seed_user(&pool).await;

    assert_eq!(UserRepo::increment_failed_login(&pool, id).await.unwrap(), 1);
    assert_eq!(UserRepo::increment_failed_login(&pool, id).await.unwrap(), 2);
    UserRepo::lock_account(&pool, id, Utc::now() + Duration::minutes(15))
        .await
        .unwrap();

    UserRepo::record_successful_login(&pool, id).await.unwrap();
    let user = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(user.failed_login_count, 0);
    assert!(user.locked_until.is_none());
    assert!(user.last_login_at.is_some());
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn category_counts_products(pool: PgPool) {
    let category = CategoryRepo::create(
        &pool,
        &CreateCategory {
            name: "เสื้อผ้า".to_string(),
            slug: None,
            description: None,
            parent_id: None,
            sort_order: None,
            is_active: None,
        },
        "เสื้อผ้า",
    )
    .await
    .unwrap();

    let mut input = new_product("SKU-010", 3);
    input.category_id = Some(category.id);
    let mut conn = pool.acquire().await.unwrap();
    ProductRepo::create(&mut conn, &input, "SKU-010", "sku-010")
        .await
        .unwrap();

    assert_eq!(CategoryRepo::product_count(&pool, category.id).await.unwrap(), 1);
    let listed = CategoryRepo::list_with_counts(&pool).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].product_count, 1);
    assert_eq!(listed[0].category.slug, "เสื้อผ้า");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn product_list_filters_low_stock_and_search(pool: PgPool) {
    seed_product(&pool, "LOW-001", 2).await;
    seed_product(&pool, "FULL-001", 50).await;

    let (low, total) = ProductRepo::list(
        &pool,
        ProductFilter {
            low_stock: true,
            ..Default::default()
        },
        20,
        0,
    )
    .await
    .unwrap();
    assert_eq!(total, 1);
    assert_eq!(low[0].sku, "LOW-001");

    let (found, total) = ProductRepo::list(
        &pool,
        ProductFilter {
            search: Some("full"),
            ..Default::default()
        },
        20,
        0,
    )
    .await
    .unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].sku, "FULL-001");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sku_exists_ignores_the_excluded_row(pool: PgPool) {
    let id = seed_product(&pool, "SKU-020", 1).await;

    assert!(ProductRepo::sku_exists(&pool, "SKU-020", None).await.unwrap());
    assert!(!ProductRepo::sku_exists(&pool, "SKU-020", Some(id)).await.unwrap());
}

// ---------------------------------------------------------------------------
// Coupons
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn coupon_claims_stop_at_usage_limit(pool: PgPool) {
    let coupon = CouponRepo::create(
        &pool,
        &CreateCoupon {
            code: "once".to_string(),
            description: None,
            discount_type: "FIXED_AMOUNT".to_string(),
            discount_value: 5_000,
            min_purchase: None,
            max_discount: None,
            usage_limit: Some(1),
            starts_at: None,
            ends_at: None,
            is_active: None,
        },
        "ONCE",
    )
    .await
    .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    assert!(CouponRepo::claim_use(&mut conn, coupon.id).await.unwrap());
    assert!(!CouponRepo::claim_use(&mut conn, coupon.id).await.unwrap());

    CouponRepo::release_use(&mut conn, coupon.id).await.unwrap();
    let reloaded = CouponRepo::find_by_code(&pool, "once").await.unwrap().unwrap();
    assert_eq!(reloaded.used_count, 0);
}

// ---------------------------------------------------------------------------
// Orders and inventory
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn order_insert_rolls_back_with_transaction(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    let product_id = seed_product(&pool, "SKU-030", 10).await;
    let mut conn = pool.acquire().await.unwrap();
    let customer = CustomerRepo::create(&mut conn, &new_customer("Somchai", None))
        .await
        .unwrap();
    drop(conn);

    let mut tx = pool.begin().await.unwrap();
    let product = ProductRepo::lock_for_update(&mut tx, product_id)
        .await
        .unwrap()
        .unwrap();
    let order = OrderRepo::insert(
        &mut tx,
        &NewOrder {
            order_number: "ORD-20260101-ABC123".to_string(),
            customer_id: customer.id,
            payment_method: None,
            subtotal: 20_000,
            discount: 0,
            shipping_fee: 0,
            tax: 0,
            total: 20_000,
            coupon_id: None,
            shipping_address: None,
            note: None,
            created_by: user_id,
        },
    )
    .await
    .unwrap();
    let item = OrderRepo::insert_item(
        &mut tx,
        order.id,
        &NewOrderItem {
            product_id,
            product_name: product.name.clone(),
            sku: product.sku.clone(),
            quantity: 2,
            unit_price: product.price,
            line_total: 2 * product.price,
        },
    )
    .await
    .unwrap();
    assert_eq!(item.line_total, 20_000);
    ProductRepo::set_stock(&mut tx, product_id, 8).await.unwrap();
    tx.rollback().await.unwrap();

    assert!(OrderRepo::find_by_id(&pool, order.id).await.unwrap().is_none());
    let product = ProductRepo::find_by_id(&pool, product_id).await.unwrap().unwrap();
    assert_eq!(product.stock, 10);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn order_list_joins_customer_and_counts_items(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    let product_id = seed_product(&pool, "SKU-040", 10).await;

    let mut tx = pool.begin().await.unwrap();
    let customer = CustomerRepo::create(&mut tx, &new_customer("Malee", Some("Malee@Example.com")))
        .await
        .unwrap();
    let order = OrderRepo::insert(
        &mut tx,
        &NewOrder {
            order_number: "ORD-20260101-XYZ789".to_string(),
            customer_id: customer.id,
            payment_method: Some("COD".to_string()),
            subtotal: 10_000,
            discount: 0,
            shipping_fee: 5_000,
            tax: 700,
            total: 15_700,
            coupon_id: None,
            shipping_address: None,
            note: None,
            created_by: user_id,
        },
    )
    .await
    .unwrap();
    OrderRepo::insert_item(
        &mut tx,
        order.id,
        &NewOrderItem {
            product_id,
            product_name: "Product SKU-040".to_string(),
            sku: "SKU-040".to_string(),
            quantity: 1,
            unit_price: 10_000,
            line_total: 10_000,
        },
    )
    .await
    .unwrap();
    CustomerRepo::add_order_totals(&mut tx, customer.id, 1, 15_700)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let (rows, total) = OrderRepo::list(
        &pool,
        OrderFilter {
            search: Some("malee"),
            ..Default::default()
        },
        20,
        0,
    )
    .await
    .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].customer_name, "Malee");
    assert_eq!(rows[0].item_count, 1);

    let customer = CustomerRepo::find_by_id(&pool, customer.id).await.unwrap().unwrap();
    assert_eq!(customer.email.as_deref(), Some("malee@example.com"));
    assert_eq!(customer.total_orders, 1);
    assert_eq!(customer.total_spent, 15_700);
    assert_eq!(CustomerRepo::order_count(&pool, customer.id).await.unwrap(), 1);

    let stats = DashboardRepo::stats(&pool).await.unwrap();
    assert_eq!(stats.counters.total_orders, 1);
    assert_eq!(stats.counters.pending_orders, 1);
    assert_eq!(stats.counters.revenue, 15_700);
    assert_eq!(stats.recent_orders.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn movements_list_newest_first(pool: PgPool) {
    let product_id = seed_product(&pool, "SKU-050", 0).await;
    let mut conn = pool.acquire().await.unwrap();
    for (before, after) in [(0i32, 10i32), (10, 7)] {
        InventoryRepo::insert_movement(
            &mut conn,
            &CreateMovement {
                product_id,
                movement_type: if after > before { "IN" } else { "OUT" }.to_string(),
                quantity: (after - before).abs(),
                stock_before: before,
                stock_after: after,
                reason: None,
                user_id: None,
            },
        )
        .await
        .unwrap();
    }

    let (rows, total) = InventoryRepo::list_for_product(&pool, product_id, 20, 0)
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(rows[0].movement_type, "OUT");
    assert_eq!(rows[0].stock_after, 7);

    // The ledger does not move the product row; its stock is still 0.
    let (levels, total) = InventoryRepo::stock_levels(&pool, true, 20, 0).await.unwrap();
    assert_eq!(total, 1);
    assert!(levels[0].is_low_stock);
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn campaign_list_can_keep_only_running(pool: PgPool) {
    let now = Utc::now();
    let windows = [
        ("Songkran Sale", now - Duration::days(1), now + Duration::days(1), true),
        ("Year End", now + Duration::days(3), now + Duration::days(6), true),
        ("Paused", now - Duration::days(1), now + Duration::days(1), false),
        ("Last Month", now - Duration::days(40), now - Duration::days(30), true),
    ];
    for (name, starts_at, ends_at, active) in windows {
        CampaignRepo::create(
            &pool,
            &CreateCampaign {
                name: name.to_string(),
                description: None,
                campaign_type: "SALE".to_string(),
                discount_percent: Some(10),
                starts_at,
                ends_at,
                is_active: Some(active),
                budget: None,
                banner_url: None,
            },
        )
        .await
        .unwrap();
    }

    let (all, total) = CampaignRepo::list(&pool, false, now, 50, 0).await.unwrap();
    assert_eq!(total, 4);
    assert_eq!(all[0].name, "Year End");

    let (running, total) = CampaignRepo::list(&pool, true, now, 50, 0).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(running.len(), 1);
    assert_eq!(running[0].name, "Songkran Sale");
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn settings_are_seeded_and_upserted(pool: PgPool) {
    let currency = SettingRepo::get(&pool, "currency").await.unwrap().unwrap();
    assert_eq!(currency.value, serde_json::json!("THB"));

    let updated = SettingRepo::upsert(&pool, "currency", &serde_json::json!("USD"), None)
        .await
        .unwrap();
    assert_eq!(updated.value, serde_json::json!("USD"));
    assert_eq!(updated.description.as_deref(), Some("ISO 4217 currency code"));

    assert!(SettingRepo::delete(&pool, "currency").await.unwrap());
    assert!(SettingRepo::get(&pool, "currency").await.unwrap().is_none());
}
