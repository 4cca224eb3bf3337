//! Categories, products and manual stock movements over HTTP.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json_auth, put_json_auth, token_for_role};
use serde_json::json;
use sqlx::PgPool;

async fn create_category(pool: &PgPool, token: &str, body: serde_json::Value) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/categories", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn create_product(pool: &PgPool, token: &str, body: serde_json::Value) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/products", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn category_slug_is_derived_from_thai_name(pool: PgPool) {
    let token = token_for_role(&pool, "MANAGER").await;

    let category = create_category(&pool, &token, json!({ "name": "เสื้อ ยืด" })).await;
    assert_eq!(category["slug"], "เสื้อ-ยืด");

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/categories",
        json!({ "name": "T-Shirts", "slug": "เสื้อ-ยืด" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/categories",
        json!({ "name": "Shoes", "slug": "Not A Slug" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn category_cannot_become_its_own_ancestor(pool: PgPool) {
    let token = token_for_role(&pool, "MANAGER").await;

    let parent = create_category(&pool, &token, json!({ "name": "Apparel" })).await;
    let child = create_category(
        &pool,
        &token,
        json!({ "name": "Shirts", "parent_id": parent["id"] }),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/categories/{}", parent["id"]);
    let response = put_json_auth(app, &uri, json!({ "parent_id": child["id"] }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = put_json_auth(app, &uri, json!({ "parent_id": parent["id"] }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn product_sku_is_normalised_and_unique(pool: PgPool) {
    let token = token_for_role(&pool, "MANAGER").await;

    let product = create_product(
        &pool,
        &token,
        json!({ "sku": " tee-001 ", "name": "Basic Tee", "price": 25000 }),
    )
    .await;
    assert_eq!(product["sku"], "TEE-001");
    assert_eq!(product["slug"], "basic-tee");
    assert_eq!(product["status"], "DRAFT");

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/products",
        json!({ "sku": "Tee-001", "name": "Another Tee", "price": 1000 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "SKU already exists");

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/products",
        json!({ "sku": "BAD SKU!", "name": "Broken", "price": 1000 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn product_references_must_exist(pool: PgPool) {
    let token = token_for_role(&pool, "MANAGER").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/products",
        json!({ "sku": "ORPHAN-1", "name": "Orphan", "price": 1000, "category_id": 999999 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn opening_stock_is_recorded_as_a_movement(pool: PgPool) {
    let token = token_for_role(&pool, "MANAGER").await;
    let product = create_product(
        &pool,
        &token,
        json!({ "sku": "MUG-01", "name": "Mug", "price": 15000, "stock": 12 }),
    )
    .await;

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/inventory/{}/movements", product["id"]);
    let response = get_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    let movement = &json["data"][0];
    assert_eq!(movement["movement_type"], "IN");
    assert_eq!(movement["quantity"], 12);
    assert_eq!(movement["stock_before"], 0);
    assert_eq!(movement["stock_after"], 12);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn category_with_products_cannot_be_deleted(pool: PgPool) {
    let token = token_for_role(&pool, "MANAGER").await;
    let category = create_category(&pool, &token, json!({ "name": "Kitchen" })).await;
    create_product(
        &pool,
        &token,
        json!({ "sku": "PAN-01", "name": "Pan", "price": 50000, "category_id": category["id"] }),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/categories", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["product_count"], 1);

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/categories/{}", category["id"]);
    let response = delete_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn manual_adjustments_keep_stock_non_negative(pool: PgPool) {
    let manager = token_for_role(&pool, "MANAGER").await;
    let staff = token_for_role(&pool, "STAFF").await;
    let product = create_product(
        &pool,
        &manager,
        json!({ "sku": "BAG-01", "name": "Bag", "price": 90000, "stock": 5 }),
    )
    .await;
    let uri = format!("/api/v1/inventory/{}/adjust", product["id"]);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, json!({ "movement_type": "OUT", "quantity": 6 }), &staff).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, json!({ "movement_type": "SALE", "quantity": 1 }), &staff).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let body = json!({ "movement_type": "ADJUST", "quantity": 3, "reason": "Stock count" });
    let response = post_json_auth(app, &uri, body, &staff).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let movement = body_json(response).await;
    assert_eq!(movement["data"]["stock_before"], 5);
    assert_eq!(movement["data"]["stock_after"], 3);

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/products/{}", product["id"]);
    let response = get_auth(app, &uri, &staff).await;
    assert_eq!(body_json(response).await["data"]["stock"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn brand_in_use_cannot_be_deleted(pool: PgPool) {
    let token = token_for_role(&pool, "MANAGER").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/brands", json!({ "name": "Acme" }), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let brand = body_json(response).await["data"].clone();

    let category = create_category(&pool, &token, json!({ "name": "Tools" })).await;
    let product = create_product(
        &pool,
        &token,
        json!({
            "sku": "HAMMER-1",
            "name": "Hammer",
            "price": 25000,
            "compare_at_price": 30000,
            "brand_id": brand["id"],
            "category_id": category["id"],
        }),
    )
    .await;

    let brand_uri = format!("/api/v1/brands/{}", brand["id"]);
    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &brand_uri, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // `null` clears the brand and the sale marker; the category is untouched.
    let app = common::build_test_app(pool.clone());
    let product_uri = format!("/api/v1/products/{}", product["id"]);
    let clear = json!({ "brand_id": null, "compare_at_price": null });
    let response = put_json_auth(app, &product_uri, clear, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert!(updated["brand_id"].is_null());
    assert!(updated["compare_at_price"].is_null());
    assert_eq!(updated["category_id"], category["id"]);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &brand_uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &brand_uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn category_can_be_moved_back_to_top_level(pool: PgPool) {
    let token = token_for_role(&pool, "MANAGER").await;

    let parent = create_category(&pool, &token, json!({ "name": "Home" })).await;
    let child = create_category(
        &pool,
        &token,
        json!({ "name": "Lamps", "description": "Desk and floor", "parent_id": parent["id"] }),
    )
    .await;
    assert_eq!(child["parent_id"], parent["id"]);

    let uri = format!("/api/v1/categories/{}", child["id"]);
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, json!({ "parent_id": null }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert!(updated["parent_id"].is_null());
    assert_eq!(updated["description"], "Desk and floor");

    let app = common::build_test_app(pool);
    let response = put_json_auth(app, &uri, json!({ "description": null }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["description"].is_null());
}
