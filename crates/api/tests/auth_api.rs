//! HTTP-level tests for login, refresh, logout, lockout and the session gate.

mod common;

use axum::body::Body;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use backoffice_api::handlers::auth::MAX_FAILED_ATTEMPTS;
use backoffice_db::repositories::UserRepo;
use common::{
    body_json, create_test_user, get, get_auth, login, post_json, post_json_auth, TEST_PASSWORD,
};
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_tokens_and_sets_cookie(pool: PgPool) {
    let user = create_test_user(&pool, "staff@test.local", "STAFF").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "Staff@Test.local", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .expect("login must set the session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("backoffice_session="));
    assert!(cookie.contains("HttpOnly"));

    let json = body_json(response).await;
    assert!(json["data"]["access_token"].is_string());
    assert!(json["data"]["refresh_token"].is_string());
    assert_eq!(json["data"]["expires_in"], 900);
    assert_eq!(json["data"]["user"]["id"], user.id);
    assert_eq!(json["data"]["user"]["role"], "STAFF");
    assert!(json["data"]["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_is_401_with_thai_message(pool: PgPool) {
    create_test_user(&pool, "viewer@test.local", "VIEWER").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "viewer@test.local", "password": "nope12345" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["message_th"], "กรุณาเข้าสู่ระบบ");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_failures_lock_the_account(pool: PgPool) {
    create_test_user(&pool, "locked@test.local", "STAFF").await;

    for _ in 0..MAX_FAILED_ATTEMPTS {
        let app = common::build_test_app(pool.clone());
        let body = serde_json::json!({ "email": "locked@test.local", "password": "wrongpass1" });
        let response = post_json(app, "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked.
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "email": "locked@test.local", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_user_cannot_log_in(pool: PgPool) {
    let user = create_test_user(&pool, "gone@test.local", "STAFF").await;
    UserRepo::deactivate(&pool, user.id).await.unwrap();

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "email": "gone@test.local", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_and_old_token_is_rejected(pool: PgPool) {
    create_test_user(&pool, "rotate@test.local", "STAFF").await;
    let session = login(&pool, "rotate@test.local").await;
    let original = session["refresh_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "refresh_token": original });
    let response = post_json(app, "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(json["data"]["refresh_token"].as_str().unwrap(), original);

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn protected_routes_require_a_session(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/products").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn session_cookie_authenticates_requests(pool: PgPool) {
    create_test_user(&pool, "cookie@test.local", "MANAGER").await;
    let session = login(&pool, "cookie@test.local").await;
    let token = session["access_token"].as_str().unwrap();

    let app = common::build_test_app(pool);
    let request = Request::builder()
        .uri("/api/v1/auth/me")
        .header(COOKIE, format!("theme=dark; backoffice_session={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "cookie@test.local");
    assert!(json["data"]["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p == "PRODUCTS:*"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_refresh_tokens(pool: PgPool) {
    create_test_user(&pool, "bye@test.local", "STAFF").await;
    let session = login(&pool, "bye@test.local").await;
    let token = session["access_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/auth/logout", serde_json::json!({}), token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cleared = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "refresh_token": session["refresh_token"] });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
