pub mod auth;
pub mod brands;
pub mod campaigns;
pub mod categories;
pub mod coupons;
pub mod customers;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod settings;
pub mod users;

use axum::middleware;
use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::middleware::session::require_session;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login, /auth/refresh                       public
///
/// -- everything below requires a session --
/// /auth/logout, /auth/me
/// /roles                                           roles and their grants
/// /dashboard/stats                                 counters and revenue
/// /users[/{id}[/reset-password]]
/// /products[/{id}]
/// /categories[/{id}]
/// /brands[/{id}]
/// /customers[/{id}[/orders]]
/// /orders[/{id}[/status]]
/// /coupons[/validate | /{id}]
/// /campaigns[/{id}]
/// /inventory[/{product_id}/adjust | /{product_id}/movements]
/// /settings[/{key}]
/// ```
///
/// The session gate is a `route_layer`, so unknown paths still return 404
/// rather than 401.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(auth::session_router())
        .route("/roles", get(handlers::roles::list))
        .route("/dashboard/stats", get(handlers::dashboard::stats))
        .nest("/users", users::router())
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/brands", brands::router())
        .nest("/customers", customers::router())
        .nest("/orders", orders::router())
        .nest("/coupons", coupons::router())
        .nest("/campaigns", campaigns::router())
        .nest("/inventory", inventory::router())
        .nest("/settings", settings::router())
        .route_layer(middleware::from_fn_with_state(state, require_session));

    Router::new()
        .merge(auth::public_router())
        .merge(protected)
}
