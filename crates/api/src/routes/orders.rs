//! Route definitions for the `/orders` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

/// Routes mounted at `/orders`.
///
/// ```text
/// GET    /              -> list    (?status, customer_id, search)
/// POST   /              -> create
/// GET    /{id}          -> get_by_id
/// DELETE /{id}          -> delete
/// PUT    /{id}/status   -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route("/{id}", get(orders::get_by_id).delete(orders::delete))
        .route("/{id}/status", put(orders::update_status))
}
