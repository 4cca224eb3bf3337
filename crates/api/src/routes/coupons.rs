//! Route definitions for the `/coupons` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::coupons;
use crate::state::AppState;

/// Routes mounted at `/coupons`.
///
/// ```text
/// GET    /           -> list
/// POST   /           -> create
/// POST   /validate   -> validate  (discount preview, needs ORDERS:CREATE)
/// GET    /{id}       -> get_by_id
/// PUT    /{id}       -> update
/// DELETE /{id}       -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(coupons::list).post(coupons::create))
        .route("/validate", post(coupons::validate))
        .route(
            "/{id}",
            get(coupons::get_by_id)
                .put(coupons::update)
                .delete(coupons::delete),
        )
}
