//! Route definitions for the `/customers` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::customers;
use crate::state::AppState;

/// Routes mounted at `/customers`.
///
/// ```text
/// GET    /              -> list    (?search)
/// POST   /              -> create
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// GET    /{id}/orders   -> orders  (needs ORDERS:VIEW)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::list).post(customers::create))
        .route(
            "/{id}",
            get(customers::get_by_id)
                .put(customers::update)
                .delete(customers::delete),
        )
        .route("/{id}/orders", get(customers::orders))
}
