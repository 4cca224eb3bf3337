//! Route definitions for the `/campaigns` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

/// Routes mounted at `/campaigns`.
///
/// ```text
/// GET    /        -> list    (?running)
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(campaigns::list).post(campaigns::create))
        .route(
            "/{id}",
            get(campaigns::get_by_id).put(campaigns::update).delete(campaigns::delete),
        )
}
