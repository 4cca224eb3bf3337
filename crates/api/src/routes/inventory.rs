//! Route definitions for the `/inventory` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::inventory;
use crate::state::AppState;

/// Routes mounted at `/inventory`.
///
/// ```text
/// GET  /                          -> list       (?low_stock)
/// POST /{product_id}/adjust       -> adjust
/// GET  /{product_id}/movements    -> movements
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(inventory::list))
        .route("/{product_id}/adjust", post(inventory::adjust))
        .route("/{product_id}/movements", get(inventory::movements))
}
