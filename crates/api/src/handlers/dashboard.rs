//! Handler for the dashboard landing page.

use axum::extract::State;
use axum::Json;
use backoffice_core::permissions::{Action, Resource};
use backoffice_db::models::dashboard::DashboardStats;
use backoffice_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    auth.require(Resource::Dashboard, Action::View)?;
    let stats = DashboardRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse::new(stats)))
}
