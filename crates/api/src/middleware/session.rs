//! Session gate for everything under `/api/v1` except public auth endpoints.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Reject requests without a valid session token with 401.
///
/// On success the [`AuthUser`] is stored in the request extensions so
/// handlers do not decode the token twice.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = AuthUser::from_headers(request.headers(), &state.config.jwt)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
