//! Route definitions for `/auth`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes reachable without a session.
///
/// ```text
/// POST /auth/login    -> login
/// POST /auth/refresh  -> refresh
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
}

/// Routes behind the session gate.
///
/// ```text
/// POST /auth/logout   -> logout
/// GET  /auth/me       -> me
/// ```
pub fn session_router() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
}
