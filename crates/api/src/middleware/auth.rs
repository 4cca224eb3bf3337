//! Session-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use backoffice_core::error::CoreError;
use backoffice_core::roles::Role;
use backoffice_core::types::DbId;

use crate::auth::cookie::token_from_cookies;
use crate::auth::jwt::{validate_token, JwtConfig};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller.
///
/// The token is read from `Authorization: Bearer <token>` first, then from
/// the session cookie. When [`require_session`](super::session::require_session)
/// already ran, the user it stored in the request extensions is reused.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     user.require(Resource::Products, Action::View)?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: Role,
}

impl AuthUser {
    /// Authenticate from request headers.
    pub fn from_headers(headers: &HeaderMap, jwt: &JwtConfig) -> Result<Self, AppError> {
        let token = bearer_token(headers)?
            .or_else(|| token_from_cookies(headers))
            .ok_or_else(|| unauthorized("Missing session token"))?;

        let claims =
            validate_token(token, jwt).map_err(|_| unauthorized("Invalid or expired token"))?;
        let role = Role::parse(&claims.role).map_err(|_| unauthorized("Unknown role in token"))?;

        Ok(AuthUser {
            user_id: claims.sub,
            role,
        })
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        AuthUser::from_headers(&parts.headers, &state.config.jwt)
    }
}

/// The Bearer token, if an `Authorization` header is present.
///
/// A header with any other scheme is rejected rather than ignored.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;
    value.strip_prefix("Bearer ").map(Some).ok_or_else(|| {
        unauthorized("Invalid Authorization format. Expected: Bearer <token>")
    })
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}
