//! Handlers for the `/auth` resource (login, refresh, logout, me).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use backoffice_core::error::CoreError;
use backoffice_core::permissions::permissions_for;
use backoffice_core::roles::Role;
use backoffice_db::models::session::CreateSession;
use backoffice_db::models::user::{User, UserResponse};
use backoffice_db::repositories::{SessionRepo, UserRepo};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::cookie::{clear_session_cookie, session_cookie};
use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Consecutive failed logins before the account is locked.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// How long a locked account stays locked.
pub const LOCK_DURATION_MINS: i64 = 15;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Returned by `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct CurrentUser {
    #[serde(flatten)]
    pub user: UserResponse,
    pub permissions: &'static [&'static str],
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns tokens and sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| unauthorized(INVALID_CREDENTIALS))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if user.locked_until.is_some_and(|until| until > Utc::now()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is temporarily locked. Try again later.".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let failures = UserRepo::increment_failed_login(&state.pool, user.id).await?;
        if failures >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, failures, "Account locked after failed logins");
        }
        return Err(unauthorized(INVALID_CREDENTIALS));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");

    issue_tokens(&state, user).await
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new token pair. The old token is revoked.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<impl IntoResponse> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_active_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| unauthorized("Invalid or expired refresh token"))?;

    // Losing the race to revoke means the token was already rotated.
    if !SessionRepo::revoke(&state.pool, session.id).await? {
        return Err(unauthorized("Invalid or expired refresh token"));
    }

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| unauthorized("User no longer exists"))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    issue_tokens(&state, user).await
}

/// POST /api/v1/auth/logout
///
/// Revoke every session of the caller and clear the cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> AppResult<impl IntoResponse> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth.user_id).await?;
    tracing::info!(user_id = auth.user_id, revoked, "User logged out");

    Ok((
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, clear_session_cookie(state.config.session_cookie_secure))],
    ))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<CurrentUser>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| unauthorized("User no longer exists"))?;

    Ok(Json(DataResponse::new(CurrentUser {
        user: user.into(),
        permissions: permissions_for(auth.role),
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Mint a token pair, persist the refresh session and set the cookie.
async fn issue_tokens(state: &AppState, user: User) -> AppResult<impl IntoResponse> {
    // The stored role is constrained by the schema; parse to fail loudly on drift.
    let role = Role::parse(&user.role)?;
    let jwt = &state.config.jwt;

    let access_token = generate_access_token(user.id, role.as_str(), jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at: Utc::now() + chrono::Duration::days(jwt.refresh_token_expiry_days),
        },
    )
    .await?;

    let expires_in = jwt.access_token_ttl_secs();
    let cookie = session_cookie(&access_token, expires_in, state.config.session_cookie_secure);

    Ok((
        [(SET_COOKIE, cookie)],
        Json(DataResponse::new(AuthResponse {
            access_token,
            refresh_token: refresh_plaintext,
            expires_in,
            user: user.into(),
        })),
    ))
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}
