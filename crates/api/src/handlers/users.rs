//! Handlers for the `/users` resource (back-office accounts).
//!
//! Besides the `USERS:*` permissions, every write is bounded by the role
//! assignment rule: callers only manage users whose role they could assign.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use backoffice_core::error::CoreError;
use backoffice_core::pagination::{PageRequest, PaginatedResponse};
use backoffice_core::permissions::{Action, Resource};
use backoffice_core::roles::Role;
use backoffice_core::types::DbId;
use backoffice_core::validation::validate_input;
use backoffice_db::models::user::{CreateUser, UpdateUser, User, UserListParams, UserResponse};
use backoffice_db::repositories::{SessionRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub password: String,
    pub role: String,
}

/// Request body for `PUT /users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<PaginatedResponse<UserResponse>>> {
    auth.require(Resource::Users, Action::View)?;

    let role = params.role.as_deref().map(Role::parse).transpose()?;
    let (limit, offset) = PageRequest {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();

    let (users, total) = UserRepo::list(
        &state.pool,
        params.search.as_deref(),
        role.map(Role::as_str),
        limit,
        offset,
    )
    .await?;

    Ok(Json(PaginatedResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    auth.require(Resource::Users, Action::View)?;
    let user = find_user(&state, id).await?;
    Ok(Json(DataResponse::new(user.into())))
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    auth.require(Resource::Users, Action::Create)?;
    validate_input(&input)?;

    let role = Role::parse(&input.role)?;
    auth.require_assignable(role)?;

    validate_password_strength(&input.password).map_err(CoreError::Validation)?;
    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let email = input.email.trim().to_lowercase();
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(CoreError::conflict(format!("Email {email} is already registered")).into());
    }

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            name: input.name.trim().to_string(),
            password_hash: hashed,
            role: role.as_str().to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = auth.user_id, created_user_id = user.id, role = %role, "User created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(user.into()))))
}

/// PUT /api/v1/users/{id}
///
/// Callers cannot change their own role or deactivate themselves.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    auth.require(Resource::Users, Action::Update)?;
    validate_input(&input)?;

    let target = find_user(&state, id).await?;
    let is_self = target.id == auth.user_id;
    if !is_self {
        auth.require_assignable(Role::parse(&target.role)?)?;
    }

    let new_role = input.role.as_deref().map(Role::parse).transpose()?;
    if let Some(role) = new_role {
        if is_self && role != auth.role {
            return Err(CoreError::validation("You cannot change your own role").into());
        }
        if !is_self {
            auth.require_assignable(role)?;
        }
    }
    if is_self && input.is_active == Some(false) {
        return Err(CoreError::validation("You cannot deactivate your own account").into());
    }

    let user = UserRepo::update(
        &state.pool,
        id,
        &UpdateUser {
            email: input.email.map(|e| e.trim().to_lowercase()),
            name: input.name.map(|n| n.trim().to_string()),
            role: new_role.map(|r| r.as_str().to_string()),
            is_active: input.is_active,
        },
    )
    .await?
    .ok_or(CoreError::NotFound { entity: "User", id })?;

    if input.is_active == Some(false) {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }

    tracing::info!(user_id = auth.user_id, target_user_id = id, "User updated");
    Ok(Json(DataResponse::new(user.into())))
}

/// DELETE /api/v1/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(Resource::Users, Action::Delete)?;
    if id == auth.user_id {
        return Err(CoreError::validation("You cannot delete your own account").into());
    }

    let target = find_user(&state, id).await?;
    auth.require_assignable(Role::parse(&target.role)?)?;

    if UserRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, deleted_user_id = id, "User deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound { entity: "User", id }.into())
    }
}

/// POST /api/v1/users/{id}/reset-password
///
/// Sets a new password, clears any lockout and revokes the user's sessions.
pub async fn reset_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    auth.require(Resource::Users, Action::Update)?;

    let target = find_user(&state, id).await?;
    if target.id != auth.user_id {
        auth.require_assignable(Role::parse(&target.role)?)?;
    }

    validate_password_strength(&input.new_password).map_err(CoreError::Validation)?;
    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    UserRepo::update_password(&state.pool, id, &hashed).await?;
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    tracing::info!(user_id = auth.user_id, target_user_id = id, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}
