//! Handlers for the `/settings` key/value store.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use backoffice_core::error::CoreError;
use backoffice_core::permissions::{Action, Resource};
use backoffice_db::models::setting::{Setting, UpsertSetting};
use backoffice_db::repositories::SettingRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_KEY_LEN: usize = 100;

/// GET /api/v1/settings
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Setting>>>> {
    auth.require(Resource::Settings, Action::View)?;
    let settings = SettingRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(settings)))
}

/// GET /api/v1/settings/{key}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(key): Path<String>,
) -> AppResult<Json<DataResponse<Setting>>> {
    auth.require(Resource::Settings, Action::View)?;
    let setting = SettingRepo::get(&state.pool, &key)
        .await?
        .ok_or_else(|| CoreError::not_found_key("Setting", key))?;
    Ok(Json(DataResponse::new(setting)))
}

/// PUT /api/v1/settings/{key}
///
/// Creates the key when absent. Creating needs `SETTINGS:CREATE` on top of
/// `SETTINGS:UPDATE`.
pub async fn upsert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(key): Path<String>,
    Json(input): Json<UpsertSetting>,
) -> AppResult<Json<DataResponse<Setting>>> {
    auth.require(Resource::Settings, Action::Update)?;
    check_key(&key)?;
    if SettingRepo::get(&state.pool, &key).await?.is_none() {
        auth.require(Resource::Settings, Action::Create)?;
    }

    let setting =
        SettingRepo::upsert(&state.pool, &key, &input.value, input.description.as_deref()).await?;

    tracing::info!(user_id = auth.user_id, key = %setting.key, "Setting saved");
    Ok(Json(DataResponse::new(setting)))
}

/// DELETE /api/v1/settings/{key}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(key): Path<String>,
) -> AppResult<StatusCode> {
    auth.require(Resource::Settings, Action::Delete)?;

    if SettingRepo::delete(&state.pool, &key).await? {
        tracing::info!(user_id = auth.user_id, key = %key, "Setting deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found_key("Setting", key).into())
    }
}

/// Keys are lowercase snake case, e.g. `default_shipping_fee`.
fn check_key(key: &str) -> Result<(), CoreError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "Invalid setting key '{key}': use lowercase letters, digits, '_' or '.'"
        )))
    }
}
