//! Handlers for the `/brands` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use backoffice_core::error::CoreError;
use backoffice_core::permissions::{Action, Resource};
use backoffice_core::slug::resolve_slug;
use backoffice_core::types::DbId;
use backoffice_core::validation::validate_input;
use backoffice_db::models::brand::{Brand, CreateBrand, UpdateBrand};
use backoffice_db::repositories::BrandRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/brands
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Brand>>>> {
    auth.require(Resource::Brands, Action::View)?;
    let brands = BrandRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(brands)))
}

/// GET /api/v1/brands/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Brand>>> {
    auth.require(Resource::Brands, Action::View)?;
    let brand = BrandRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Brand", id })?;
    Ok(Json(DataResponse::new(brand)))
}

/// POST /api/v1/brands
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateBrand>,
) -> AppResult<(StatusCode, Json<DataResponse<Brand>>)> {
    auth.require(Resource::Brands, Action::Create)?;
    validate_input(&input)?;

    let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
    if BrandRepo::slug_exists(&state.pool, &slug, None).await? {
        return Err(CoreError::validation(format!("Slug '{slug}' already exists")).into());
    }

    let brand = BrandRepo::create(&state.pool, &input, &slug).await?;

    tracing::info!(user_id = auth.user_id, brand_id = brand.id, "Brand created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(brand))))
}

/// PUT /api/v1/brands/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBrand>,
) -> AppResult<Json<DataResponse<Brand>>> {
    auth.require(Resource::Brands, Action::Update)?;
    validate_input(&input)?;

    let slug = match input.slug.as_deref() {
        Some(raw) => {
            let slug = resolve_slug(Some(raw), input.name.as_deref().unwrap_or_default())?;
            if BrandRepo::slug_exists(&state.pool, &slug, Some(id)).await? {
                return Err(CoreError::validation(format!("Slug '{slug}' already exists")).into());
            }
            Some(slug)
        }
        None => None,
    };

    let brand = BrandRepo::update(&state.pool, id, &input, slug.as_deref())
        .await?
        .ok_or(CoreError::NotFound { entity: "Brand", id })?;

    tracing::info!(user_id = auth.user_id, brand_id = id, "Brand updated");
    Ok(Json(DataResponse::new(brand)))
}

/// DELETE /api/v1/brands/{id}
///
/// Refused while any product carries the brand.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(Resource::Brands, Action::Delete)?;

    let products = BrandRepo::product_count(&state.pool, id).await?;
    if products > 0 {
        return Err(CoreError::conflict(format!(
            "Brand is used by {products} product(s); reassign them first"
        ))
        .into());
    }

    if BrandRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, brand_id = id, "Brand deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound { entity: "Brand", id }.into())
    }
}
