//! Handlers for the `/categories` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use backoffice_core::error::CoreError;
use backoffice_core::permissions::{Action, Resource};
use backoffice_core::slug::resolve_slug;
use backoffice_core::types::DbId;
use backoffice_core::validation::validate_input;
use backoffice_db::models::category::{
    Category, CategoryWithCount, CreateCategory, UpdateCategory,
};
use backoffice_db::repositories::CategoryRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/categories
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<CategoryWithCount>>>> {
    auth.require(Resource::Categories, Action::View)?;
    let categories = CategoryRepo::list_with_counts(&state.pool).await?;
    Ok(Json(DataResponse::new(categories)))
}

/// GET /api/v1/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Category>>> {
    auth.require(Resource::Categories, Action::View)?;
    let category = find_category(&state, id).await?;
    Ok(Json(DataResponse::new(category)))
}

/// POST /api/v1/categories
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    auth.require(Resource::Categories, Action::Create)?;
    validate_input(&input)?;

    let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
    if CategoryRepo::slug_exists(&state.pool, &slug, None).await? {
        return Err(CoreError::validation(format!("Slug '{slug}' already exists")).into());
    }
    if let Some(parent_id) = input.parent_id {
        find_category(&state, parent_id).await?;
    }

    let category = CategoryRepo::create(&state.pool, &input, &slug).await?;

    tracing::info!(user_id = auth.user_id, category_id = category.id, "Category created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(category))))
}

/// PUT /api/v1/categories/{id}
///
/// A category cannot be moved under itself or one of its descendants.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<DataResponse<Category>>> {
    auth.require(Resource::Categories, Action::Update)?;
    validate_input(&input)?;

    let existing = find_category(&state, id).await?;

    // A renamed category keeps its slug unless a new one is sent.
    let slug = input
        .slug
        .as_deref()
        .map(|s| resolve_slug(Some(s), &existing.name))
        .transpose()?;
    if let Some(slug) = &slug {
        if CategoryRepo::slug_exists(&state.pool, slug, Some(id)).await? {
            return Err(CoreError::validation(format!("Slug '{slug}' already exists")).into());
        }
    }

    // `null` detaches the category to the top level.
    if let Some(Some(parent_id)) = input.parent_id {
        if parent_id == id {
            return Err(CoreError::validation("A category cannot be its own parent").into());
        }
        find_category(&state, parent_id).await?;
        if CategoryRepo::would_create_cycle(&state.pool, id, parent_id).await? {
            return Err(CoreError::validation(
                "A category cannot be moved under one of its own subcategories",
            )
            .into());
        }
    }

    let category = CategoryRepo::update(&state.pool, id, &input, slug.as_deref())
        .await?
        .ok_or(CoreError::NotFound { entity: "Category", id })?;

    tracing::info!(user_id = auth.user_id, category_id = id, "Category updated");
    Ok(Json(DataResponse::new(category)))
}

/// DELETE /api/v1/categories/{id}
///
/// Refused while products are still filed under the category.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(Resource::Categories, Action::Delete)?;

    let products = CategoryRepo::product_count(&state.pool, id).await?;
    if products > 0 {
        return Err(CoreError::conflict(format!(
            "Category still has {products} product(s); move or delete them first"
        ))
        .into());
    }

    if CategoryRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, category_id = id, "Category deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound { entity: "Category", id }.into())
    }
}

async fn find_category(state: &AppState, id: DbId) -> AppResult<Category> {
    Ok(CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Category", id })?)
}
