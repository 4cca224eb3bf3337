//! Handlers for the `/products` resource.
//!
//! SKUs are stored upper-cased and slugs default to a slugified name. Both
//! are checked for duplicates before the write so clients get a specific
//! message instead of a bare constraint violation. Stock is read-only here
//! apart from the opening level on create; later changes go through the
//! inventory endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use backoffice_core::error::CoreError;
use backoffice_core::inventory::MovementType;
use backoffice_core::pagination::{PageRequest, PaginatedResponse};
use backoffice_core::permissions::{Action, Resource};
use backoffice_core::slug::resolve_slug;
use backoffice_core::types::DbId;
use backoffice_core::validation::{normalize_sku, validate_input};
use backoffice_db::models::inventory::CreateMovement;
use backoffice_db::models::product::{
    CreateProduct, Product, ProductListParams, UpdateProduct, PRODUCT_STATUSES,
};
use backoffice_db::repositories::product_repo::ProductFilter;
use backoffice_db::repositories::{BrandRepo, CategoryRepo, InventoryRepo, ProductRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/products
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ProductListParams>,
) -> AppResult<Json<PaginatedResponse<Product>>> {
    auth.require(Resource::Products, Action::View)?;

    let status = params.status.as_deref().map(check_status).transpose()?;
    let (limit, offset) = PageRequest {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();

    let filter = ProductFilter {
        search: params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        category_id: params.category_id,
        brand_id: params.brand_id,
        status,
        low_stock: params.low_stock,
    };
    let (products, total) = ProductRepo::list(&state.pool, filter, limit, offset).await?;

    Ok(Json(PaginatedResponse {
        data: products,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Product>>> {
    auth.require(Resource::Products, Action::View)?;
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Product", id })?;
    Ok(Json(DataResponse::new(product)))
}

/// POST /api/v1/products
///
/// A non-zero opening stock is recorded as an `IN` movement in the same
/// transaction as the insert.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<DataResponse<Product>>)> {
    auth.require(Resource::Products, Action::Create)?;
    validate_input(&input)?;
    if let Some(status) = input.status.as_deref() {
        check_status(status)?;
    }

    let sku = normalize_sku(&input.sku);
    if ProductRepo::sku_exists(&state.pool, &sku, None).await? {
        return Err(CoreError::validation("SKU already exists").into());
    }
    let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
    if ProductRepo::slug_exists(&state.pool, &slug, None).await? {
        return Err(CoreError::validation(format!("Slug '{slug}' already exists")).into());
    }
    check_references(&state, input.category_id, input.brand_id).await?;

    let mut tx = state.pool.begin().await?;
    let product = ProductRepo::create(&mut tx, &input, &sku, &slug).await?;
    if product.stock > 0 {
        InventoryRepo::insert_movement(
            &mut tx,
            &CreateMovement {
                product_id: product.id,
                movement_type: MovementType::In.as_str().to_string(),
                quantity: product.stock,
                stock_before: 0,
                stock_after: product.stock,
                reason: Some("Opening stock".to_string()),
                user_id: Some(auth.user_id),
            },
        )
        .await?;
    }
    tx.commit().await?;

    tracing::info!(user_id = auth.user_id, product_id = product.id, sku = %product.sku, "Product created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(product))))
}

/// PUT /api/v1/products/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<Json<DataResponse<Product>>> {
    auth.require(Resource::Products, Action::Update)?;
    validate_input(&input)?;
    if let Some(status) = input.status.as_deref() {
        check_status(status)?;
    }

    let existing = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Product", id })?;

    let sku = input.sku.as_deref().map(normalize_sku);
    if let Some(sku) = &sku {
        if ProductRepo::sku_exists(&state.pool, sku, Some(id)).await? {
            return Err(CoreError::validation("SKU already exists").into());
        }
    }

    let slug = input
        .slug
        .as_deref()
        .map(|s| resolve_slug(Some(s), &existing.name))
        .transpose()?;
    if let Some(slug) = &slug {
        if ProductRepo::slug_exists(&state.pool, slug, Some(id)).await? {
            return Err(CoreError::validation(format!("Slug '{slug}' already exists")).into());
        }
    }
    check_references(&state, input.category_id.flatten(), input.brand_id.flatten()).await?;

    let product = ProductRepo::update(&state.pool, id, &input, sku.as_deref(), slug.as_deref())
        .await?
        .ok_or(CoreError::NotFound { entity: "Product", id })?;

    tracing::info!(user_id = auth.user_id, product_id = id, "Product updated");
    Ok(Json(DataResponse::new(product)))
}

/// DELETE /api/v1/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(Resource::Products, Action::Delete)?;

    if ProductRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, product_id = id, "Product deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound { entity: "Product", id }.into())
    }
}

fn check_status(status: &str) -> Result<&str, CoreError> {
    if PRODUCT_STATUSES.contains(&status) {
        Ok(status)
    } else {
        Err(CoreError::validation(format!(
            "Invalid status '{status}'. Must be one of: {}",
            PRODUCT_STATUSES.join(", ")
        )))
    }
}

async fn check_references(
    state: &AppState,
    category_id: Option<DbId>,
    brand_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(id) = category_id {
        if CategoryRepo::find_by_id(&state.pool, id).await?.is_none() {
            return Err(CoreError::NotFound { entity: "Category", id }.into());
        }
    }
    if let Some(id) = brand_id {
        if BrandRepo::find_by_id(&state.pool, id).await?.is_none() {
            return Err(CoreError::NotFound { entity: "Brand", id }.into());
        }
    }
    Ok(())
}
