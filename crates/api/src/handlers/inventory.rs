//! Handlers for stock overview and manual stock movements.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use backoffice_core::error::CoreError;
use backoffice_core::inventory::{apply_movement, MovementType};
use backoffice_core::pagination::{PageRequest, PaginatedResponse};
use backoffice_core::permissions::{Action, Resource};
use backoffice_core::types::DbId;
use backoffice_core::validation::validate_input;
use backoffice_db::models::inventory::{
    AdjustStockRequest, CreateMovement, InventoryMovement, StockLevel, StockListParams,
};
use backoffice_db::repositories::{InventoryRepo, ProductRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/inventory
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<StockListParams>,
) -> AppResult<Json<PaginatedResponse<StockLevel>>> {
    auth.require(Resource::Inventory, Action::View)?;

    let (limit, offset) = PageRequest {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let (levels, total) =
        InventoryRepo::stock_levels(&state.pool, params.low_stock, limit, offset).await?;

    Ok(Json(PaginatedResponse {
        data: levels,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/inventory/{product_id}/adjust
///
/// Only manual movement types are accepted; `SALE` and `RETURN` are
/// written by order handling.
pub async fn adjust(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<DbId>,
    Json(input): Json<AdjustStockRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<InventoryMovement>>)> {
    auth.require(Resource::Inventory, Action::Update)?;
    validate_input(&input)?;

    let movement = MovementType::parse(&input.movement_type)?;
    if matches!(movement, MovementType::Sale | MovementType::Return) {
        return Err(CoreError::validation(format!(
            "{movement} movements are recorded by orders; use IN, OUT or ADJUST"
        ))
        .into());
    }

    let mut tx = state.pool.begin().await?;
    let product = ProductRepo::lock_for_update(&mut tx, product_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Product",
            id: product_id,
        })?;

    let stock_after = apply_movement(product.stock, movement, input.quantity)?;
    ProductRepo::set_stock(&mut tx, product_id, stock_after).await?;
    let recorded = InventoryRepo::insert_movement(
        &mut tx,
        &CreateMovement {
            product_id,
            movement_type: movement.as_str().to_string(),
            quantity: input.quantity,
            stock_before: product.stock,
            stock_after,
            reason: input.reason.clone(),
            user_id: Some(auth.user_id),
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        product_id,
        movement = %movement,
        stock_before = product.stock,
        stock_after,
        "Stock adjusted"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(recorded))))
}

/// GET /api/v1/inventory/{product_id}/movements
pub async fn movements(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<DbId>,
    Query(page): Query<PageRequest>,
) -> AppResult<Json<PaginatedResponse<InventoryMovement>>> {
    auth.require(Resource::Inventory, Action::View)?;

    if ProductRepo::find_by_id(&state.pool, product_id).await?.is_none() {
        return Err(CoreError::NotFound {
            entity: "Product",
            id: product_id,
        }
        .into());
    }

    let (limit, offset) = page.resolve();
    let (rows, total) =
        InventoryRepo::list_for_product(&state.pool, product_id, limit, offset).await?;

    Ok(Json(PaginatedResponse {
        data: rows,
        total,
        limit,
        offset,
    }))
}
