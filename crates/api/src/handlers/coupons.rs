//! Handlers for the `/coupons` resource and the checkout-time preview.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use backoffice_core::coupons::{evaluate_coupon, validate_terms, DiscountType};
use backoffice_core::error::CoreError;
use backoffice_core::pagination::{PageRequest, PaginatedResponse};
use backoffice_core::permissions::{Action, Resource};
use backoffice_core::types::DbId;
use backoffice_core::validation::validate_input;
use backoffice_db::models::coupon::{
    Coupon, CouponPreview, CreateCoupon, UpdateCoupon, ValidateCouponRequest,
};
use backoffice_db::repositories::CouponRepo;
use chrono::Utc;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/coupons
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> AppResult<Json<PaginatedResponse<Coupon>>> {
    auth.require(Resource::Coupons, Action::View)?;

    let (limit, offset) = page.resolve();
    let (coupons, total) = CouponRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(PaginatedResponse {
        data: coupons,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/coupons/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Coupon>>> {
    auth.require(Resource::Coupons, Action::View)?;
    let coupon = find_coupon(&state, id).await?;
    Ok(Json(DataResponse::new(coupon)))
}

/// POST /api/v1/coupons
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateCoupon>,
) -> AppResult<(StatusCode, Json<DataResponse<Coupon>>)> {
    auth.require(Resource::Coupons, Action::Create)?;
    validate_input(&input)?;

    let discount_type = DiscountType::parse(&input.discount_type)?;
    validate_terms(discount_type, input.discount_value, input.starts_at, input.ends_at)?;

    let code = input.code.trim().to_uppercase();
    if CouponRepo::find_by_code(&state.pool, &code).await?.is_some() {
        return Err(CoreError::conflict(format!("Coupon code {code} already exists")).into());
    }

    let coupon = CouponRepo::create(&state.pool, &input, &code).await?;

    tracing::info!(user_id = auth.user_id, coupon_id = coupon.id, code = %coupon.code, "Coupon created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(coupon))))
}

/// PUT /api/v1/coupons/{id}
///
/// The merged terms are re-validated, so a partial update cannot leave the
/// coupon with an inverted window or an out-of-range percentage.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCoupon>,
) -> AppResult<Json<DataResponse<Coupon>>> {
    auth.require(Resource::Coupons, Action::Update)?;
    validate_input(&input)?;

    let existing = find_coupon(&state, id).await?;
    let discount_type =
        DiscountType::parse(input.discount_type.as_deref().unwrap_or(&existing.discount_type))?;
    validate_terms(
        discount_type,
        input.discount_value.unwrap_or(existing.discount_value),
        input.starts_at.unwrap_or(existing.starts_at),
        input.ends_at.unwrap_or(existing.ends_at),
    )?;

    let coupon = CouponRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound { entity: "Coupon", id })?;

    tracing::info!(user_id = auth.user_id, coupon_id = id, "Coupon updated");
    Ok(Json(DataResponse::new(coupon)))
}

/// DELETE /api/v1/coupons/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(Resource::Coupons, Action::Delete)?;

    if CouponRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, coupon_id = id, "Coupon deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound { entity: "Coupon", id }.into())
    }
}

/// POST /api/v1/coupons/validate
///
/// Previews the discount for an order being composed. Nothing is claimed;
/// the use is only counted when the order is created.
pub async fn validate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ValidateCouponRequest>,
) -> AppResult<Json<DataResponse<CouponPreview>>> {
    auth.require(Resource::Orders, Action::Create)?;
    validate_input(&input)?;

    let code = input.code.trim().to_uppercase();
    let coupon = CouponRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| CoreError::not_found_key("Coupon", code.clone()))?;

    let preview = match evaluate_coupon(&coupon.terms()?, input.subtotal, input.shipping_fee, Utc::now()) {
        Ok(discount) => CouponPreview {
            code,
            valid: true,
            discount,
            reason: None,
        },
        Err(rejection) => CouponPreview {
            code,
            valid: false,
            discount: 0,
            reason: Some(rejection.to_string()),
        },
    };
    Ok(Json(DataResponse::new(preview)))
}

async fn find_coupon(state: &AppState, id: DbId) -> AppResult<Coupon> {
    Ok(CouponRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Coupon", id })?)
}
