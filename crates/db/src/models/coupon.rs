//! Coupon entity model and DTOs.

use backoffice_core::coupons::{CouponTerms, DiscountType};
use backoffice_core::error::CoreError;
use backoffice_core::types::{nullable, DbId, Money, Timestamp};
use backoffice_core::validation::{validate_money, validate_money_patch};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// A coupon row from the `coupons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Coupon {
    pub id: DbId,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: String,
    pub discount_value: i64,
    pub min_purchase: Option<Money>,
    pub max_discount: Option<Money>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Coupon {
    /// Evaluation terms for [`backoffice_core::coupons::evaluate_coupon`].
    pub fn terms(&self) -> Result<CouponTerms, CoreError> {
        Ok(CouponTerms {
            discount_type: DiscountType::parse(&self.discount_type)?,
            discount_value: self.discount_value,
            min_purchase: self.min_purchase,
            max_discount: self.max_discount,
            usage_limit: self.usage_limit,
            used_count: self.used_count,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            is_active: self.is_active,
        })
    }
}

/// DTO for creating a new coupon. `code` is upper-cased before insert.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCoupon {
    #[validate(length(min = 3, max = 50, message = "Code must be 3-50 characters"))]
    pub code: String,
    pub description: Option<String>,
    pub discount_type: String,
    #[serde(default)]
    #[validate(custom(function = "validate_money"))]
    pub discount_value: Money,
    #[validate(custom(function = "validate_money"))]
    pub min_purchase: Option<Money>,
    #[validate(custom(function = "validate_money"))]
    pub max_discount: Option<Money>,
    #[validate(range(min = 1, message = "Usage limit must be at least 1"))]
    pub usage_limit: Option<i32>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub is_active: Option<bool>,
}

/// DTO for updating an existing coupon. All fields are optional.
///
/// Nullable columns take `Option<Option<_>>`: an absent field keeps the
/// stored value and an explicit `null` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_update_coupon"))]
pub struct UpdateCoupon {
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub discount_type: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub discount_value: Option<Money>,
    #[serde(default, deserialize_with = "nullable")]
    pub min_purchase: Option<Option<Money>>,
    #[serde(default, deserialize_with = "nullable")]
    pub max_discount: Option<Option<Money>>,
    #[serde(default, deserialize_with = "nullable")]
    pub usage_limit: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub starts_at: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "nullable")]
    pub ends_at: Option<Option<Timestamp>>,
    pub is_active: Option<bool>,
}

fn validate_update_coupon(input: &UpdateCoupon) -> Result<(), ValidationError> {
    validate_money_patch(&input.min_purchase)?;
    validate_money_patch(&input.max_discount)?;
    if matches!(input.usage_limit, Some(Some(limit)) if limit < 1) {
        let mut err = ValidationError::new("usage_limit");
        err.message = Some("Usage limit must be at least 1".into());
        return Err(err);
    }
    Ok(())
}

/// Request body for `POST /coupons/validate`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ValidateCouponRequest {
    pub code: String,
    #[validate(custom(function = "validate_money"))]
    pub subtotal: Money,
    #[serde(default)]
    #[validate(custom(function = "validate_money"))]
    pub shipping_fee: Money,
}

/// Response for `POST /coupons/validate`.
#[derive(Debug, Clone, Serialize)]
pub struct CouponPreview {
    pub code: String,
    pub valid: bool,
    pub discount: Money,
    /// Why the coupon was refused, when `valid` is false.
    pub reason: Option<String>,
}
