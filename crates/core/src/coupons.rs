//! Coupon discount types and eligibility evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pricing::apply_basis_points;
use crate::types::{Money, Timestamp};

/// How a coupon's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// `discount_value` is a whole percentage (1..=100).
    Percentage,
    /// `discount_value` is an amount in minor units.
    FixedAmount,
    /// Waives the shipping fee; `discount_value` is ignored.
    FreeShipping,
}

impl DiscountType {
    pub const fn as_str(self) -> &'static str {
        match self {
            DiscountType::Percentage => "PERCENTAGE",
            DiscountType::FixedAmount => "FIXED_AMOUNT",
            DiscountType::FreeShipping => "FREE_SHIPPING",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "PERCENTAGE" => Ok(DiscountType::Percentage),
            "FIXED_AMOUNT" => Ok(DiscountType::FixedAmount),
            "FREE_SHIPPING" => Ok(DiscountType::FreeShipping),
            other => Err(CoreError::validation(format!(
                "Unknown discount type '{other}'"
            ))),
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The subset of a coupon row needed to evaluate it.
#[derive(Debug, Clone)]
pub struct CouponTerms {
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_purchase: Option<Money>,
    pub max_discount: Option<Money>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub is_active: bool,
}

/// Why a coupon cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponRejection {
    #[error("Coupon is inactive")]
    Inactive,
    #[error("Coupon is not valid yet")]
    NotStarted,
    #[error("Coupon has expired")]
    Expired,
    #[error("Coupon usage limit reached")]
    UsageExhausted,
    #[error("Order subtotal is below the coupon minimum of {minimum}")]
    BelowMinimum { minimum: Money },
}

impl From<CouponRejection> for CoreError {
    fn from(value: CouponRejection) -> Self {
        CoreError::Validation(value.to_string())
    }
}

/// Validate coupon definition fields before they are stored.
pub fn validate_terms(
    discount_type: DiscountType,
    discount_value: i64,
    starts_at: Option<Timestamp>,
    ends_at: Option<Timestamp>,
) -> Result<(), CoreError> {
    match discount_type {
        DiscountType::Percentage if !(1..=100).contains(&discount_value) => {
            return Err(CoreError::validation(
                "Percentage discount must be between 1 and 100",
            ));
        }
        DiscountType::FixedAmount if discount_value <= 0 => {
            return Err(CoreError::validation(
                "Fixed discount amount must be positive",
            ));
        }
        _ => {}
    }
    if let (Some(start), Some(end)) = (starts_at, ends_at) {
        if end <= start {
            return Err(CoreError::validation("Coupon end must be after its start"));
        }
    }
    Ok(())
}

/// Compute the discount a coupon grants on an order, or why it is refused.
pub fn evaluate_coupon(
    terms: &CouponTerms,
    subtotal: Money,
    shipping_fee: Money,
    now: Timestamp,
) -> Result<Money, CouponRejection> {
    if !terms.is_active {
        return Err(CouponRejection::Inactive);
    }
    if terms.starts_at.is_some_and(|s| now < s) {
        return Err(CouponRejection::NotStarted);
    }
    if terms.ends_at.is_some_and(|e| now > e) {
        return Err(CouponRejection::Expired);
    }
    if terms
        .usage_limit
        .is_some_and(|limit| terms.used_count >= limit)
    {
        return Err(CouponRejection::UsageExhausted);
    }
    if let Some(minimum) = terms.min_purchase {
        if subtotal < minimum {
            return Err(CouponRejection::BelowMinimum { minimum });
        }
    }

    let discount = match terms.discount_type {
        DiscountType::Percentage => {
            // At most 100%, so anything unrepresentable is clamped below.
            let raw = apply_basis_points(subtotal, terms.discount_value.saturating_mul(100))
                .unwrap_or(subtotal);
            terms.max_discount.map_or(raw, |cap| raw.min(cap))
        }
        DiscountType::FixedAmount => terms.discount_value,
        DiscountType::FreeShipping => return Ok(shipping_fee),
    };

    Ok(discount.min(subtotal))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn terms(discount_type: DiscountType, value: i64) -> CouponTerms {
        CouponTerms {
            discount_type,
            discount_value: value,
            min_purchase: None,
            max_discount: None,
            usage_limit: None,
            used_count: 0,
            starts_at: None,
            ends_at: None,
            is_active: true,
        }
    }

    #[test]
    fn percentage_discount_with_cap() {
        let mut t = terms(DiscountType::Percentage, 20);
        assert_eq!(evaluate_coupon(&t, 100_000, 0, Utc::now()), Ok(20_000));

        t.max_discount = Some(5_000);
        assert_eq!(evaluate_coupon(&t, 100_000, 0, Utc::now()), Ok(5_000));
    }

    #[test]
    fn percentage_discount_on_very_large_subtotal() {
        let t = terms(DiscountType::Percentage, 20);
        assert_eq!(
            evaluate_coupon(&t, 100_000_000_000_000_000, 0, Utc::now()),
            Ok(20_000_000_000_000_000)
        );
        let all = terms(DiscountType::Percentage, 100);
        assert_eq!(evaluate_coupon(&all, Money::MAX, 0, Utc::now()), Ok(Money::MAX));
    }

    #[test]
    fn fixed_amount_never_exceeds_subtotal() {
        let t = terms(DiscountType::FixedAmount, 50_000);
        assert_eq!(evaluate_coupon(&t, 30_000, 0, Utc::now()), Ok(30_000));
    }

    #[test]
    fn free_shipping_returns_fee() {
        let t = terms(DiscountType::FreeShipping, 0);
        assert_eq!(evaluate_coupon(&t, 10_000, 4_500, Utc::now()), Ok(4_500));
    }

    #[test]
    fn rejections() {
        let now = Utc::now();

        let mut t = terms(DiscountType::FixedAmount, 100);
        t.is_active = false;
        assert_eq!(evaluate_coupon(&t, 1_000, 0, now), Err(CouponRejection::Inactive));

        let mut t = terms(DiscountType::FixedAmount, 100);
        t.starts_at = Some(now + Duration::days(1));
        assert_eq!(evaluate_coupon(&t, 1_000, 0, now), Err(CouponRejection::NotStarted));

        let mut t = terms(DiscountType::FixedAmount, 100);
        t.ends_at = Some(now - Duration::days(1));
        assert_eq!(evaluate_coupon(&t, 1_000, 0, now), Err(CouponRejection::Expired));

        let mut t = terms(DiscountType::FixedAmount, 100);
        t.usage_limit = Some(3);
        t.used_count = 3;
        assert_eq!(
            evaluate_coupon(&t, 1_000, 0, now),
            Err(CouponRejection::UsageExhausted)
        );

        let mut t = terms(DiscountType::FixedAmount, 100);
        t.min_purchase = Some(50_000);
        assert_eq!(
            evaluate_coupon(&t, 49_999, 0, now),
            Err(CouponRejection::BelowMinimum { minimum: 50_000 })
        );
    }

    #[test]
    fn terms_validation() {
        assert!(validate_terms(DiscountType::Percentage, 0, None, None).is_err());
        assert!(validate_terms(DiscountType::Percentage, 101, None, None).is_err());
        assert!(validate_terms(DiscountType::Percentage, 15, None, None).is_ok());
        assert!(validate_terms(DiscountType::FixedAmount, 0, None, None).is_err());
        assert!(validate_terms(DiscountType::FreeShipping, 0, None, None).is_ok());

        let now = Utc::now();
        assert!(validate_terms(DiscountType::FreeShipping, 0, Some(now), Some(now)).is_err());
    }

    #[test]
    fn discount_type_parse() {
        assert_eq!(DiscountType::parse("FIXED_AMOUNT").unwrap(), DiscountType::FixedAmount);
        assert!(DiscountType::parse("BOGO").is_err());
    }
}
