//! Order total computation.
//!
//! All amounts are integer minor units. Tax is expressed in basis points
//! (`700` = 7% VAT) and rounded half-up to the nearest minor unit.
//!
//! Every step uses checked arithmetic; a result that does not fit in
//! [`Money`] is a validation error rather than a wrapped value.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Money;

/// Basis-point denominator (100% = 10_000 bp).
pub const BASIS_POINTS: i64 = 10_000;

/// One priced order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub quantity: i32,
    pub unit_price: Money,
}

impl PricedLine {
    pub fn line_total(&self) -> Result<Money, CoreError> {
        i64::from(self.quantity)
            .checked_mul(self.unit_price)
            .ok_or_else(out_of_range)
    }
}

fn out_of_range() -> CoreError {
    CoreError::validation("Amount out of range")
}

/// Sum of all line totals.
pub fn subtotal(lines: &[PricedLine]) -> Result<Money, CoreError> {
    lines.iter().try_fold(0, |acc: Money, line| {
        acc.checked_add(line.line_total()?).ok_or_else(out_of_range)
    })
}

/// Fully computed order amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub shipping_fee: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Compute totals for a set of lines.
    ///
    /// The discount is clamped to the subtotal. Tax applies to the
    /// discounted subtotal, not to shipping. Any discount, including one
    /// granted by a free-shipping coupon, lowers the taxable amount.
    pub fn compute(
        lines: &[PricedLine],
        discount: Money,
        shipping_fee: Money,
        tax_rate_bp: i64,
    ) -> Result<Self, CoreError> {
        if lines.is_empty() {
            return Err(CoreError::validation("Order must contain at least one item"));
        }
        if let Some(bad) = lines.iter().find(|l| l.quantity < 1) {
            return Err(CoreError::validation(format!(
                "Quantity must be at least 1 (got {})",
                bad.quantity
            )));
        }
        if lines.iter().any(|l| l.unit_price < 0) {
            return Err(CoreError::validation("Unit price must not be negative"));
        }
        if discount < 0 || shipping_fee < 0 {
            return Err(CoreError::validation(
                "Discount and shipping fee must not be negative",
            ));
        }
        if !(0..=BASIS_POINTS).contains(&tax_rate_bp) {
            return Err(CoreError::validation("Tax rate must be between 0 and 10000 bp"));
        }

        let subtotal = subtotal(lines)?;
        let discount = discount.min(subtotal);
        let taxable = subtotal - discount;
        let tax = apply_basis_points(taxable, tax_rate_bp)?;
        let total = taxable
            .checked_add(shipping_fee)
            .and_then(|t| t.checked_add(tax))
            .ok_or_else(out_of_range)?;

        Ok(Self {
            subtotal,
            discount,
            shipping_fee,
            tax,
            total,
        })
    }
}

/// `amount * bp / 10_000`, rounded half-up. `amount` must be non-negative.
pub fn apply_basis_points(amount: Money, bp: i64) -> Result<Money, CoreError> {
    let scaled = i128::from(amount) * i128::from(bp) + i128::from(BASIS_POINTS / 2);
    Money::try_from(scaled / i128::from(BASIS_POINTS)).map_err(|_| out_of_range())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn line(quantity: i32, unit_price: Money) -> PricedLine {
        PricedLine {
            quantity,
            unit_price,
        }
    }

    #[test]
    fn totals_without_tax_or_discount() {
        let totals = OrderTotals::compute(&[line(2, 15_000), line(1, 5_000)], 0, 4_000, 0).unwrap();
        assert_eq!(totals.subtotal, 35_000);
        assert_eq!(totals.tax, 0);
        assert_eq!(totals.total, 39_000);
    }

    #[test]
    fn vat_applies_after_discount() {
        // 1000.00 - 100.00 = 900.00; 7% = 63.00
        let totals = OrderTotals::compute(&[line(1, 100_000)], 10_000, 0, 700).unwrap();
        assert_eq!(totals.discount, 10_000);
        assert_eq!(totals.tax, 6_300);
        assert_eq!(totals.total, 96_300);
    }

    #[test]
    fn discount_is_clamped_to_subtotal() {
        let totals = OrderTotals::compute(&[line(1, 5_000)], 9_999_999, 1_000, 700).unwrap();
        assert_eq!(totals.discount, 5_000);
        assert_eq!(totals.tax, 0);
        assert_eq!(totals.total, 1_000);
    }

    #[test]
    fn tax_rounds_half_up() {
        // 7% of 0.50 = 0.035 -> 0.04 (rounded half-up in satang: 3.5 -> 4)
        assert_eq!(apply_basis_points(50, 700).unwrap(), 4);
        assert_eq!(apply_basis_points(49, 700).unwrap(), 3);
    }

    #[test]
    fn basis_points_do_not_overflow_on_large_amounts() {
        assert_eq!(
            apply_basis_points(100_000_000_000_000_000, 2_000).unwrap(),
            20_000_000_000_000_000
        );
        assert_matches!(
            apply_basis_points(Money::MAX, 20_000),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn oversized_lines_are_rejected_not_wrapped() {
        assert_matches!(
            OrderTotals::compute(&[line(10_000, 1_000_000_000_000_000)], 0, 0, 700),
            Err(CoreError::Validation(msg)) if msg.contains("out of range")
        );
        assert_matches!(
            OrderTotals::compute(&[line(1, Money::MAX), line(1, 1)], 0, 0, 0),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            OrderTotals::compute(&[line(1, Money::MAX - 10)], 0, 100, 0),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn free_shipping_discount_reduces_taxable_amount() {
        // 100.00 of goods, 50.00 shipping waived as the discount.
        let totals = OrderTotals::compute(&[line(1, 10_000)], 5_000, 5_000, 700).unwrap();
        assert_eq!(totals.discount, 5_000);
        assert_eq!(totals.tax, 350);
        assert_eq!(totals.total, 10_350);
    }

    #[test]
    fn rejects_empty_and_zero_quantity() {
        assert_matches!(OrderTotals::compute(&[], 0, 0, 0), Err(CoreError::Validation(_)));
        assert_matches!(
            OrderTotals::compute(&[line(0, 100)], 0, 0, 0),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_negative_amounts() {
        assert!(OrderTotals::compute(&[line(1, -1)], 0, 0, 0).is_err());
        assert!(OrderTotals::compute(&[line(1, 100)], -1, 0, 0).is_err());
        assert!(OrderTotals::compute(&[line(1, 100)], 0, 0, 10_001).is_err());
    }
}
