//! Stock movement arithmetic.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Goods received.
    In,
    /// Goods removed (damage, loss, internal use).
    Out,
    /// Stock count correction; `quantity` is the new absolute level.
    Adjust,
    /// Sold through an order.
    Sale,
    /// Returned from a cancelled order.
    Return,
}

impl MovementType {
    pub const fn as_str(self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
            MovementType::Adjust => "ADJUST",
            MovementType::Sale => "SALE",
            MovementType::Return => "RETURN",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "IN" => Ok(MovementType::In),
            "OUT" => Ok(MovementType::Out),
            "ADJUST" => Ok(MovementType::Adjust),
            "SALE" => Ok(MovementType::Sale),
            "RETURN" => Ok(MovementType::Return),
            other => Err(CoreError::validation(format!(
                "Unknown movement type '{other}'"
            ))),
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stock level after applying a movement. Never negative.
pub fn apply_movement(current: i32, movement: MovementType, quantity: i32) -> Result<i32, CoreError> {
    if quantity < 0 {
        return Err(CoreError::validation("Quantity must not be negative"));
    }
    if quantity == 0 && movement != MovementType::Adjust {
        return Err(CoreError::validation("Quantity must be greater than zero"));
    }

    let next = match movement {
        MovementType::In | MovementType::Return => current.checked_add(quantity),
        MovementType::Out | MovementType::Sale => current.checked_sub(quantity),
        MovementType::Adjust => Some(quantity),
    }
    .ok_or_else(|| CoreError::validation("Stock level out of range"))?;

    if next < 0 {
        return Err(CoreError::validation(format!(
            "Insufficient stock: have {current}, need {quantity}"
        )));
    }
    Ok(next)
}

/// A product is low on stock when at or below its threshold.
pub fn is_low_stock(stock: i32, threshold: i32) -> bool {
    stock <= threshold
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn inbound_and_outbound() {
        assert_eq!(apply_movement(10, MovementType::In, 5).unwrap(), 15);
        assert_eq!(apply_movement(10, MovementType::Return, 1).unwrap(), 11);
        assert_eq!(apply_movement(10, MovementType::Out, 10).unwrap(), 0);
        assert_eq!(apply_movement(10, MovementType::Sale, 3).unwrap(), 7);
    }

    #[test]
    fn adjust_sets_absolute_level() {
        assert_eq!(apply_movement(10, MovementType::Adjust, 42).unwrap(), 42);
        assert_eq!(apply_movement(10, MovementType::Adjust, 0).unwrap(), 0);
    }

    #[test]
    fn stock_never_goes_negative() {
        assert_matches!(
            apply_movement(2, MovementType::Sale, 3),
            Err(CoreError::Validation(msg)) if msg.contains("Insufficient stock")
        );
    }

    #[test]
    fn zero_or_negative_quantities_rejected() {
        assert!(apply_movement(5, MovementType::In, 0).is_err());
        assert!(apply_movement(5, MovementType::Adjust, -1).is_err());
    }

    #[test]
    fn low_stock_threshold_is_inclusive() {
        assert!(is_low_stock(5, 5));
        assert!(!is_low_stock(6, 5));
    }
}
