//! Order and payment status rules plus order number generation.

use std::fmt;

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Length of the random part of an order number.
const ORDER_SUFFIX_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Refunded => "REFUNDED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "PROCESSING" => Ok(OrderStatus::Processing),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            "REFUNDED" => Ok(OrderStatus::Refunded),
            other => Err(CoreError::validation(format!(
                "Unknown order status '{other}'"
            ))),
        }
    }

    /// Allowed forward moves. Cancellation is possible until shipment;
    /// refunds only after delivery.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Processing)
                | (Confirmed, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
                | (Delivered, Refunded)
        )
    }

    /// Cancelling from this status puts the stock back.
    pub fn releases_stock_on_cancel(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Refunded)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Refunded => "REFUNDED",
            PaymentStatus::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "UNPAID" => Ok(PaymentStatus::Unpaid),
            "PAID" => Ok(PaymentStatus::Paid),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(CoreError::validation(format!(
                "Unknown payment status '{other}'"
            ))),
        }
    }
}

/// Check a requested status change, returning a validation error that names
/// both ends on refusal.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "Cannot change order status from {from} to {to}"
        )))
    }
}

/// `ORD-YYYYMMDD-XXXXXX` with a random upper-case alphanumeric suffix.
pub fn generate_order_number(now: Timestamp) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("ORD-{}-{suffix}", now.format("%Y%m%d"))
}

/// Order number for the current instant.
pub fn next_order_number() -> String {
    generate_order_number(Utc::now())
}
