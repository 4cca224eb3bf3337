//! Inventory movement model and stock overview rows.

use backoffice_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `inventory_movements` ledger.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InventoryMovement {
    pub id: DbId,
    pub product_id: DbId,
    pub movement_type: String,
    pub quantity: i32,
    pub stock_before: i32,
    pub stock_after: i32,
    pub reason: Option<String>,
    pub user_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for inserting a ledger row.
#[derive(Debug, Clone)]
pub struct CreateMovement {
    pub product_id: DbId,
    pub movement_type: String,
    pub quantity: i32,
    pub stock_before: i32,
    pub stock_after: i32,
    pub reason: Option<String>,
    pub user_id: Option<DbId>,
}

/// Request body for `POST /inventory/{product_id}/adjust`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdjustStockRequest {
    /// `IN`, `OUT` or `ADJUST`.
    pub movement_type: String,
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    pub quantity: i32,
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

/// One row of the stock overview.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StockLevel {
    pub product_id: DbId,
    pub sku: String,
    pub name: String,
    pub stock: i32,
    pub low_stock_threshold: i32,
    pub is_low_stock: bool,
}

/// Query parameters for `GET /inventory`.
#[derive(Debug, Default, Deserialize)]
pub struct StockListParams {
    #[serde(default)]
    pub low_stock: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
