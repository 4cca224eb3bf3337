//! Order and order item models and DTOs.

use backoffice_core::types::{DbId, Money, Timestamp};
use backoffice_core::validation::validate_money;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::customer::CreateCustomer;

/// An order row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub order_number: String,
    pub customer_id: DbId,
    pub status: String,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub subtotal: Money,
    pub discount: Money,
    pub shipping_fee: Money,
    pub tax: Money,
    pub total: Money,
    pub coupon_id: Option<DbId>,
    pub shipping_address: Option<String>,
    pub note: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order list row enriched with the customer's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: String,
    pub item_count: i64,
}

/// An order line from the `order_items` table.
///
/// Name, SKU and price are copied from the product at order time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItem {
    pub id: DbId,
    pub order_id: DbId,
    pub product_id: Option<DbId>,
    pub product_name: String,
    pub sku: String,
    pub quantity: i32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// An order together with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// One requested line in `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderLineInput {
    pub product_id: DbId,
    #[validate(range(min = 1, max = 10000, message = "Quantity must be 1-10000"))]
    pub quantity: i32,
}

/// Request body for `POST /orders`.
///
/// Exactly one of `customer_id` or `customer` must be given. An inline
/// customer is matched by email and created when absent.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub customer_id: Option<DbId>,
    #[validate(nested)]
    pub customer: Option<CreateCustomer>,
    #[validate(length(min = 1, message = "Order must contain at least one item"), nested)]
    pub items: Vec<OrderLineInput>,
    pub coupon_code: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub shipping_fee: Option<Money>,
    pub payment_method: Option<String>,
    pub shipping_address: Option<String>,
    pub note: Option<String>,
}

/// Fully priced order ready to insert.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub customer_id: DbId,
    pub payment_method: Option<String>,
    pub subtotal: Money,
    pub discount: Money,
    pub shipping_fee: Money,
    pub tax: Money,
    pub total: Money,
    pub coupon_id: Option<DbId>,
    pub shipping_address: Option<String>,
    pub note: Option<String>,
    pub created_by: DbId,
}

/// A priced line ready to insert.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: DbId,
    pub product_name: String,
    pub sku: String,
    pub quantity: i32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Request body for `PUT /orders/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

/// Query parameters for `GET /orders`.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListParams {
    pub status: Option<String>,
    pub customer_id: Option<DbId>,
    /// Case-insensitive match on order number or customer name.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
