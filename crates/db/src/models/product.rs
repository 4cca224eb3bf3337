//! Product entity model and DTOs.

use backoffice_core::types::{nullable, DbId, Money, Timestamp};
use backoffice_core::validation::{validate_money, validate_money_patch, validate_sku};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

pub const PRODUCT_STATUS_DRAFT: &str = "DRAFT";
pub const PRODUCT_STATUS_ACTIVE: &str = "ACTIVE";
pub const PRODUCT_STATUS_ARCHIVED: &str = "ARCHIVED";

/// Accepted values of `products.status`.
pub const PRODUCT_STATUSES: &[&str] = &[
    PRODUCT_STATUS_DRAFT,
    PRODUCT_STATUS_ACTIVE,
    PRODUCT_STATUS_ARCHIVED,
];

/// A product row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub sku: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Money,
    pub compare_at_price: Option<Money>,
    pub cost_price: Option<Money>,
    pub stock: i32,
    pub low_stock_threshold: i32,
    pub category_id: Option<DbId>,
    pub brand_id: Option<DbId>,
    pub status: String,
    /// JSON array of image URLs.
    pub images: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new product.
///
/// `sku` is normalised to upper case and `slug` defaults to a slugified
/// `name` before insert.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(custom(function = "validate_sku"))]
    pub sku: String,
    #[validate(length(min = 1, max = 300, message = "Name must be 1-300 characters"))]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub price: Money,
    #[validate(custom(function = "validate_money"))]
    pub compare_at_price: Option<Money>,
    #[validate(custom(function = "validate_money"))]
    pub cost_price: Option<Money>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: Option<i32>,
    #[validate(range(min = 0, message = "Low-stock threshold must not be negative"))]
    pub low_stock_threshold: Option<i32>,
    pub category_id: Option<DbId>,
    pub brand_id: Option<DbId>,
    pub status: Option<String>,
    pub images: Option<Vec<String>>,
}

/// DTO for updating an existing product. All fields are optional.
/// `compare_at_price`, `category_id` and `brand_id` are cleared by `null`.
///
/// Stock is not editable here; it changes through inventory movements.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_update_product"))]
pub struct UpdateProduct {
    #[validate(custom(function = "validate_sku"))]
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 300, message = "Name must be 1-300 characters"))]
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub price: Option<Money>,
    #[serde(default, deserialize_with = "nullable")]
    pub compare_at_price: Option<Option<Money>>,
    #[validate(custom(function = "validate_money"))]
    pub cost_price: Option<Money>,
    #[validate(range(min = 0, message = "Low-stock threshold must not be negative"))]
    pub low_stock_threshold: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub brand_id: Option<Option<DbId>>,
    pub status: Option<String>,
    pub images: Option<Vec<String>>,
}

fn validate_update_product(input: &UpdateProduct) -> Result<(), ValidationError> {
    validate_money_patch(&input.compare_at_price)
}

/// Query parameters for `GET /products`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    /// Case-insensitive match on name or SKU.
    pub search: Option<String>,
    pub category_id: Option<DbId>,
    pub brand_id: Option<DbId>,
    pub status: Option<String>,
    #[serde(default)]
    pub low_stock: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
