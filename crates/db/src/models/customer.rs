//! Customer entity model and DTOs.

use backoffice_core::types::{DbId, Money, Timestamp};
use backoffice_core::validation::validate_phone;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A customer row from the `customers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Customer {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub total_orders: i32,
    pub total_spent: Money,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new customer.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomer {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// DTO for updating an existing customer. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCustomer {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Query parameters for `GET /customers`.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerListParams {
    /// Case-insensitive match on name, email or phone.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
