//! Category entity model and DTOs.

use backoffice_core::types::{nullable, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A category row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<DbId>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Category plus the number of products filed under it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub category: Category,
    pub product_count: i64,
}

/// DTO for creating a new category. `slug` defaults to a slugified `name`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<DbId>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// DTO for updating an existing category. All fields are optional;
/// `description` and `parent_id` are cleared by an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub parent_id: Option<Option<DbId>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}
