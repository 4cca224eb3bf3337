//! Brand entity model and DTOs.

use backoffice_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A brand row from the `brands` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Brand {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new brand. `slug` defaults to a slugified `name`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBrand {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(url(message = "Logo must be a valid URL"))]
    pub logo_url: Option<String>,
    pub is_active: Option<bool>,
}

/// DTO for updating an existing brand. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBrand {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(url(message = "Logo must be a valid URL"))]
    pub logo_url: Option<String>,
    pub is_active: Option<bool>,
}
