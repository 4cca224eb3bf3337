//! Key/value store settings.

use backoffice_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Setting {
    pub id: DbId,
    pub key: String,
    pub value: serde_json::Value,
    pub description: Option<String>,
    pub updated_at: Timestamp,
}

/// Request body for `PUT /settings/{key}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertSetting {
    pub value: serde_json::Value,
    pub description: Option<String>,
}
