//! Repository for the `settings` key/value table.

use sqlx::PgPool;

use crate::models::setting::Setting;

const COLUMNS: &str = "id, key, value, description, updated_at";

pub struct SettingRepo;

impl SettingRepo {
    /// All settings ordered by key.
    pub async fn list(pool: &PgPool) -> Result<Vec<Setting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings ORDER BY key ASC");
        sqlx::query_as::<_, Setting>(&query).fetch_all(pool).await
    }

    pub async fn get(pool: &PgPool, key: &str) -> Result<Option<Setting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings WHERE key = $1");
        sqlx::query_as::<_, Setting>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace a setting. An omitted description keeps the old one.
    pub async fn upsert(
        pool: &PgPool,
        key: &str,
        value: &serde_json::Value,
        description: Option<&str>,
    ) -> Result<Setting, sqlx::Error> {
        let query = format!(
            "INSERT INTO settings (key, value, description)
             VALUES ($1, $2, $3)
             ON CONFLICT (key) DO UPDATE SET
                value = EXCLUDED.value,
                description = COALESCE(EXCLUDED.description, settings.description)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Setting>(&query)
            .bind(key)
            .bind(value)
            .bind(description)
            .fetch_one(pool)
            .await
    }

    /// Delete a setting. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM settings WHERE key = $1")
            .bind(key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
