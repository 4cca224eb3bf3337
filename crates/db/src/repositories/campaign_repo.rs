//! Repository for the `campaigns` table.

use backoffice_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::campaign::{Campaign, CreateCampaign, UpdateCampaign};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, campaign_type, discount_percent, starts_at, \
                       ends_at, is_active, budget, banner_url, created_at, updated_at";

const LIST_FILTER: &str = "(NOT $1 OR (is_active AND starts_at <= $2 AND ends_at > $2))";

/// Provides CRUD operations for marketing campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Insert a new campaign, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCampaign) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns
                (name, description, campaign_type, discount_percent, starts_at, ends_at,
                 is_active, budget, banner_url)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, true), $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.campaign_type)
            .bind(input.discount_percent)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.is_active)
            .bind(input.budget)
            .bind(&input.banner_url)
            .fetch_one(pool)
            .await
    }

    /// Find a campaign by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List campaigns by start date, latest first.
    ///
    /// With `running_only`, keeps active campaigns whose window contains `now`.
    pub async fn list(
        pool: &PgPool,
        running_only: bool,
        now: Timestamp,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Campaign>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns WHERE {LIST_FILTER}
             ORDER BY starts_at DESC, id DESC LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, Campaign>(&query)
            .bind(running_only)
            .bind(now)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM campaigns WHERE {LIST_FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(running_only)
            .bind(now)
            .fetch_one(pool)
            .await?;

        Ok((rows, total))
    }

    /// Update a campaign. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCampaign,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                campaign_type = COALESCE($4, campaign_type),
                discount_percent = COALESCE($5, discount_percent),
                starts_at = COALESCE($6, starts_at),
                ends_at = COALESCE($7, ends_at),
                is_active = COALESCE($8, is_active),
                budget = COALESCE($9, budget),
                banner_url = COALESCE($10, banner_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.campaign_type)
            .bind(input.discount_percent)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.is_active)
            .bind(input.budget)
            .bind(&input.banner_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a campaign by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
