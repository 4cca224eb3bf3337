//! Repository for the `brands` table.

use backoffice_core::types::DbId;
use sqlx::PgPool;

use crate::models::brand::{Brand, CreateBrand, UpdateBrand};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, description, logo_url, is_active, created_at, updated_at";

/// Provides CRUD operations for brands.
pub struct BrandRepo;

impl BrandRepo {
    /// Insert a new brand with an already-resolved slug.
    pub async fn create(
        pool: &PgPool,
        input: &CreateBrand,
        slug: &str,
    ) -> Result<Brand, sqlx::Error> {
        let query = format!(
            "INSERT INTO brands (name, slug, description, logo_url, is_active)
             VALUES ($1, $2, $3, $4, COALESCE($5, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Brand>(&query)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(&input.logo_url)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a brand by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Brand>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM brands WHERE id = $1");
        sqlx::query_as::<_, Brand>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether another brand already uses `slug`.
    pub async fn slug_exists(
        pool: &PgPool,
        slug: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM brands WHERE slug = $1 AND ($2::bigint IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// List all brands alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Brand>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM brands ORDER BY name ASC");
        sqlx::query_as::<_, Brand>(&query).fetch_all(pool).await
    }

    /// Update a brand. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBrand,
        slug: Option<&str>,
    ) -> Result<Option<Brand>, sqlx::Error> {
        let query = format!(
            "UPDATE brands SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                logo_url = COALESCE($5, logo_url),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Brand>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(&input.logo_url)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Number of products carrying a brand.
    pub async fn product_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE brand_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a brand by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
