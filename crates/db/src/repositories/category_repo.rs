//! Repository for the `categories` table.

use backoffice_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::{Category, CategoryWithCount, CreateCategory, UpdateCategory};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, slug, description, parent_id, sort_order, is_active, created_at, updated_at";

/// Provides CRUD operations for product categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category with an already-resolved slug.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCategory,
        slug: &str,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, slug, description, parent_id, sort_order, is_active)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(input.parent_id)
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a category by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether another category already uses `slug`.
    pub async fn slug_exists(
        pool: &PgPool,
        slug: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1 AND ($2::bigint IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// List all categories with product counts, ordered for display.
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<CategoryWithCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryWithCount>(
            "SELECT c.id, c.name, c.slug, c.description, c.parent_id, c.sort_order, c.is_active,
                    c.created_at, c.updated_at,
                    COUNT(p.id) AS product_count
             FROM categories c
             LEFT JOIN products p ON p.category_id = c.id
             GROUP BY c.id
             ORDER BY c.sort_order ASC, c.name ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a category. Absent fields keep their value; `description`
    /// and `parent_id` sent as `null` are cleared.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
        slug: Option<&str>,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                parent_id = CASE WHEN $6 THEN $7 ELSE parent_id END,
                sort_order = COALESCE($8, sort_order),
                is_active = COALESCE($9, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(slug)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(|d| d.as_deref()))
            .bind(input.parent_id.is_some())
            .bind(input.parent_id.flatten())
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Whether making `parent_id` the parent of `id` would create a cycle.
    pub async fn would_create_cycle(
        pool: &PgPool,
        id: DbId,
        parent_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "WITH RECURSIVE ancestors AS (
                 SELECT id, parent_id FROM categories WHERE id = $2
                 UNION ALL
                 SELECT c.id, c.parent_id FROM categories c
                 JOIN ancestors a ON c.id = a.parent_id
             )
             SELECT EXISTS(SELECT 1 FROM ancestors WHERE id = $1)",
        )
        .bind(id)
        .bind(parent_id)
        .fetch_one(pool)
        .await
    }

    /// Number of products filed under a category.
    pub async fn product_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a category by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
