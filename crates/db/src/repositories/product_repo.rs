//! Repository for the `products` table.

use backoffice_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::product::{CreateProduct, Product, UpdateProduct};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, sku, name, slug, description, price, compare_at_price, cost_price, \
                       stock, low_stock_threshold, category_id, brand_id, status, images, \
                       created_at, updated_at";

/// Shared WHERE clause for list and count.
const LIST_FILTER: &str = "($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR sku ILIKE '%' || $1 || '%') \
                           AND ($2::bigint IS NULL OR category_id = $2) \
                           AND ($3::bigint IS NULL OR brand_id = $3) \
                           AND ($4::text IS NULL OR status = $4) \
                           AND (NOT $5 OR stock <= low_stock_threshold)";

/// Filters accepted by [`ProductRepo::list`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ProductFilter<'a> {
    pub search: Option<&'a str>,
    pub category_id: Option<DbId>,
    pub brand_id: Option<DbId>,
    pub status: Option<&'a str>,
    pub low_stock: bool,
}

fn images_json(images: Option<&Vec<String>>) -> Option<serde_json::Value> {
    images.map(|urls| serde_json::Value::from(urls.clone()))
}

/// Provides CRUD and stock-locking operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product with a normalised SKU and resolved slug.
    ///
    /// Takes a connection so the opening stock movement can share the
    /// transaction.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateProduct,
        sku: &str,
        slug: &str,
    ) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products
                (sku, name, slug, description, price, compare_at_price, cost_price,
                 stock, low_stock_threshold, category_id, brand_id, status, images)
             VALUES ($1, $2, $3, $4, $5, $6, $7,
                     COALESCE($8, 0), COALESCE($9, 5), $10, $11,
                     COALESCE($12, 'DRAFT'), COALESCE($13, '[]'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(sku)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.compare_at_price)
            .bind(input.cost_price)
            .bind(input.stock)
            .bind(input.low_stock_threshold)
            .bind(input.category_id)
            .bind(input.brand_id)
            .bind(&input.status)
            .bind(images_json(input.images.as_ref()))
            .fetch_one(conn)
            .await
    }

    /// Find a product by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a product by SKU. `sku` must already be normalised.
    pub async fn find_by_sku(pool: &PgPool, sku: &str) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE sku = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(sku)
            .fetch_optional(pool)
            .await
    }

    /// Whether another product already uses `sku`.
    pub async fn sku_exists(
        pool: &PgPool,
        sku: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1 AND ($2::bigint IS NULL OR id <> $2))",
        )
        .bind(sku)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Whether another product already uses `slug`.
    pub async fn slug_exists(
        pool: &PgPool,
        slug: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM products WHERE slug = $1 AND ($2::bigint IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// List products, newest first, returning the page and the total match count.
    pub async fn list(
        pool: &PgPool,
        filter: ProductFilter<'_>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Product>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products WHERE {LIST_FILTER}
             ORDER BY created_at DESC, id DESC LIMIT $6 OFFSET $7"
        );
        let rows = sqlx::query_as::<_, Product>(&query)
            .bind(filter.search)
            .bind(filter.category_id)
            .bind(filter.brand_id)
            .bind(filter.status)
            .bind(filter.low_stock)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM products WHERE {LIST_FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(filter.search)
            .bind(filter.category_id)
            .bind(filter.brand_id)
            .bind(filter.status)
            .bind(filter.low_stock)
            .fetch_one(pool)
            .await?;

        Ok((rows, total))
    }

    /// Update a product. Only non-`None` fields in `input` are applied.
    ///
    /// `compare_at_price`, `category_id` and `brand_id` sent as `null` are
    /// cleared. `sku` and `slug` are passed separately because the caller
    /// normalises them. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
        sku: Option<&str>,
        slug: Option<&str>,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                sku = COALESCE($2, sku),
                name = COALESCE($3, name),
                slug = COALESCE($4, slug),
                description = COALESCE($5, description),
                price = COALESCE($6, price),
                compare_at_price = CASE WHEN $7 THEN $8 ELSE compare_at_price END,
                cost_price = COALESCE($9, cost_price),
                low_stock_threshold = COALESCE($10, low_stock_threshold),
                category_id = CASE WHEN $11 THEN $12 ELSE category_id END,
                brand_id = CASE WHEN $13 THEN $14 ELSE brand_id END,
                status = COALESCE($15, status),
                images = COALESCE($16, images)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(sku)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.compare_at_price.is_some())
            .bind(input.compare_at_price.flatten())
            .bind(input.cost_price)
            .bind(input.low_stock_threshold)
            .bind(input.category_id.is_some())
            .bind(input.category_id.flatten())
            .bind(input.brand_id.is_some())
            .bind(input.brand_id.flatten())
            .bind(&input.status)
            .bind(images_json(input.images.as_ref()))
            .fetch_optional(pool)
            .await
    }

    /// Delete a product by ID. Returns `true` if a row was removed.
    ///
    /// Order lines keep their copied name and SKU; the ledger rows go with
    /// the product.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Transaction helpers
    // -----------------------------------------------------------------------

    /// Load a product and hold a row lock until the transaction ends.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Overwrite the stock level of a locked product.
    pub async fn set_stock(
        conn: &mut PgConnection,
        id: DbId,
        stock: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE products SET stock = $2 WHERE id = $1")
            .bind(id)
            .bind(stock)
            .execute(conn)
            .await?;
        Ok(())
    }
}
