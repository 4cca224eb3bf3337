//! Repository for the `inventory_movements` ledger and stock overview.

use backoffice_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::inventory::{CreateMovement, InventoryMovement, StockLevel};

const COLUMNS: &str = "id, product_id, movement_type, quantity, stock_before, stock_after, \
                       reason, user_id, created_at";

const STOCK_FILTER: &str = "(NOT $1 OR stock <= low_stock_threshold)";

/// Ledger writes and stock reads.
pub struct InventoryRepo;

impl InventoryRepo {
    /// Append a movement to the ledger.
    ///
    /// Runs on the caller's transaction so the ledger row commits with the
    /// stock change it records.
    pub async fn insert_movement(
        conn: &mut PgConnection,
        input: &CreateMovement,
    ) -> Result<InventoryMovement, sqlx::Error> {
        let query = format!(
            "INSERT INTO inventory_movements
                (product_id, movement_type, quantity, stock_before, stock_after, reason, user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InventoryMovement>(&query)
            .bind(input.product_id)
            .bind(&input.movement_type)
            .bind(input.quantity)
            .bind(input.stock_before)
            .bind(input.stock_after)
            .bind(&input.reason)
            .bind(input.user_id)
            .fetch_one(conn)
            .await
    }

    /// Movements for one product, newest first.
    pub async fn list_for_product(
        pool: &PgPool,
        product_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<InventoryMovement>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inventory_movements WHERE product_id = $1
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, InventoryMovement>(&query)
            .bind(product_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM inventory_movements WHERE product_id = $1")
                .bind(product_id)
                .fetch_one(pool)
                .await?;
        Ok((rows, total))
    }

    /// Stock levels ordered by how close each product is to running out.
    pub async fn stock_levels(
        pool: &PgPool,
        low_stock_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<StockLevel>, i64), sqlx::Error> {
        let query = format!(
            "SELECT id AS product_id, sku, name, stock, low_stock_threshold,
                    stock <= low_stock_threshold AS is_low_stock
             FROM products WHERE {STOCK_FILTER}
             ORDER BY stock - low_stock_threshold ASC, id ASC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, StockLevel>(&query)
            .bind(low_stock_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM products WHERE {STOCK_FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(low_stock_only)
            .fetch_one(pool)
            .await?;

        Ok((rows, total))
    }
}
