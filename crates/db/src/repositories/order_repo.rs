//! Repository for the `orders` and `order_items` tables.

use backoffice_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::order::{NewOrder, NewOrderItem, Order, OrderItem, OrderSummary, OrderWithItems};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, order_number, customer_id, status, payment_status, payment_method, \
                       subtotal, discount, shipping_fee, tax, total, coupon_id, \
                       shipping_address, note, created_by, created_at, updated_at";

/// Order columns qualified with the `o` alias for joined queries.
const SUMMARY_COLUMNS: &str = "o.id, o.order_number, o.customer_id, o.status, o.payment_status, \
                               o.payment_method, o.subtotal, o.discount, o.shipping_fee, o.tax, \
                               o.total, o.coupon_id, o.shipping_address, o.note, o.created_by, \
                               o.created_at, o.updated_at, c.name AS customer_name, \
                               (SELECT COUNT(*) FROM order_items i WHERE i.order_id = o.id) AS item_count";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, product_name, sku, quantity, unit_price, line_total";

const LIST_FILTER: &str = "($1::text IS NULL OR o.status = $1) \
                           AND ($2::bigint IS NULL OR o.customer_id = $2) \
                           AND ($3::text IS NULL OR o.order_number ILIKE '%' || $3 || '%' \
                                OR c.name ILIKE '%' || $3 || '%')";

/// Filters accepted by [`OrderRepo::list`].
#[derive(Debug, Default, Clone, Copy)]
pub struct OrderFilter<'a> {
    pub status: Option<&'a str>,
    pub customer_id: Option<DbId>,
    pub search: Option<&'a str>,
}

/// Provides read and write operations for orders.
pub struct OrderRepo;

impl OrderRepo {
    /// Find an order by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an order together with its lines.
    pub async fn find_with_items(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<OrderWithItems>, sqlx::Error> {
        let Some(order) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let items = Self::items_for_order(pool, id).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    /// All lines of an order, in insertion order.
    pub async fn items_for_order(
        pool: &PgPool,
        order_id: DbId,
    ) -> Result<Vec<OrderItem>, sqlx::Error> {
        let query =
            format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_id)
            .fetch_all(pool)
            .await
    }

    /// List orders, newest first, with customer names and item counts.
    pub async fn list(
        pool: &PgPool,
        filter: OrderFilter<'_>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<OrderSummary>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM orders o JOIN customers c ON c.id = o.customer_id
             WHERE {LIST_FILTER}
             ORDER BY o.created_at DESC, o.id DESC LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, OrderSummary>(&query)
            .bind(filter.status)
            .bind(filter.customer_id)
            .bind(filter.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!(
            "SELECT COUNT(*) FROM orders o JOIN customers c ON c.id = o.customer_id
             WHERE {LIST_FILTER}"
        );
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(filter.status)
            .bind(filter.customer_id)
            .bind(filter.search)
            .fetch_one(pool)
            .await?;

        Ok((rows, total))
    }

    /// The most recent orders, for the dashboard.
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<OrderSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM orders o JOIN customers c ON c.id = o.customer_id
             ORDER BY o.created_at DESC, o.id DESC LIMIT $1"
        );
        sqlx::query_as::<_, OrderSummary>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Update the fulfilment and/or payment status.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_status(
        conn: &mut PgConnection,
        id: DbId,
        status: Option<&str>,
        payment_status: Option<&str>,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET
                status = COALESCE($2, status),
                payment_status = COALESCE($3, payment_status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(status)
            .bind(payment_status)
            .fetch_optional(conn)
            .await
    }

    /// Delete an order and its lines. Returns `true` if a row was removed.
    ///
    /// Stock is not touched; callers cancel an order first to restock it.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Transaction helpers
    // -----------------------------------------------------------------------

    /// Insert the order header.
    pub async fn insert(conn: &mut PgConnection, input: &NewOrder) -> Result<Order, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders
                (order_number, customer_id, payment_method, subtotal, discount,
                 shipping_fee, tax, total, coupon_id, shipping_address, note, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(&input.order_number)
            .bind(input.customer_id)
            .bind(&input.payment_method)
            .bind(input.subtotal)
            .bind(input.discount)
            .bind(input.shipping_fee)
            .bind(input.tax)
            .bind(input.total)
            .bind(input.coupon_id)
            .bind(&input.shipping_address)
            .bind(&input.note)
            .bind(input.created_by)
            .fetch_one(conn)
            .await
    }

    /// Insert one priced line.
    pub async fn insert_item(
        conn: &mut PgConnection,
        order_id: DbId,
        item: &NewOrderItem,
    ) -> Result<OrderItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO order_items
                (order_id, product_id, product_name, sku, quantity, unit_price, line_total)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(&item.sku)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.line_total)
            .fetch_one(conn)
            .await
    }

    /// Load an order and hold a row lock until the transaction ends.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Lines of an order read inside a transaction.
    pub async fn items_in_tx(
        conn: &mut PgConnection,
        order_id: DbId,
    ) -> Result<Vec<OrderItem>, sqlx::Error> {
        let query =
            format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_id)
            .fetch_all(conn)
            .await
    }
}
