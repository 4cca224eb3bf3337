//! Repository for the `customers` table.

use backoffice_core::types::{DbId, Money};
use sqlx::{PgConnection, PgPool};

use crate::models::customer::{CreateCustomer, Customer, UpdateCustomer};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, phone, address, notes, total_orders, total_spent, \
                       created_at, updated_at";

const LIST_FILTER: &str = "($1::text IS NULL OR name ILIKE '%' || $1 || '%' \
                           OR email ILIKE '%' || $1 || '%' OR phone ILIKE '%' || $1 || '%')";

/// Provides CRUD operations for customers.
pub struct CustomerRepo;

impl CustomerRepo {
    /// Insert a new customer, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateCustomer,
    ) -> Result<Customer, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (name, email, phone, address, notes)
             VALUES ($1, lower($2), $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(&input.notes)
            .fetch_one(conn)
            .await
    }

    /// Find a customer by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a customer inside a transaction and hold a row lock until it
    /// ends, so the customer cannot be deleted under a new order.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Find a customer by email. Matching is case-insensitive.
    pub async fn find_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE email = lower($1)");
        sqlx::query_as::<_, Customer>(&query)
            .bind(email)
            .fetch_optional(conn)
            .await
    }

    /// List customers, newest first, with an optional search term.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Customer>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM customers WHERE {LIST_FILTER}
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, Customer>(&query)
            .bind(search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM customers WHERE {LIST_FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(search)
            .fetch_one(pool)
            .await?;

        Ok((rows, total))
    }

    /// Update a customer. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCustomer,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!(
            "UPDATE customers SET
                name = COALESCE($2, name),
                email = COALESCE(lower($3), email),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                notes = COALESCE($6, notes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Number of orders placed by a customer.
    pub async fn order_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a customer by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Adjust the denormalised order counters.
    ///
    /// Pass negative values to reverse a cancelled order.
    pub async fn add_order_totals(
        conn: &mut PgConnection,
        id: DbId,
        orders: i32,
        spent: Money,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE customers SET
                total_orders = GREATEST(total_orders + $2, 0),
                total_spent = GREATEST(total_spent + $3, 0)
             WHERE id = $1",
        )
        .bind(id)
        .bind(orders)
        .bind(spent)
        .execute(conn)
        .await?;
        Ok(())
    }
}
