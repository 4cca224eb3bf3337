//! Repository for the `coupons` table.

use backoffice_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::coupon::{Coupon, CreateCoupon, UpdateCoupon};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, code, description, discount_type, discount_value, min_purchase, \
                       max_discount, usage_limit, used_count, starts_at, ends_at, is_active, \
                       created_at, updated_at";

/// Provides CRUD and usage-claim operations for coupons.
pub struct CouponRepo;

impl CouponRepo {
    /// Insert a new coupon. `code` must already be upper-cased.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCoupon,
        code: &str,
    ) -> Result<Coupon, sqlx::Error> {
        let query = format!(
            "INSERT INTO coupons
                (code, description, discount_type, discount_value, min_purchase,
                 max_discount, usage_limit, starts_at, ends_at, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Coupon>(&query)
            .bind(code)
            .bind(&input.description)
            .bind(&input.discount_type)
            .bind(input.discount_value)
            .bind(input.min_purchase)
            .bind(input.max_discount)
            .bind(input.usage_limit)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a coupon by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Coupon>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM coupons WHERE id = $1");
        sqlx::query_as::<_, Coupon>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a coupon by code. Matching is case-insensitive.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Coupon>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM coupons WHERE code = upper($1)");
        sqlx::query_as::<_, Coupon>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Find a coupon by code and lock it for the rest of the transaction.
    pub async fn lock_by_code(
        conn: &mut PgConnection,
        code: &str,
    ) -> Result<Option<Coupon>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM coupons WHERE code = upper($1) FOR UPDATE");
        sqlx::query_as::<_, Coupon>(&query)
            .bind(code)
            .fetch_optional(conn)
            .await
    }

    /// List coupons, newest first.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Coupon>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM coupons ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, Coupon>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons")
            .fetch_one(pool)
            .await?;
        Ok((rows, total))
    }

    /// Update a coupon. Absent fields keep their value; nullable fields
    /// sent as `null` are cleared.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCoupon,
    ) -> Result<Option<Coupon>, sqlx::Error> {
        let query = format!(
            "UPDATE coupons SET
                description = CASE WHEN $2 THEN $3 ELSE description END,
                discount_type = COALESCE($4, discount_type),
                discount_value = COALESCE($5, discount_value),
                min_purchase = CASE WHEN $6 THEN $7 ELSE min_purchase END,
                max_discount = CASE WHEN $8 THEN $9 ELSE max_discount END,
                usage_limit = CASE WHEN $10 THEN $11 ELSE usage_limit END,
                starts_at = CASE WHEN $12 THEN $13 ELSE starts_at END,
                ends_at = CASE WHEN $14 THEN $15 ELSE ends_at END,
                is_active = COALESCE($16, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Coupon>(&query)
            .bind(id)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(|d| d.as_deref()))
            .bind(&input.discount_type)
            .bind(input.discount_value)
            .bind(input.min_purchase.is_some())
            .bind(input.min_purchase.flatten())
            .bind(input.max_discount.is_some())
            .bind(input.max_discount.flatten())
            .bind(input.usage_limit.is_some())
            .bind(input.usage_limit.flatten())
            .bind(input.starts_at.is_some())
            .bind(input.starts_at.flatten())
            .bind(input.ends_at.is_some())
            .bind(input.ends_at.flatten())
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a coupon by ID. Returns `true` if a row was removed.
    ///
    /// Orders that used it keep their discount; `coupon_id` becomes NULL.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Claim one use of a coupon.
    ///
    /// Returns `false` when the usage limit is already reached, so two
    /// concurrent orders can never both take the last use.
    pub async fn claim_use(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE coupons SET used_count = used_count + 1
             WHERE id = $1 AND (usage_limit IS NULL OR used_count < usage_limit)",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Give back a use claimed by a cancelled order.
    pub async fn release_use(conn: &mut PgConnection, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE coupons SET used_count = GREATEST(used_count - 1, 0) WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
