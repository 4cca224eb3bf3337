//! Aggregate queries for the dashboard.

use sqlx::PgPool;

use crate::models::dashboard::{DashboardCounters, DashboardStats};
use crate::repositories::OrderRepo;

/// Number of orders shown in the "recent orders" panel.
pub const RECENT_ORDER_LIMIT: i64 = 10;

pub struct DashboardRepo;

impl DashboardRepo {
    /// Counters plus the latest orders.
    ///
    /// Revenue excludes cancelled and refunded orders. "Today" is the
    /// database server's current date in UTC.
    pub async fn stats(pool: &PgPool) -> Result<DashboardStats, sqlx::Error> {
        let counters = sqlx::query_as::<_, DashboardCounters>(
            "SELECT
                (SELECT COUNT(*) FROM products) AS total_products,
                (SELECT COUNT(*) FROM products WHERE status = 'ACTIVE') AS active_products,
                (SELECT COUNT(*) FROM products WHERE stock <= low_stock_threshold) AS low_stock_products,
                (SELECT COUNT(*) FROM customers) AS total_customers,
                (SELECT COUNT(*) FROM orders) AS total_orders,
                (SELECT COUNT(*) FROM orders WHERE status = 'PENDING') AS pending_orders,
                (SELECT COALESCE(SUM(total), 0)::bigint FROM orders
                    WHERE status NOT IN ('CANCELLED', 'REFUNDED')) AS revenue,
                (SELECT COALESCE(SUM(total), 0)::bigint FROM orders
                    WHERE status NOT IN ('CANCELLED', 'REFUNDED')
                      AND created_at >= date_trunc('day', NOW() AT TIME ZONE 'UTC') AT TIME ZONE 'UTC')
                    AS revenue_today",
        )
        .fetch_one(pool)
        .await?;

        let recent_orders = OrderRepo::recent(pool, RECENT_ORDER_LIMIT).await?;

        Ok(DashboardStats {
            counters,
            recent_orders,
        })
    }
}
