//! Aggregates shown on the dashboard landing page.

use backoffice_core::types::Money;
use serde::Serialize;
use sqlx::FromRow;

use crate::models::order::OrderSummary;

/// Single-row counters computed in one query.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardCounters {
    pub total_products: i64,
    pub active_products: i64,
    pub low_stock_products: i64,
    pub total_customers: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    /// Sum of totals for orders that were not cancelled or refunded.
    pub revenue: Money,
    pub revenue_today: Money,
}

/// Response for `GET /dashboard/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub counters: DashboardCounters,
    pub recent_orders: Vec<OrderSummary>,
}
