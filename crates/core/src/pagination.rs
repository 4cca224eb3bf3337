//! Limit/offset clamping and the paginated list envelope.

use serde::{Deserialize, Serialize};

/// Page size used when the client does not ask for one.
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest page a client may request.
pub const MAX_LIMIT: i64 = 100;

/// Clamp a user-provided limit to `1..=max`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Raw `?limit=&offset=` query values.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageRequest {
    /// Resolve to concrete `(limit, offset)` with the default bounds.
    pub fn resolve(self) -> (i64, i64) {
        (
            clamp_limit(self.limit, DEFAULT_LIMIT, MAX_LIMIT),
            clamp_offset(self.offset),
        )
    }
}

/// `{ "data": [...], "total", "limit", "offset" }` list envelope.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
