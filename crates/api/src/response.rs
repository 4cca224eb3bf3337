//! Shared response envelope types for API handlers.
//!
//! Single items use `{ "data": ... }`; lists use
//! [`PaginatedResponse`](backoffice_core::pagination::PaginatedResponse).

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: product }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
