//! Handler for `GET /roles`: the static role table and its grants.

use axum::Json;
use backoffice_core::permissions::permissions_for;
use backoffice_core::roles::Role;
use serde::Serialize;

use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;

#[derive(Debug, Serialize)]
pub struct RoleInfo {
    pub name: Role,
    pub label: &'static str,
    pub rank: u8,
    pub permissions: &'static [&'static str],
    /// Whether the caller may assign this role to other users.
    pub assignable: bool,
}

/// GET /api/v1/roles
pub async fn list(auth: AuthUser) -> Json<DataResponse<Vec<RoleInfo>>> {
    let roles = Role::ALL
        .into_iter()
        .map(|role| RoleInfo {
            name: role,
            label: role.label(),
            rank: role.rank(),
            permissions: permissions_for(role),
            assignable: auth.require_assignable(role).is_ok(),
        })
        .collect();
    Json(DataResponse::new(roles))
}
