//! Static role → permission table and the permission check.
//!
//! Grants are `RESOURCE:ACTION` strings; `RESOURCE:*` grants every action on
//! a resource. `SUPER_ADMIN` is a superuser and bypasses the table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;

/// Something a permission can be granted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resource {
    Dashboard,
    Products,
    Categories,
    Brands,
    Customers,
    Orders,
    Coupons,
    Campaigns,
    Inventory,
    Users,
    Settings,
    Reports,
}

impl Resource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Resource::Dashboard => "DASHBOARD",
            Resource::Products => "PRODUCTS",
            Resource::Categories => "CATEGORIES",
            Resource::Brands => "BRANDS",
            Resource::Customers => "CUSTOMERS",
            Resource::Orders => "ORDERS",
            Resource::Coupons => "COUPONS",
            Resource::Campaigns => "CAMPAIGNS",
            Resource::Inventory => "INVENTORY",
            Resource::Users => "USERS",
            Resource::Settings => "SETTINGS",
            Resource::Reports => "REPORTS",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation on a [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
    Export,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::View => "VIEW",
            Action::Create => "CREATE",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::Export => "EXPORT",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker granted to `SUPER_ADMIN` in listings.
pub const SUPERUSER_GRANT: &str = "*";

const VIEWER_GRANTS: &[&str] = &[
    "DASHBOARD:VIEW",
    "PRODUCTS:VIEW",
    "CATEGORIES:VIEW",
    "BRANDS:VIEW",
    "CUSTOMERS:VIEW",
    "ORDERS:VIEW",
    "INVENTORY:VIEW",
    "COUPONS:VIEW",
    "CAMPAIGNS:VIEW",
];

const STAFF_GRANTS: &[&str] = &[
    "DASHBOARD:VIEW",
    "PRODUCTS:VIEW",
    "PRODUCTS:CREATE",
    "PRODUCTS:UPDATE",
    "CATEGORIES:VIEW",
    "BRANDS:VIEW",
    "CUSTOMERS:VIEW",
    "CUSTOMERS:CREATE",
    "CUSTOMERS:UPDATE",
    "ORDERS:VIEW",
    "ORDERS:CREATE",
    "ORDERS:UPDATE",
    "INVENTORY:VIEW",
    "INVENTORY:UPDATE",
    "COUPONS:VIEW",
    "CAMPAIGNS:VIEW",
];

const MANAGER_GRANTS: &[&str] = &[
    "DASHBOARD:VIEW",
    "PRODUCTS:*",
    "CATEGORIES:*",
    "BRANDS:*",
    "CUSTOMERS:*",
    "ORDERS:*",
    "INVENTORY:*",
    "COUPONS:*",
    "CAMPAIGNS:*",
    "REPORTS:VIEW",
    "REPORTS:EXPORT",
    "USERS:VIEW",
    "SETTINGS:VIEW",
];

const ADMIN_GRANTS: &[&str] = &[
    "DASHBOARD:VIEW",
    "PRODUCTS:*",
    "CATEGORIES:*",
    "BRANDS:*",
    "CUSTOMERS:*",
    "ORDERS:*",
    "INVENTORY:*",
    "COUPONS:*",
    "CAMPAIGNS:*",
    "REPORTS:*",
    "USERS:*",
    "SETTINGS:*",
];

const SUPER_ADMIN_GRANTS: &[&str] = &[SUPERUSER_GRANT];

/// The grant list for a role, as stored in the static table.
pub fn permissions_for(role: Role) -> &'static [&'static str] {
    match role {
        Role::Viewer => VIEWER_GRANTS,
        Role::Staff => STAFF_GRANTS,
        Role::Manager => MANAGER_GRANTS,
        Role::Admin => ADMIN_GRANTS,
        Role::SuperAdmin => SUPER_ADMIN_GRANTS,
    }
}

/// Whether `role` may perform `action` on `resource`.
///
/// Lookup order: superuser, direct `RESOURCE:ACTION`, wildcard `RESOURCE:*`.
pub fn has_permission(role: Role, resource: Resource, action: Action) -> bool {
    if role == Role::SuperAdmin {
        return true;
    }

    permissions_for(role).iter().any(|grant| {
        match grant.split_once(':') {
            Some((res, act)) => {
                res == resource.as_str() && (act == action.as_str() || act == "*")
            }
            None => false,
        }
    })
}

/// Like [`has_permission`] but returns a `Forbidden` error on denial.
pub fn check_permission(role: Role, resource: Resource, action: Action) -> Result<(), CoreError> {
    if has_permission(role, resource, action) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Role {role} lacks permission {resource}:{action}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const ALL_RESOURCES: [Resource; 12] = [
        Resource::Dashboard,
        Resource::Products,
        Resource::Categories,
        Resource::Brands,
        Resource::Customers,
        Resource::Orders,
        Resource::Coupons,
        Resource::Campaigns,
        Resource::Inventory,
        Resource::Users,
        Resource::Settings,
        Resource::Reports,
    ];

    const ALL_ACTIONS: [Action; 5] = [
        Action::View,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Export,
    ];

    #[test]
    fn super_admin_passes_every_check() {
        for resource in ALL_RESOURCES {
            for action in ALL_ACTIONS {
                assert!(has_permission(Role::SuperAdmin, resource, action));
            }
        }
    }

    #[test]
    fn viewer_is_read_only() {
        assert!(has_permission(Role::Viewer, Resource::Products, Action::View));
        assert!(!has_permission(Role::Viewer, Resource::Products, Action::Create));
        assert!(!has_permission(Role::Viewer, Resource::Users, Action::View));
        assert!(!has_permission(Role::Viewer, Resource::Settings, Action::View));
    }

    #[test]
    fn staff_direct_grants() {
        assert!(has_permission(Role::Staff, Resource::Orders, Action::Create));
        assert!(has_permission(Role::Staff, Resource::Inventory, Action::Update));
        assert!(!has_permission(Role::Staff, Resource::Orders, Action::Delete));
        assert!(!has_permission(Role::Staff, Resource::Categories, Action::Create));
    }

    #[test]
    fn manager_wildcard_grants() {
        for action in ALL_ACTIONS {
            assert!(has_permission(Role::Manager, Resource::Coupons, action));
        }
        assert!(has_permission(Role::Manager, Resource::Users, Action::View));
        assert!(!has_permission(Role::Manager, Resource::Users, Action::Create));
        assert!(!has_permission(Role::Manager, Resource::Settings, Action::Update));
    }

    #[test]
    fn admin_manages_users_and_settings() {
        assert!(has_permission(Role::Admin, Resource::Users, Action::Delete));
        assert!(has_permission(Role::Admin, Resource::Settings, Action::Update));
    }

    #[test]
    fn higher_roles_never_lose_lower_role_grants() {
        for pair in Role::ALL.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            for resource in ALL_RESOURCES {
                for action in ALL_ACTIONS {
                    if has_permission(lower, resource, action) {
                        assert!(
                            has_permission(higher, resource, action),
                            "{higher} should inherit {resource}:{action} from {lower}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn check_permission_reports_the_missing_grant() {
        let err = check_permission(Role::Viewer, Resource::Products, Action::Delete).unwrap_err();
        assert_matches!(err, CoreError::Forbidden(msg) if msg.contains("PRODUCTS:DELETE"));
    }

    #[test]
    fn super_admin_listing_is_single_wildcard() {
        assert_eq!(permissions_for(Role::SuperAdmin), &["*"]);
    }

    #[test]
    fn every_grant_is_well_formed() {
        for role in [Role::Viewer, Role::Staff, Role::Manager, Role::Admin] {
            for grant in permissions_for(role) {
                let (res, act) = grant.split_once(':').expect("grant must contain ':'");
                assert!(ALL_RESOURCES.iter().any(|r| r.as_str() == res), "{grant}");
                assert!(
                    act == "*" || ALL_ACTIONS.iter().any(|a| a.as_str() == act),
                    "{grant}"
                );
            }
        }
    }
}
