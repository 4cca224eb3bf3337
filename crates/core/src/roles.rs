//! The five back-office role tiers and their ranking.
//!
//! Roles are stored as upper-case text in `users.role`; the CHECK
//! constraint in `20260101000002_create_users.sql` must list the same names.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A back-office role, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Viewer,
    Staff,
    Manager,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Every role, lowest rank first.
    pub const ALL: [Role; 5] = [
        Role::Viewer,
        Role::Staff,
        Role::Manager,
        Role::Admin,
        Role::SuperAdmin,
    ];

    /// Position in the hierarchy, 0 for `VIEWER` up to 4 for `SUPER_ADMIN`.
    pub const fn rank(self) -> u8 {
        match self {
            Role::Viewer => 0,
            Role::Staff => 1,
            Role::Manager => 2,
            Role::Admin => 3,
            Role::SuperAdmin => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "VIEWER",
            Role::Staff => "STAFF",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }

    /// Human-readable label shown in the admin UI.
    pub const fn label(self) -> &'static str {
        match self {
            Role::Viewer => "Viewer",
            Role::Staff => "Staff",
            Role::Manager => "Manager",
            Role::Admin => "Administrator",
            Role::SuperAdmin => "Super Administrator",
        }
    }

    /// Parse a stored role name. Matching is exact (upper-case).
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == name)
            .ok_or_else(|| CoreError::validation(format!("Unknown role '{name}'")))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `true` when `role` ranks at or above `minimum`.
pub fn has_minimum_role(role: Role, minimum: Role) -> bool {
    role.rank() >= minimum.rank()
}

/// Whether `actor` may give `target` to a user (create, update, or manage
/// a user already holding `target`).
///
/// `SUPER_ADMIN` may assign anything; everyone else only roles strictly
/// below their own.
pub fn can_assign_role(actor: Role, target: Role) -> bool {
    actor == Role::SuperAdmin || actor.rank() > target.rank()
}
