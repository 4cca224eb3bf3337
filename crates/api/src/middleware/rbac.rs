//! Role-based access control on top of [`AuthUser`].

use backoffice_core::error::CoreError;
use backoffice_core::permissions::{check_permission, Action, Resource};
use backoffice_core::roles::{can_assign_role, Role};

use super::auth::AuthUser;
use crate::error::AppError;

impl AuthUser {
    /// Fail with 403 unless the caller's role grants `resource:action`.
    pub fn require(&self, resource: Resource, action: Action) -> Result<(), AppError> {
        check_permission(self.role, resource, action).map_err(|err| {
            tracing::debug!(
                user_id = self.user_id,
                role = %self.role,
                %resource,
                %action,
                "Permission denied"
            );
            AppError::Core(err)
        })
    }

    /// Fail with 403 unless the caller may hand out `target`.
    pub fn require_assignable(&self, target: Role) -> Result<(), AppError> {
        if can_assign_role(self.role, target) {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(format!(
                "Role {} cannot assign role {target}",
                self.role
            ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser { user_id: 1, role }
    }

    #[test]
    fn viewer_can_view_but_not_create() {
        let viewer = user(Role::Viewer);
        assert!(viewer.require(Resource::Products, Action::View).is_ok());
        assert_matches!(
            viewer.require(Resource::Products, Action::Create),
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
    }

    #[test]
    fn admin_cannot_assign_admin_but_super_admin_can() {
        assert!(user(Role::Admin).require_assignable(Role::Admin).is_err());
        assert!(user(Role::Admin).require_assignable(Role::Manager).is_ok());
        assert!(user(Role::SuperAdmin)
            .require_assignable(Role::SuperAdmin)
            .is_ok());
    }
}
