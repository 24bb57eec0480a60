//! Effective-permission resolution over a role store.

use crate::{
    error::Result,
    identity::UserId,
    permission::{Permission, PermissionSet},
    store::RoleStore,
};

/// Resolves a user's effective permissions from their role assignments.
///
/// Each query performs one store lookup and unions what the registry grants
/// for every role held. There is no shared mutable state: evaluations for
/// different users are independent and safely concurrent, and the result
/// reflects whatever assignment snapshot the store returned.
#[derive(Debug, Clone)]
pub struct PermissionResolver<S: RoleStore> {
    store: S,
}

impl<S: RoleStore> PermissionResolver<S> {
    /// Create a resolver over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The union of permissions granted by every role the user holds.
    ///
    /// Empty for a user with no role assignments. Store failures propagate
    /// as [`Error::Lookup`](crate::Error::Lookup) untouched.
    pub fn effective_permissions(&self, user_id: &UserId) -> Result<PermissionSet> {
        let mut effective = PermissionSet::new();
        for assignment in self.store.roles_for_user(user_id)? {
            effective.merge(assignment.role().permissions());
        }
        Ok(effective)
    }

    /// Check if the user's effective set contains a permission.
    pub fn has_permission(&self, user_id: &UserId, permission: Permission) -> Result<bool> {
        Ok(self.effective_permissions(user_id)?.contains(permission))
    }

    /// Check if the user's effective set contains every listed permission.
    pub fn has_all_permissions(&self, user_id: &UserId, permissions: &[Permission]) -> Result<bool> {
        Ok(self
            .effective_permissions(user_id)?
            .contains_all(permissions.iter().copied()))
    }

    /// Check if the user's effective set contains any listed permission.
    pub fn has_any_permission(&self, user_id: &UserId, permissions: &[Permission]) -> Result<bool> {
        Ok(self
            .effective_permissions(user_id)?
            .contains_any(permissions.iter().copied()))
    }
}
