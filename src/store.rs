//! Role-assignment store abstractions.

#[cfg(feature = "audit")]
use log::info;

use crate::{
    error::Result,
    identity::UserId,
    role::{Role, RoleAssignment},
};
use dashmap::DashMap;
use std::sync::Arc;

/// Narrow read interface onto wherever role assignments live.
///
/// The platform keeps assignments in a relational store; tests keep them in
/// memory. The resolver only ever needs this one capability, so any storage
/// technology can sit behind it.
pub trait RoleStore: Send + Sync {
    /// List every role assignment currently held by the user.
    ///
    /// An unknown user is not an error; it has an empty assignment list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lookup`](crate::Error::Lookup) when the backing
    /// store is unreachable, times out, or returns data the adapter cannot
    /// interpret. Implementations must not map such failures to an empty
    /// list.
    fn roles_for_user(&self, user_id: &UserId) -> Result<Vec<RoleAssignment>>;
}

/// Thread-safe in-memory role store.
///
/// The reference [`RoleStore`] implementation, used by tests and by
/// embedders that manage assignments in-process. Clones share the same
/// underlying map.
#[derive(Debug, Default, Clone)]
pub struct MemoryRoleStore {
    assignments: Arc<DashMap<UserId, Vec<RoleAssignment>>>,
}

impl MemoryRoleStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            assignments: Arc::new(DashMap::new()),
        }
    }

    /// Assign a role to a user, replacing any existing assignment of the
    /// same role. Returns the created record.
    pub fn assign(
        &self,
        user_id: impl Into<UserId>,
        role: Role,
        assigned_by: impl Into<UserId>,
    ) -> RoleAssignment {
        let assignment = RoleAssignment::new(user_id, role, assigned_by);

        let mut held = self
            .assignments
            .entry(assignment.user_id().clone())
            .or_default();
        held.retain(|existing| existing.role() != role);
        held.push(assignment.clone());

        #[cfg(feature = "audit")]
        info!(
            "role '{}' assigned to user '{}' by '{}'",
            role,
            assignment.user_id(),
            assignment.assigned_by()
        );

        assignment
    }

    /// Revoke a role from a user. Returns true if the user held it.
    pub fn revoke(&self, user_id: &UserId, role: Role) -> bool {
        let Some(mut held) = self.assignments.get_mut(user_id) else {
            return false;
        };

        let before = held.len();
        held.retain(|existing| existing.role() != role);
        let revoked = held.len() < before;

        if held.is_empty() {
            drop(held);
            self.assignments.remove(user_id);
        }

        #[cfg(feature = "audit")]
        if revoked {
            info!("role '{role}' revoked from user '{user_id}'");
        }

        revoked
    }

    /// Get the total number of assignment records.
    pub fn assignment_count(&self) -> usize {
        self.assignments.iter().map(|entry| entry.value().len()).sum()
    }

    /// Clear all assignments.
    pub fn clear(&self) {
        self.assignments.clear();
    }
}

impl RoleStore for MemoryRoleStore {
    fn roles_for_user(&self, user_id: &UserId) -> Result<Vec<RoleAssignment>> {
        Ok(self
            .assignments
            .get(user_id)
            .map(|held| held.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user_has_no_assignments() {
        let store = MemoryRoleStore::new();
        let held = store.roles_for_user(&UserId::from("nobody")).unwrap();
        assert!(held.is_empty());
    }

    #[test]
    fn test_assign_and_revoke() {
        let store = MemoryRoleStore::new();
        let alice = UserId::from("alice");

        store.assign("alice", Role::User, "system");
        store.assign("alice", Role::Moderator, "admin-1");
        assert_eq!(store.assignment_count(), 2);

        let held = store.roles_for_user(&alice).unwrap();
        let roles: Vec<Role> = held.iter().map(|a| a.role()).collect();
        assert!(roles.contains(&Role::User));
        assert!(roles.contains(&Role::Moderator));

        assert!(store.revoke(&alice, Role::User));
        assert!(!store.revoke(&alice, Role::User));
        assert_eq!(store.assignment_count(), 1);
    }

    #[test]
    fn test_reassigning_a_role_replaces_the_record() {
        let store = MemoryRoleStore::new();
        let alice = UserId::from("alice");

        store.assign("alice", Role::User, "system");
        store.assign("alice", Role::User, "admin-1");

        let held = store.roles_for_user(&alice).unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].assigned_by().as_str(), "admin-1");
    }

    #[test]
    fn test_clones_share_assignments() {
        let store = MemoryRoleStore::new();
        let handle = store.clone();

        store.assign("alice", Role::User, "system");
        assert_eq!(handle.assignment_count(), 1);
    }
}
