//! Async support for the authorization core (requires the `async` feature).
//!
//! The platform's role assignments live behind an async database driver, so
//! the gate needs an async seam: [`AsyncRoleStore`] is the async twin of
//! [`RoleStore`](crate::store::RoleStore), [`AsyncStoreAdapter`] lifts any
//! sync store into it, and [`AsyncAccessGate`] runs the same decision
//! sequence as the sync gate with the store lookup awaited.

use crate::{
    error::{Error, Result},
    gate::{AccessDecision, DenyReason},
    identity::{Identity, UserId},
    permission::{Permission, PermissionSet},
    policy::{Action, PolicyTable, ResourceKind},
    role::{Role, RoleAssignment},
    store::RoleStore,
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

#[cfg(feature = "audit")]
use log::{info, warn};

/// Async twin of [`RoleStore`](crate::store::RoleStore).
///
/// Same contract: one narrow read capability, failures surface as
/// [`Error::Lookup`](crate::Error::Lookup) and are never mapped to an empty
/// assignment list.
#[async_trait::async_trait]
pub trait AsyncRoleStore: Send + Sync {
    /// List every role assignment currently held by the user.
    async fn roles_for_user(&self, user_id: &UserId) -> Result<Vec<RoleAssignment>>;
}

/// Adapter exposing any sync store through the async trait.
#[derive(Debug, Clone)]
pub struct AsyncStoreAdapter<S: RoleStore> {
    store: Arc<S>,
}

impl<S: RoleStore> AsyncStoreAdapter<S> {
    /// Wrap a sync store.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

#[async_trait::async_trait]
impl<S: RoleStore> AsyncRoleStore for AsyncStoreAdapter<S> {
    async fn roles_for_user(&self, user_id: &UserId) -> Result<Vec<RoleAssignment>> {
        self.store.roles_for_user(user_id)
    }
}

/// Async in-memory role store.
#[derive(Debug, Default, Clone)]
pub struct AsyncMemoryRoleStore {
    assignments: Arc<RwLock<HashMap<UserId, Vec<RoleAssignment>>>>,
}

impl AsyncMemoryRoleStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            assignments: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Assign a role to a user, replacing any existing assignment of the
    /// same role. Returns the created record.
    pub async fn assign(
        &self,
        user_id: impl Into<UserId> + Send,
        role: Role,
        assigned_by: impl Into<UserId> + Send,
    ) -> RoleAssignment {
        let assignment = RoleAssignment::new(user_id, role, assigned_by);

        let mut assignments = self.assignments.write().await;
        let held = assignments
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
    pub async fn revoke(&self, user_id: &UserId, role: Role) -> bool {
        let mut assignments = self.assignments.write().await;
        let Some(held) = assignments.get_mut(user_id) else {
            return false;
        };

        let before = held.len();
        held.retain(|existing| existing.role() != role);
        let revoked = held.len() < before;

        if held.is_empty() {
            assignments.remove(user_id);
        }

        #[cfg(feature = "audit")]
        if revoked {
            info!("role '{role}' revoked from user '{user_id}'");
        }

        revoked
    }

    /// Get the total number of assignment records.
    pub async fn assignment_count(&self) -> usize {
        self.assignments.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait::async_trait]
impl AsyncRoleStore for AsyncMemoryRoleStore {
    async fn roles_for_user(&self, user_id: &UserId) -> Result<Vec<RoleAssignment>> {
        Ok(self
            .assignments
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Async counterpart of [`AccessGate`](crate::gate::AccessGate).
///
/// Runs the identical decision sequence; only the effective-permission
/// resolution awaits the store.
#[derive(Debug)]
pub struct AsyncAccessGate<S: AsyncRoleStore> {
    store: S,
    policies: PolicyTable,
}

impl<S: AsyncRoleStore> AsyncAccessGate<S> {
    /// Create a gate over the given store with the built-in policy table.
    pub fn new(store: S) -> Self {
        Self::with_policies(store, PolicyTable::builtin())
    }

    /// Create a gate with a custom policy table.
    pub fn with_policies(store: S, policies: PolicyTable) -> Self {
        Self { store, policies }
    }

    /// Get the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the policy table.
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// The union of permissions granted by every role the user holds.
    pub async fn effective_permissions(&self, user_id: &UserId) -> Result<PermissionSet> {
        let mut effective = PermissionSet::new();
        for assignment in self.store.roles_for_user(user_id).await? {
            effective.merge(assignment.role().permissions());
        }
        Ok(effective)
    }

    /// Check if the user's effective set contains a permission.
    pub async fn has_permission(&self, user_id: &UserId, permission: Permission) -> Result<bool> {
        Ok(self.effective_permissions(user_id).await?.contains(permission))
    }

    /// Check if the user's effective set contains every listed permission.
    pub async fn has_all_permissions(
        &self,
        user_id: &UserId,
        permissions: &[Permission],
    ) -> Result<bool> {
        Ok(self
            .effective_permissions(user_id)
            .await?
            .contains_all(permissions.iter().copied()))
    }

    /// Check if the user's effective set contains any listed permission.
    pub async fn has_any_permission(
        &self,
        user_id: &UserId,
        permissions: &[Permission],
    ) -> Result<bool> {
        Ok(self
            .effective_permissions(user_id)
            .await?
            .contains_any(permissions.iter().copied()))
    }

    /// Decide whether `identity` may perform `action` on `resource`.
    ///
    /// See [`AccessGate::authorize`](crate::gate::AccessGate::authorize) for
    /// the decision sequence and error contract.
    pub async fn authorize(
        &self,
        identity: &Identity,
        resource: ResourceKind,
        action: Action,
        owner: Option<&UserId>,
    ) -> Result<AccessDecision> {
        let Some(policy) = self.policies.policy_for(resource, action) else {
            #[cfg(feature = "audit")]
            warn!("access DENIED for {identity}: no policy for {action} on {resource}");
            return Ok(AccessDecision::Denied(DenyReason::NoPolicy));
        };

        if policy.is_open() {
            return Ok(AccessDecision::Granted);
        }

        let Identity::User(user_id) = identity else {
            #[cfg(feature = "audit")]
            warn!("access DENIED for anonymous request: {action} on {resource}");
            return Ok(AccessDecision::Denied(DenyReason::Unauthenticated));
        };

        if policy.allow_self() && owner == Some(user_id) {
            #[cfg(feature = "audit")]
            info!("access GRANTED for '{user_id}' as owner: {action} on {resource}");
            return Ok(AccessDecision::Granted);
        }

        let effective = self.effective_permissions(user_id).await?;
        if policy.satisfied_by(&effective) {
            #[cfg(feature = "audit")]
            info!("access GRANTED for '{user_id}': {action} on {resource}");
            Ok(AccessDecision::Granted)
        } else {
            let missing = policy.missing_from(&effective);
            #[cfg(feature = "audit")]
            warn!("access DENIED for '{user_id}': {action} on {resource} (missing: {missing})");
            Ok(AccessDecision::Denied(DenyReason::MissingPermissions(
                missing,
            )))
        }
    }

    /// Like [`authorize`](Self::authorize), but reads the resource owner
    /// from a request context map using the policy's `self_key`.
    pub async fn authorize_with_context(
        &self,
        identity: &Identity,
        resource: ResourceKind,
        action: Action,
        context: &HashMap<String, String>,
    ) -> Result<AccessDecision> {
        let owner = self
            .policies
            .policy_for(resource, action)
            .and_then(|policy| policy.self_key())
            .and_then(|key| context.get(key))
            .map(|id| UserId::from(id.as_str()));

        self.authorize(identity, resource, action, owner.as_ref())
            .await
    }

    /// Authorize and convert a denial into the error taxonomy.
    pub async fn require(
        &self,
        identity: &Identity,
        resource: ResourceKind,
        action: Action,
        owner: Option<&UserId>,
    ) -> Result<()> {
        match self.authorize(identity, resource, action, owner).await? {
            AccessDecision::Granted => Ok(()),
            AccessDecision::Denied(reason) => match identity.user_id() {
                None => Err(Error::Unauthenticated),
                Some(user_id) => Err(Error::Forbidden {
                    user_id: user_id.to_string(),
                    reason: reason.to_string(),
                }),
            },
        }
    }

    /// Decide several checks for one identity in a single call.
    ///
    /// Returns one granted/denied flag per check, in order. Stops at the
    /// first store failure.
    pub async fn batch_authorize(
        &self,
        identity: &Identity,
        checks: &[(ResourceKind, Action, Option<UserId>)],
    ) -> Result<Vec<(ResourceKind, Action, bool)>> {
        let mut results = Vec::with_capacity(checks.len());
        for (resource, action, owner) in checks {
            let decision = self
                .authorize(identity, *resource, *action, owner.as_ref())
                .await?;
            results.push((*resource, *action, decision.is_granted()));
        }
        Ok(results)
    }
}

impl<S: AsyncRoleStore + Clone> Clone for AsyncAccessGate<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            policies: self.policies.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRoleStore;

    #[tokio::test]
    async fn test_async_gate_permission_check() {
        let store = AsyncMemoryRoleStore::new();
        store.assign("alice", Role::Moderator, "system").await;
        let gate = AsyncAccessGate::new(store);

        let alice = Identity::user("alice");
        let publish = gate
            .authorize(&alice, ResourceKind::Dialogue, Action::Publish, None)
            .await
            .unwrap();
        assert!(publish.is_granted());

        let manage = gate
            .authorize(&alice, ResourceKind::RoleAssignments, Action::Manage, None)
            .await
            .unwrap();
        assert!(manage.is_denied());
    }

    #[tokio::test]
    async fn test_async_self_override() {
        let gate = AsyncAccessGate::new(AsyncMemoryRoleStore::new());
        let alice = Identity::user("alice");
        let alice_id = UserId::from("alice");

        let decision = gate
            .authorize(&alice, ResourceKind::Dialogue, Action::Edit, Some(&alice_id))
            .await
            .unwrap();
        assert!(decision.is_granted());
    }

    #[tokio::test]
    async fn test_sync_store_adapter() {
        let sync_store = MemoryRoleStore::new();
        sync_store.assign("bob", Role::User, "system");
        let gate = AsyncAccessGate::new(AsyncStoreAdapter::new(sync_store));

        let effective = gate
            .effective_permissions(&UserId::from("bob"))
            .await
            .unwrap();
        assert_eq!(effective, Role::User.permissions());
    }

    #[tokio::test]
    async fn test_async_store_assign_revoke() {
        let store = AsyncMemoryRoleStore::new();
        let alice = UserId::from("alice");

        store.assign("alice", Role::User, "system").await;
        store.assign("alice", Role::Admin, "root").await;
        assert_eq!(store.assignment_count().await, 2);

        assert!(store.revoke(&alice, Role::Admin).await);
        assert!(!store.revoke(&alice, Role::Admin).await);
        assert_eq!(store.assignment_count().await, 1);
    }

    #[tokio::test]
    async fn test_batch_authorize() {
        let store = AsyncMemoryRoleStore::new();
        store.assign("alice", Role::User, "system").await;
        let gate = AsyncAccessGate::new(store);

        let checks = vec![
            (ResourceKind::Dialogue, Action::Create, None),
            (ResourceKind::Dialogue, Action::Publish, None),
            (
                ResourceKind::Dialogue,
                Action::Edit,
                Some(UserId::from("alice")),
            ),
        ];

        let results = gate
            .batch_authorize(&Identity::user("alice"), &checks)
            .await
            .unwrap();

        assert!(results[0].2);
        assert!(!results[1].2);
        assert!(results[2].2);
    }
}
