//! Declarative access policies keyed by resource kind and action.
//!
//! A [`PolicyTable`] maps each protected `(resource, action)` pair to the
//! permissions it requires, how those permissions combine, and whether
//! acting on one's own resource bypasses the permission check. The table is
//! built once and read-only afterwards; [`PolicyTable::builtin`] is the
//! platform's rule set, and embedders can declare their own through the
//! builder in the same style.

use crate::permission::{Permission, PermissionSet};
use std::collections::HashMap;

/// A family of resources protected by policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "persistence", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ResourceKind {
    /// A scripted character exchange with its rendered audio.
    Dialogue,
    /// A user account and its profile.
    UserAccount,
    /// The role assignments of a user.
    RoleAssignments,
}

impl ResourceKind {
    /// Get the name string for this resource kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Dialogue => "DIALOGUE",
            ResourceKind::UserAccount => "USER_ACCOUNT",
            ResourceKind::RoleAssignments => "ROLE_ASSIGNMENTS",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verb performed against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "persistence", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Action {
    /// Create a new resource.
    Create,
    /// Read a resource.
    Read,
    /// Modify a resource.
    Edit,
    /// Delete a resource.
    Delete,
    /// Make a resource publicly visible.
    Publish,
    /// Withdraw a resource from public visibility.
    Unpublish,
    /// Administer a resource beyond ordinary edits.
    Manage,
}

impl Action {
    /// Get the name string for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Read => "READ",
            Action::Edit => "EDIT",
            Action::Delete => "DELETE",
            Action::Publish => "PUBLISH",
            Action::Unpublish => "UNPUBLISH",
            Action::Manage => "MANAGE",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a policy combines its required permissions.
///
/// Always declared explicitly on the policy. Whether a one-permission list
/// means "all" or "any" is indistinguishable from the list itself, so the
/// mode is never inferred from list length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "persistence", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RequireMode {
    /// Every required permission must be held.
    #[default]
    All,
    /// Holding any one required permission suffices.
    Any,
}

/// Declarative rule for one `(resource, action)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    required: PermissionSet,
    mode: RequireMode,
    allow_self: bool,
    self_key: Option<&'static str>,
}

impl Policy {
    /// A policy with no requirements: access is granted unconditionally.
    pub fn open() -> Self {
        Self {
            required: PermissionSet::new(),
            mode: RequireMode::All,
            allow_self: false,
            self_key: None,
        }
    }

    /// A policy requiring a single permission, in the default `All` mode.
    pub fn require(permission: Permission) -> Self {
        Self {
            required: PermissionSet::from(permission),
            mode: RequireMode::All,
            allow_self: false,
            self_key: None,
        }
    }

    /// Start building a policy.
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::new()
    }

    /// The permissions this policy requires.
    pub fn required(&self) -> &PermissionSet {
        &self.required
    }

    /// How the required permissions combine.
    pub fn mode(&self) -> RequireMode {
        self.mode
    }

    /// Whether the resource owner bypasses the permission check.
    pub fn allow_self(&self) -> bool {
        self.allow_self
    }

    /// The request-context key naming the resource owner, when the policy
    /// has a self-override.
    pub fn self_key(&self) -> Option<&'static str> {
        self.self_key
    }

    /// A policy with no required permissions and no self-override grants
    /// unconditionally.
    pub fn is_open(&self) -> bool {
        self.required.is_empty() && !self.allow_self
    }

    /// Check an effective permission set against this policy's requirements.
    ///
    /// `All` over an empty requirement list is vacuously satisfied; `Any`
    /// over an empty list never is.
    pub fn satisfied_by(&self, effective: &PermissionSet) -> bool {
        match self.mode {
            RequireMode::All => effective.is_superset(&self.required),
            RequireMode::Any => effective.intersects(&self.required),
        }
    }

    /// The permissions an effective set would still need to satisfy this
    /// policy. In `Any` mode, holding none of them means all of them remain
    /// candidates.
    pub fn missing_from(&self, effective: &PermissionSet) -> PermissionSet {
        match self.mode {
            RequireMode::All => self.required.difference(effective),
            RequireMode::Any if self.satisfied_by(effective) => PermissionSet::new(),
            RequireMode::Any => self.required.clone(),
        }
    }
}

/// Builder for declaring policies with a fluent API.
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    required: PermissionSet,
    mode: RequireMode,
    allow_self: bool,
    self_key: Option<&'static str>,
}

impl PolicyBuilder {
    /// Create a new policy builder (mode `All`, no self-override).
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a permission.
    pub fn require(mut self, permission: Permission) -> Self {
        self.required.insert(permission);
        self
    }

    /// Require multiple permissions.
    pub fn require_all(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.required.extend(permissions);
        self
    }

    /// Set how the required permissions combine.
    pub fn mode(mut self, mode: RequireMode) -> Self {
        self.mode = mode;
        self
    }

    /// Let the resource owner through regardless of permissions. `self_key`
    /// names the request-context entry carrying the owner's user id.
    pub fn allow_self(mut self, self_key: &'static str) -> Self {
        self.allow_self = true;
        self.self_key = Some(self_key);
        self
    }

    /// Build the policy.
    pub fn build(self) -> Policy {
        Policy {
            required: self.required,
            mode: self.mode,
            allow_self: self.allow_self,
            self_key: self.self_key,
        }
    }
}

/// Immutable lookup table from `(resource, action)` to [`Policy`].
///
/// A pair with no entry is denied by the gate (fail closed), so the table
/// only needs to enumerate what the platform actually exposes.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    rules: HashMap<(ResourceKind, Action), Policy>,
}

impl PolicyTable {
    /// An empty table: every request is denied for want of a policy.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a policy table.
    pub fn builder() -> PolicyTableBuilder {
        PolicyTableBuilder::default()
    }

    /// The platform's built-in rule set.
    pub fn builtin() -> Self {
        Self::builder()
            .rule(
                ResourceKind::Dialogue,
                Action::Create,
                Policy::require(Permission::CreateDialogue),
            )
            // Published dialogues are publicly listable; visibility filtering
            // happens in the query layer, not the gate.
            .rule(ResourceKind::Dialogue, Action::Read, Policy::open())
            .rule(
                ResourceKind::Dialogue,
                Action::Edit,
                Policy::builder()
                    .require(Permission::EditDialogue)
                    .allow_self("ownerId")
                    .build(),
            )
            .rule(
                ResourceKind::Dialogue,
                Action::Delete,
                Policy::builder()
                    .require(Permission::DeleteDialogue)
                    .allow_self("ownerId")
                    .build(),
            )
            .rule(
                ResourceKind::Dialogue,
                Action::Publish,
                Policy::require(Permission::PublishDialogue),
            )
            // Creators may always withdraw their own published dialogue.
            .rule(
                ResourceKind::Dialogue,
                Action::Unpublish,
                Policy::builder()
                    .require(Permission::PublishDialogue)
                    .allow_self("ownerId")
                    .build(),
            )
            .rule(
                ResourceKind::UserAccount,
                Action::Read,
                Policy::builder()
                    .require(Permission::ManageUsers)
                    .allow_self("userId")
                    .build(),
            )
            .rule(
                ResourceKind::UserAccount,
                Action::Edit,
                Policy::builder()
                    .require(Permission::ManageUsers)
                    .allow_self("userId")
                    .build(),
            )
            .rule(
                ResourceKind::UserAccount,
                Action::Delete,
                Policy::require(Permission::ManageUsers),
            )
            .rule(
                ResourceKind::UserAccount,
                Action::Manage,
                Policy::require(Permission::ManageUsers),
            )
            .rule(
                ResourceKind::RoleAssignments,
                Action::Read,
                Policy::builder()
                    .require_all([Permission::ManageUsers, Permission::ManageRoles])
                    .mode(RequireMode::Any)
                    .build(),
            )
            .rule(
                ResourceKind::RoleAssignments,
                Action::Manage,
                Policy::require(Permission::ManageRoles),
            )
            .build()
    }

    /// Look up the policy for a `(resource, action)` pair.
    pub fn policy_for(&self, resource: ResourceKind, action: Action) -> Option<&Policy> {
        self.rules.get(&(resource, action))
    }

    /// Get the number of declared rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the table declares no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Builder for declaring policy tables.
#[derive(Debug, Default)]
pub struct PolicyTableBuilder {
    rules: HashMap<(ResourceKind, Action), Policy>,
}

impl PolicyTableBuilder {
    /// Declare the policy for a `(resource, action)` pair, replacing any
    /// earlier declaration for the same pair.
    pub fn rule(mut self, resource: ResourceKind, action: Action, policy: Policy) -> Self {
        self.rules.insert((resource, action), policy);
        self
    }

    /// Build the table.
    pub fn build(self) -> PolicyTable {
        PolicyTable { rules: self.rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = Policy::require(Permission::EditDialogue);
        assert_eq!(policy.mode(), RequireMode::All);
        assert!(!policy.allow_self());
        assert!(policy.self_key().is_none());
        assert!(!policy.is_open());
    }

    #[test]
    fn test_open_policy() {
        assert!(Policy::open().is_open());

        // A self-override alone keeps the policy closed.
        let self_only = Policy::builder().allow_self("ownerId").build();
        assert!(!self_only.is_open());
    }

    #[test]
    fn test_all_mode_requires_every_permission() {
        let policy = Policy::builder()
            .require_all([Permission::ManageUsers, Permission::ManageRoles])
            .build();

        let partial = PermissionSet::from(Permission::ManageUsers);
        assert!(!policy.satisfied_by(&partial));
        assert_eq!(
            policy.missing_from(&partial),
            PermissionSet::from(Permission::ManageRoles)
        );

        let full: PermissionSet = [Permission::ManageUsers, Permission::ManageRoles]
            .into_iter()
            .collect();
        assert!(policy.satisfied_by(&full));
        assert!(policy.missing_from(&full).is_empty());
    }

    #[test]
    fn test_any_mode_accepts_one_of() {
        let policy = Policy::builder()
            .require_all([Permission::ManageUsers, Permission::ManageRoles])
            .mode(RequireMode::Any)
            .build();

        assert!(policy.satisfied_by(&PermissionSet::from(Permission::ManageRoles)));
        assert!(!policy.satisfied_by(&PermissionSet::from(Permission::EditDialogue)));
        assert_eq!(
            policy.missing_from(&PermissionSet::new()),
            policy.required().clone()
        );
    }

    #[test]
    fn test_builtin_table_lookups() {
        let table = PolicyTable::builtin();

        let edit = table
            .policy_for(ResourceKind::Dialogue, Action::Edit)
            .unwrap();
        assert!(edit.allow_self());
        assert_eq!(edit.self_key(), Some("ownerId"));
        assert!(edit.required().contains(Permission::EditDialogue));

        let read = table
            .policy_for(ResourceKind::Dialogue, Action::Read)
            .unwrap();
        assert!(read.is_open());

        let grants = table
            .policy_for(ResourceKind::RoleAssignments, Action::Read)
            .unwrap();
        assert_eq!(grants.mode(), RequireMode::Any);

        // Undeclared pairs have no entry; the gate fails closed on them.
        assert!(
            table
                .policy_for(ResourceKind::UserAccount, Action::Publish)
                .is_none()
        );
    }

    #[test]
    fn test_table_builder_replaces_duplicate_rules() {
        let table = PolicyTable::builder()
            .rule(
                ResourceKind::Dialogue,
                Action::Create,
                Policy::require(Permission::ManageUsers),
            )
            .rule(
                ResourceKind::Dialogue,
                Action::Create,
                Policy::require(Permission::CreateDialogue),
            )
            .build();

        assert_eq!(table.len(), 1);
        let policy = table
            .policy_for(ResourceKind::Dialogue, Action::Create)
            .unwrap();
        assert!(policy.required().contains(Permission::CreateDialogue));
        assert!(!policy.required().contains(Permission::ManageUsers));
    }
}
