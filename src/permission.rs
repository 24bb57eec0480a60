//! Permission tokens and permission sets.

use crate::error::{Error, Result};
use std::collections::HashSet;

/// An atomic capability token gating one platform action.
///
/// The set of permissions is closed: the platform's capabilities are fixed,
/// so adding one is a code change, not a data change. The string form is the
/// token used in stored role definitions and audit output
/// (e.g. `CREATE_DIALOGUE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "persistence", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Permission {
    /// Create a new dialogue.
    CreateDialogue,
    /// Edit an existing dialogue's script or metadata.
    EditDialogue,
    /// Delete a dialogue and its stored audio.
    DeleteDialogue,
    /// Publish or unpublish a dialogue.
    PublishDialogue,
    /// Administer user accounts.
    ManageUsers,
    /// Administer role assignments.
    ManageRoles,
}

impl Permission {
    /// Every permission, in declaration order.
    pub const ALL: [Permission; 6] = [
        Permission::CreateDialogue,
        Permission::EditDialogue,
        Permission::DeleteDialogue,
        Permission::PublishDialogue,
        Permission::ManageUsers,
        Permission::ManageRoles,
    ];

    /// Get the token string for this permission.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateDialogue => "CREATE_DIALOGUE",
            Permission::EditDialogue => "EDIT_DIALOGUE",
            Permission::DeleteDialogue => "DELETE_DIALOGUE",
            Permission::PublishDialogue => "PUBLISH_DIALOGUE",
            Permission::ManageUsers => "MANAGE_USERS",
            Permission::ManageRoles => "MANAGE_ROLES",
        }
    }

    /// Parse a permission from its token string.
    ///
    /// Tokens are matched exactly; unknown or differently-cased input is an
    /// [`Error::InvalidPermission`], never a new permission.
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "CREATE_DIALOGUE" => Ok(Permission::CreateDialogue),
            "EDIT_DIALOGUE" => Ok(Permission::EditDialogue),
            "DELETE_DIALOGUE" => Ok(Permission::DeleteDialogue),
            "PUBLISH_DIALOGUE" => Ok(Permission::PublishDialogue),
            "MANAGE_USERS" => Ok(Permission::ManageUsers),
            "MANAGE_ROLES" => Ok(Permission::ManageRoles),
            _ => Err(Error::InvalidPermission(token.to_string())),
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// An unordered collection of permissions with set-membership tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct PermissionSet {
    permissions: HashSet<Permission>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self {
            permissions: HashSet::new(),
        }
    }

    /// Add a permission to the set. Returns false if it was already present.
    pub fn insert(&mut self, permission: Permission) -> bool {
        self.permissions.insert(permission)
    }

    /// Remove a permission from the set. Returns true if it was present.
    pub fn remove(&mut self, permission: Permission) -> bool {
        self.permissions.remove(&permission)
    }

    /// Check if the set contains a specific permission.
    pub fn contains(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Check that every given permission is in the set.
    ///
    /// Vacuously true for an empty input.
    pub fn contains_all<I>(&self, permissions: I) -> bool
    where
        I: IntoIterator<Item = Permission>,
    {
        permissions.into_iter().all(|p| self.contains(p))
    }

    /// Check that at least one of the given permissions is in the set.
    ///
    /// False for an empty input.
    pub fn contains_any<I>(&self, permissions: I) -> bool
    where
        I: IntoIterator<Item = Permission>,
    {
        permissions.into_iter().any(|p| self.contains(p))
    }

    /// Check that this set contains every permission in `other`.
    pub fn is_superset(&self, other: &PermissionSet) -> bool {
        self.permissions.is_superset(&other.permissions)
    }

    /// Check that this set shares at least one permission with `other`.
    pub fn intersects(&self, other: &PermissionSet) -> bool {
        !self.permissions.is_disjoint(&other.permissions)
    }

    /// Absorb another permission set into this one.
    pub fn merge(&mut self, other: PermissionSet) {
        self.permissions.extend(other.permissions);
    }

    /// The union of this set and `other` as a new set.
    pub fn union(&self, other: &PermissionSet) -> PermissionSet {
        let mut merged = self.clone();
        merged.merge(other.clone());
        merged
    }

    /// Permissions in this set that `other` does not contain.
    pub fn difference(&self, other: &PermissionSet) -> PermissionSet {
        self.permissions
            .difference(&other.permissions)
            .copied()
            .collect()
    }

    /// Iterate over the permissions in the set.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.permissions.iter().copied()
    }

    /// Get the number of permissions in the set.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if the permission set is empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl std::fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tokens: Vec<&str> = self.permissions.iter().map(Permission::as_str).collect();
        tokens.sort_unstable();
        f.write_str(&tokens.join(", "))
    }
}

impl From<Permission> for PermissionSet {
    fn from(permission: Permission) -> Self {
        Self {
            permissions: HashSet::from([permission]),
        }
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}

impl Extend<Permission> for PermissionSet {
    fn extend<I: IntoIterator<Item = Permission>>(&mut self, iter: I) {
        self.permissions.extend(iter);
    }
}

impl IntoIterator for PermissionSet {
    type Item = Permission;
    type IntoIter = std::collections::hash_set::IntoIter<Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.into_iter()
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = Permission;
    type IntoIter = std::iter::Copied<std::collections::hash_set::Iter<'a, Permission>>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.iter().copied()
    }
}
