//! Roles, the static role/permission registry, and assignment records.

use crate::{
    error::{Error, Result},
    identity::UserId,
    permission::{Permission, PermissionSet},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A named bundle of permissions assignable to a user.
///
/// The platform ships a fixed set of built-in roles; there is no dynamic
/// role creation. What each role grants is decided here, at compile time,
/// not persisted per assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "persistence", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Role {
    /// Full control, including user and role administration.
    Admin,
    /// Content-level control over dialogues, including publishing.
    Moderator,
    /// Regular creator: owns and manages their own dialogues.
    User,
}

impl Role {
    /// Every role, most privileged first.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Moderator, Role::User];

    /// The permissions this role grants.
    ///
    /// Pure registry lookup: stable across calls, no side effects. An
    /// unknown role cannot be represented, so there is no failure mode.
    pub fn permissions(&self) -> PermissionSet {
        match self {
            Role::Admin => [
                Permission::CreateDialogue,
                Permission::EditDialogue,
                Permission::DeleteDialogue,
                Permission::PublishDialogue,
                Permission::ManageUsers,
                Permission::ManageRoles,
            ]
            .into_iter()
            .collect(),
            Role::Moderator => [
                Permission::CreateDialogue,
                Permission::EditDialogue,
                Permission::DeleteDialogue,
                Permission::PublishDialogue,
            ]
            .into_iter()
            .collect(),
            Role::User => [
                Permission::CreateDialogue,
                Permission::EditDialogue,
                Permission::DeleteDialogue,
            ]
            .into_iter()
            .collect(),
        }
    }

    /// Check if this role grants a specific permission.
    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions().contains(permission)
    }

    /// Get the name string for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Moderator => "MODERATOR",
            Role::User => "USER",
        }
    }

    /// Parse a role from its name string.
    ///
    /// Names are matched exactly; unknown input is an [`Error::InvalidRole`].
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "ADMIN" => Ok(Role::Admin),
            "MODERATOR" => Ok(Role::Moderator),
            "USER" => Ok(Role::User),
            _ => Err(Error::InvalidRole(name.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A record linking a user to a role.
///
/// Tracks who made the grant and when. A user may hold any number of these;
/// their effective permissions are the union over all of them. Creating and
/// revoking assignments is an administrative concern of whichever store
/// holds them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleAssignment {
    /// Unique identifier for the assignment record.
    id: String,
    /// The user holding the role.
    user_id: UserId,
    /// The assigned role.
    role: Role,
    /// Who made the assignment.
    assigned_by: UserId,
    /// When the assignment was made.
    assigned_at: DateTime<Utc>,
}

impl RoleAssignment {
    /// Create a new assignment record, stamped now.
    pub fn new(user_id: impl Into<UserId>, role: Role, assigned_by: impl Into<UserId>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            role,
            assigned_by: assigned_by.into(),
            assigned_at: Utc::now(),
        }
    }

    /// Get the assignment record's unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the user holding the role.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Get the assigned role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Get who made the assignment.
    pub fn assigned_by(&self) -> &UserId {
        &self.assigned_by
    }

    /// Get when the assignment was made.
    pub fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }
}
