//! Acting identities, as supplied by the external identity provider.

/// Opaque user identifier issued by the identity provider.
///
/// The authorization core never inspects the contents; equality is the only
/// operation it relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "persistence", serde(transparent))]
pub struct UserId(String);

impl UserId {
    /// Create a user id from its provider-issued string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identity attached to an inbound request.
///
/// Session validation happens upstream; by the time a request reaches the
/// gate it either carries a provider-verified user id or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No identity was supplied.
    Anonymous,
    /// A verified user.
    User(UserId),
}

impl Identity {
    /// Create an authenticated identity.
    pub fn user(id: impl Into<UserId>) -> Self {
        Identity::User(id.into())
    }

    /// Check if no identity was supplied.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    /// Get the user id, if authenticated.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::User(id) => Some(id),
            Identity::Anonymous => None,
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::Anonymous => f.write_str("anonymous"),
            Identity::User(id) => write!(f, "user:{id}"),
        }
    }
}
