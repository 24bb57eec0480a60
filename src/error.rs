//! Error types for the authorization core.

use thiserror::Error;

/// The main error type for authorization operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The role-assignment store was unreachable or returned malformed data.
    ///
    /// Never produced by a permission shortfall; callers can always tell
    /// "denied" apart from "could not determine".
    #[error("role lookup failed for '{user_id}': {reason}")]
    Lookup {
        /// The user whose roles were being resolved.
        user_id: String,
        /// Store-reported failure detail.
        reason: String,
        /// Underlying store error, when the adapter has one.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No identity was supplied with the request.
    #[error("no authenticated identity")]
    Unauthenticated,

    /// An identity was supplied but its permissions do not satisfy the policy.
    #[error("access denied for '{user_id}': {reason}")]
    Forbidden {
        /// The denied user.
        user_id: String,
        /// Why the gate denied the request.
        reason: String,
    },

    /// A permission token failed to parse.
    #[error("invalid permission token: '{0}'")]
    InvalidPermission(String),

    /// A role name failed to parse.
    #[error("invalid role name: '{0}'")]
    InvalidRole(String),

    /// Invalid policy or gate configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl Error {
    /// Build a lookup error without an underlying source error.
    pub fn lookup(user_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Lookup {
            user_id: user_id.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Build a lookup error chaining the store's own error.
    pub fn lookup_from<E>(user_id: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Lookup {
            user_id: user_id.into(),
            reason: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if this error means the authorization outcome is
    /// undetermined rather than denied.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Error::Lookup { .. })
    }
}

/// Result type alias for authorization operations.
pub type Result<T> = std::result::Result<T, Error>;
