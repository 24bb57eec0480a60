//! The access gate: boundary authorization checks.
//!
//! Route handlers and UI components ask the gate one question before acting:
//! may this identity perform this action on this resource? The gate looks up
//! the declared policy, applies the self-ownership override, and otherwise
//! defers to the resolver's effective permission set.

#[cfg(feature = "audit")]
use log::{info, warn};

use crate::{
    error::{Error, Result},
    identity::{Identity, UserId},
    permission::PermissionSet,
    policy::{Action, PolicyTable, ResourceKind},
    resolver::PermissionResolver,
    store::RoleStore,
};
use std::collections::HashMap;

/// Why the gate denied a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No identity was supplied.
    Unauthenticated,
    /// The effective permission set does not satisfy the policy; carries
    /// the permissions that were not held.
    MissingPermissions(PermissionSet),
    /// No policy is declared for the `(resource, action)` pair.
    NoPolicy,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenyReason::Unauthenticated => f.write_str("no authenticated identity"),
            DenyReason::MissingPermissions(missing) if missing.is_empty() => {
                f.write_str("policy requirements not met")
            }
            DenyReason::MissingPermissions(missing) => {
                write!(f, "missing permissions: {missing}")
            }
            DenyReason::NoPolicy => f.write_str("no policy declared for this resource and action"),
        }
    }
}

/// The outcome of an authorization check.
///
/// A decision is only produced when the check could be determined; a store
/// failure surfaces as [`Error::Lookup`] instead, never as a denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Access is granted.
    Granted,
    /// Access is denied.
    Denied(DenyReason),
}

impl AccessDecision {
    /// Returns true if access was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }

    /// Returns true if access was denied.
    pub fn is_denied(&self) -> bool {
        !self.is_granted()
    }

    /// Returns the denial reason if access was denied.
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            AccessDecision::Denied(reason) => Some(reason),
            AccessDecision::Granted => None,
        }
    }
}

/// The boundary check combining a policy table with a permission resolver.
#[derive(Debug, Clone)]
pub struct AccessGate<S: RoleStore> {
    resolver: PermissionResolver<S>,
    policies: PolicyTable,
}

impl<S: RoleStore> AccessGate<S> {
    /// Create a gate over the given store with the built-in policy table.
    pub fn new(store: S) -> Self {
        Self::with_policies(store, PolicyTable::builtin())
    }

    /// Create a gate with a custom policy table.
    pub fn with_policies(store: S, policies: PolicyTable) -> Self {
        Self {
            resolver: PermissionResolver::new(store),
            policies,
        }
    }

    /// Get the underlying resolver.
    pub fn resolver(&self) -> &PermissionResolver<S> {
        &self.resolver
    }

    /// Get the policy table.
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// Decide whether `identity` may perform `action` on `resource`.
    ///
    /// `owner` is the resource's owner, when the caller knows it; policies
    /// with a self-override grant owners access regardless of permissions.
    ///
    /// The check runs in policy order: an undeclared pair is denied (fail
    /// closed), an open policy grants unconditionally, an anonymous identity
    /// is denied before any store traffic, the self-override short-circuits
    /// the permission check, and only then is the effective permission set
    /// resolved and tested per the policy's require mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lookup`] when the role store fails; an undetermined
    /// check is never reported as a denial.
    pub fn authorize(
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

        let effective = self.resolver.effective_permissions(user_id)?;
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
    ///
    /// Mirrors handlers that carry the owner id as a request parameter: a
    /// policy declaring `allow_self("ownerId")` looks up `"ownerId"` in
    /// `context`. A missing or foreign value simply skips the override.
    pub fn authorize_with_context(
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
    }

    /// Authorize and convert a denial into the error taxonomy.
    ///
    /// Anonymous denials become [`Error::Unauthenticated`]; authenticated
    /// denials become [`Error::Forbidden`]. Intended for callers that gate
    /// with `?` and map errors onto 401/403 responses.
    pub fn require(
        &self,
        identity: &Identity,
        resource: ResourceKind,
        action: Action,
        owner: Option<&UserId>,
    ) -> Result<()> {
        match self.authorize(identity, resource, action, owner)? {
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
}
