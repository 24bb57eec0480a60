//! # Dialogue Authz
//!
//! Role-based authorization core for a dialogue creation and publishing
//! platform: a static role/permission registry, a declarative policy table,
//! a permission resolver over a pluggable role-assignment store, and an
//! access gate that route handlers and UI components consult before acting.
//!
//! ## Features
//!
//! - Closed, exhaustively-matchable permission and role enumerations
//! - Declarative per-resource-action policies with explicit all/any modes
//! - Self-ownership override for policies that let creators manage their
//!   own dialogues
//! - Effective permissions as the union over all assigned roles
//! - Pluggable role-assignment store with a thread-safe in-memory
//!   implementation; lookup failures stay distinguishable from denials
//! - Async store trait and gate (`async` feature)
//! - Serializable data model (`persistence` feature)
//! - Audit logging of grants, denials, and assignment changes
//!   (`audit` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use dialogue_authz::{AccessGate, Action, Identity, MemoryRoleStore, ResourceKind, Role};
//!
//! // Assignments normally live in the platform database; the in-memory
//! // store is the reference implementation.
//! let store = MemoryRoleStore::new();
//! store.assign("alice", Role::User, "system");
//!
//! let gate = AccessGate::new(store);
//!
//! // Alice may create dialogues...
//! let alice = Identity::user("alice");
//! let decision = gate.authorize(&alice, ResourceKind::Dialogue, Action::Create, None)?;
//! assert!(decision.is_granted());
//!
//! // ...but publishing requires a permission her role does not grant.
//! let decision = gate.authorize(&alice, ResourceKind::Dialogue, Action::Publish, None)?;
//! assert!(decision.is_denied());
//! # Ok::<(), dialogue_authz::Error>(())
//! ```
//!
//! ## Audit Logging
//!
//! With the `audit` feature enabled, grants and denials are logged through
//! the standard Rust logging framework:
//!
//! ```rust
//! # #[cfg(feature = "audit")]
//! # {
//! use dialogue_authz::init_audit_logger;
//!
//! // Initialize logging early; level comes from RUST_LOG, e.g.
//! // RUST_LOG=info,dialogue_authz=debug
//! init_audit_logger();
//! # }
//! ```

#[cfg(feature = "audit")]
pub fn init_audit_logger() {
    env_logger::init();
}

pub mod error;
pub mod gate;
pub mod identity;
pub mod permission;
pub mod policy;
pub mod resolver;
pub mod role;
pub mod store;

#[cfg(feature = "async")]
pub mod async_support;


// Re-export main types for convenience
pub use crate::{
    error::{Error, Result},
    gate::{AccessDecision, AccessGate, DenyReason},
    identity::{Identity, UserId},
    permission::{Permission, PermissionSet},
    policy::{Action, Policy, PolicyBuilder, PolicyTable, PolicyTableBuilder, RequireMode, ResourceKind},
    resolver::PermissionResolver,
    role::{Role, RoleAssignment},
    store::{MemoryRoleStore, RoleStore},
};

#[cfg(feature = "async")]
pub use crate::async_support::{
    AsyncAccessGate, AsyncMemoryRoleStore, AsyncRoleStore, AsyncStoreAdapter,
};
