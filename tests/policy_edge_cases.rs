//! Edge case tests for tokens, policies, and gate behavior.

use dialogue_authz::{
    AccessGate, Action, DenyReason, Identity, MemoryRoleStore, Permission, PermissionSet, Policy,
    PolicyTable, RequireMode, ResourceKind, Role, UserId,
};
use std::collections::HashMap;

#[test]
fn test_malformed_permission_tokens() {
    let malformed = [
        "",
        " ",
        "CREATE_DIALOGUE ",
        " CREATE_DIALOGUE",
        "create_dialogue",
        "Create_Dialogue",
        "CREATE-DIALOGUE",
        "CREATE_DIALOGUE\u{0000}",
        "MANAGE_EVERYTHING",
        "*",
    ];

    for token in malformed {
        assert!(
            Permission::parse(token).is_err(),
            "should fail to parse: '{token}'"
        );
    }
}

#[test]
fn test_malformed_role_names() {
    for name in ["", "Admin", "admin", "ROOT", "ADMIN ", "MODERATOR\n"] {
        assert!(Role::parse(name).is_err(), "should fail to parse: '{name}'");
    }
}

#[test]
fn test_every_token_round_trips() {
    for permission in Permission::ALL {
        assert_eq!(
            permission.as_str().parse::<Permission>().unwrap(),
            permission
        );
    }
    for role in Role::ALL {
        assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
    }
}

#[test]
fn test_empty_any_policy_never_grants_by_permissions() {
    // An Any-mode policy with an empty requirement list and a self-override
    // is unsatisfiable through permissions; only the owner gets through.
    let table = PolicyTable::builder()
        .rule(
            ResourceKind::Dialogue,
            Action::Manage,
            Policy::builder()
                .mode(RequireMode::Any)
                .allow_self("ownerId")
                .build(),
        )
        .build();

    let store = MemoryRoleStore::new();
    store.assign("admin-1", Role::Admin, "system");
    let gate = AccessGate::with_policies(store, table);

    let admin = Identity::user("admin-1");
    assert!(gate
        .authorize(&admin, ResourceKind::Dialogue, Action::Manage, None)
        .unwrap()
        .is_denied());

    let admin_id = UserId::from("admin-1");
    assert!(gate
        .authorize(&admin, ResourceKind::Dialogue, Action::Manage, Some(&admin_id))
        .unwrap()
        .is_granted());
}

#[test]
fn test_empty_all_policy_with_self_override_admits_authenticated() {
    // All-mode over an empty requirement list is vacuously satisfied, so
    // any authenticated identity passes; anonymous still does not.
    let table = PolicyTable::builder()
        .rule(
            ResourceKind::Dialogue,
            Action::Manage,
            Policy::builder().allow_self("ownerId").build(),
        )
        .build();
    let gate = AccessGate::with_policies(MemoryRoleStore::new(), table);

    assert!(gate
        .authorize(
            &Identity::user("nobody-special"),
            ResourceKind::Dialogue,
            Action::Manage,
            None
        )
        .unwrap()
        .is_granted());
    assert_eq!(
        gate.authorize(
            &Identity::Anonymous,
            ResourceKind::Dialogue,
            Action::Manage,
            None
        )
        .unwrap()
        .deny_reason(),
        Some(&DenyReason::Unauthenticated)
    );
}

#[test]
fn test_empty_table_denies_everything_with_no_policy() {
    let gate = AccessGate::with_policies(MemoryRoleStore::new(), PolicyTable::empty());

    let decision = gate
        .authorize(
            &Identity::user("alice"),
            ResourceKind::Dialogue,
            Action::Read,
            None,
        )
        .unwrap();
    assert_eq!(decision.deny_reason(), Some(&DenyReason::NoPolicy));
}

#[test]
fn test_owner_comparison_is_exact() {
    let gate = AccessGate::new(MemoryRoleStore::new());
    let alice = Identity::user("alice");

    // Near-miss owner ids do not trigger the override.
    for owner in ["Alice", "alice ", "alicea", ""] {
        let owner_id = UserId::from(owner);
        assert!(
            gate.authorize(
                &alice,
                ResourceKind::Dialogue,
                Action::Edit,
                Some(&owner_id)
            )
            .unwrap()
            .is_denied(),
            "owner '{owner}' must not match 'alice'"
        );
    }
}

#[test]
fn test_context_extraction_ignores_foreign_keys() {
    let gate = AccessGate::new(MemoryRoleStore::new());
    let alice = Identity::user("alice");

    // The dialogue policies key on "ownerId"; a "userId" entry is not
    // consulted even when it matches the caller.
    let mut context = HashMap::new();
    context.insert("userId".to_string(), "alice".to_string());

    assert!(gate
        .authorize_with_context(&alice, ResourceKind::Dialogue, Action::Edit, &context)
        .unwrap()
        .is_denied());
}

#[test]
fn test_missing_permissions_reported_in_deny_reason() {
    let table = PolicyTable::builder()
        .rule(
            ResourceKind::RoleAssignments,
            Action::Manage,
            Policy::builder()
                .require_all([Permission::ManageUsers, Permission::ManageRoles])
                .build(),
        )
        .build();

    // Moderator holds neither administrative permission.
    let store = MemoryRoleStore::new();
    store.assign("mod-1", Role::Moderator, "system");
    let gate = AccessGate::with_policies(store, table);

    let decision = gate
        .authorize(
            &Identity::user("mod-1"),
            ResourceKind::RoleAssignments,
            Action::Manage,
            None,
        )
        .unwrap();

    let expected: PermissionSet = [Permission::ManageUsers, Permission::ManageRoles]
        .into_iter()
        .collect();
    assert_eq!(
        decision.deny_reason(),
        Some(&DenyReason::MissingPermissions(expected))
    );
}

#[test]
fn test_deny_reason_display_names_tokens() {
    let reason = DenyReason::MissingPermissions(PermissionSet::from(Permission::PublishDialogue));
    assert_eq!(reason.to_string(), "missing permissions: PUBLISH_DIALOGUE");
}

#[cfg(feature = "persistence")]
#[test]
fn test_tokens_serialize_as_platform_strings() {
    assert_eq!(
        serde_json::to_string(&Permission::CreateDialogue).unwrap(),
        "\"CREATE_DIALOGUE\""
    );
    assert_eq!(serde_json::to_string(&Role::Moderator).unwrap(), "\"MODERATOR\"");

    let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
    assert_eq!(role, Role::Admin);

    let err = serde_json::from_str::<Permission>("\"SUDO\"");
    assert!(err.is_err());
}

#[cfg(feature = "persistence")]
#[test]
fn test_assignment_record_round_trips() {
    use dialogue_authz::RoleAssignment;

    let assignment = RoleAssignment::new("alice", Role::User, "system");
    let json = serde_json::to_string(&assignment).unwrap();
    let back: RoleAssignment = serde_json::from_str(&json).unwrap();
    assert_eq!(back, assignment);
}
