//! End-to-end ledger behavior over real stores.
//!
//! Exercises the full authorize → mutate → audit path, including the
//! denial cases that must leave zero trace.

use docvault::core::{
    AuditAction, ContentHash, DocId, DocType, DocumentDraft, PermissionLevel, PrincipalId,
    TenantId,
};
use docvault::store::{MemoryStore, SqliteStore, Store};
use docvault::{Ledger, LedgerError, TxContext};

fn tenant() -> TenantId {
    TenantId::new("acme").unwrap()
}

fn doc() -> DocId {
    DocId::new("d1").unwrap()
}

fn principal(name: &str) -> PrincipalId {
    PrincipalId::new(name).unwrap()
}

fn ctx(name: &str, now: i64) -> TxContext {
    TxContext::new(principal(name), now)
}

fn draft(name: &str) -> DocumentDraft {
    DocumentDraft {
        name: name.into(),
        description: "test document".into(),
        content_hash: ContentHash::compute(name.as_bytes()),
        doc_type: DocType::new("contract").unwrap(),
    }
}

/// Register "acme" as alice and create document d1.
async fn setup<S: Store>(ledger: &Ledger<S>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    ledger
        .register_business(&ctx("alice", 1), &tenant(), "Acme Corp")
        .await
        .unwrap();
    ledger
        .add_document(&ctx("alice", 2), &tenant(), &doc(), draft("Q3 contract"))
        .await
        .unwrap();
}

#[tokio::test]
async fn register_business_is_once_only() {
    let ledger = Ledger::new(MemoryStore::new());
    ledger
        .register_business(&ctx("alice", 1), &tenant(), "Acme Corp")
        .await
        .unwrap();

    let err = ledger
        .register_business(&ctx("bob", 2), &tenant(), "Evil Acme")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::BusinessExists(_)));

    // The stored owner and name are untouched by the failed attempt.
    let record = ledger.business_info(&tenant()).await.unwrap().unwrap();
    assert_eq!(record.owner, principal("alice"));
    assert_eq!(record.name, "Acme Corp");
    assert_eq!(record.registered_at, 1);
}

#[tokio::test]
async fn version_starts_at_one_and_steps_by_one() {
    let ledger = Ledger::new(MemoryStore::new());
    setup(&ledger).await;

    let record = ledger.document_info(&tenant(), &doc()).await.unwrap().unwrap();
    assert_eq!(record.version, 1);
    assert_eq!(record.created_at, 2);

    for expected in 2..=4u64 {
        ledger
            .update_document(
                &ctx("alice", 10 + expected as i64),
                &tenant(),
                &doc(),
                draft("Q3 contract rev"),
            )
            .await
            .unwrap();
        let record = ledger.document_info(&tenant(), &doc()).await.unwrap().unwrap();
        assert_eq!(record.version, expected);
        assert_eq!(record.created_at, 2, "creation time preserved");
    }

    // Soft delete does not touch the version.
    ledger
        .delete_document(&ctx("alice", 20), &tenant(), &doc())
        .await
        .unwrap();
    let record = ledger.document_info(&tenant(), &doc()).await.unwrap().unwrap();
    assert_eq!(record.version, 4);
    assert!(!record.active);
}

#[tokio::test]
async fn update_revives_soft_deleted_document() {
    // Deliberate carried-over behavior: update does not consult the active
    // flag and unconditionally reactivates the document.
    let ledger = Ledger::new(MemoryStore::new());
    setup(&ledger).await;

    ledger
        .delete_document(&ctx("alice", 3), &tenant(), &doc())
        .await
        .unwrap();
    assert!(!ledger
        .document_info(&tenant(), &doc())
        .await
        .unwrap()
        .unwrap()
        .active);

    ledger
        .update_document(&ctx("alice", 4), &tenant(), &doc(), draft("revived"))
        .await
        .unwrap();
    let record = ledger.document_info(&tenant(), &doc()).await.unwrap().unwrap();
    assert!(record.active);
    assert_eq!(record.version, 2);
}

#[tokio::test]
async fn create_writes_explicit_owner_grant_row() {
    let ledger = Ledger::new(MemoryStore::new());
    setup(&ledger).await;

    // Redundant with the owner bypass, but the stored row must exist for
    // external consumers of the permission table.
    let grant = ledger
        .store()
        .get_grant(&tenant(), &doc(), &principal("alice"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(grant.level, PermissionLevel::Owner);
    assert_eq!(grant.granted_by, principal("alice"));
}

#[tokio::test]
async fn grants_overwrite_rather_than_max() {
    let ledger = Ledger::new(MemoryStore::new());
    setup(&ledger).await;
    let bob = principal("bob");

    ledger
        .grant_permission(&ctx("alice", 3), &tenant(), &doc(), &bob, PermissionLevel::Admin)
        .await
        .unwrap();
    assert_eq!(
        ledger.user_permission(&tenant(), &doc(), &bob).await.unwrap(),
        PermissionLevel::Admin
    );

    ledger
        .grant_permission(&ctx("alice", 4), &tenant(), &doc(), &bob, PermissionLevel::View)
        .await
        .unwrap();
    assert_eq!(
        ledger.user_permission(&tenant(), &doc(), &bob).await.unwrap(),
        PermissionLevel::View,
        "later grant downgrades"
    );
}

#[tokio::test]
async fn grant_rejects_none_and_owner_even_for_the_owner() {
    let ledger = Ledger::new(MemoryStore::new());
    setup(&ledger).await;

    for level in [PermissionLevel::None, PermissionLevel::Owner] {
        let err = ledger
            .grant_permission(&ctx("alice", 3), &tenant(), &doc(), &principal("bob"), level)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPermissionLevel(l) if l == level));
    }

    // And no audit entry was produced by the failed grants.
    assert_eq!(ledger.store().next_audit_id(&tenant(), &doc()).await.unwrap(), 2);
}

#[tokio::test]
async fn revoke_is_idempotent_and_still_audits() {
    let ledger = Ledger::new(MemoryStore::new());
    setup(&ledger).await;

    // Bob has no grant; revoking still succeeds and still logs SHARE.
    ledger
        .revoke_permission(&ctx("alice", 3), &tenant(), &doc(), &principal("bob"))
        .await
        .unwrap();

    let entry = ledger
        .audit_log_entry(&tenant(), &doc(), 2)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.action, AuditAction::Share);
    assert_eq!(entry.actor, principal("alice"));
}

#[tokio::test]
async fn audit_ids_are_gapless_across_mixed_operations() {
    let ledger = Ledger::new(MemoryStore::new());
    setup(&ledger).await; // id 1: CREATE

    ledger
        .grant_permission(
            &ctx("alice", 3),
            &tenant(),
            &doc(),
            &principal("bob"),
            PermissionLevel::Admin,
        )
        .await
        .unwrap(); // id 2: SHARE
    ledger
        .access_document(&ctx("bob", 4), &tenant(), &doc())
        .await
        .unwrap(); // id 3: VIEW
    ledger
        .update_document(&ctx("bob", 5), &tenant(), &doc(), draft("rev"))
        .await
        .unwrap(); // id 4: EDIT
    ledger
        .delete_document(&ctx("bob", 6), &tenant(), &doc())
        .await
        .unwrap(); // id 5: DELETE

    let expected = [
        AuditAction::Create,
        AuditAction::Share,
        AuditAction::View,
        AuditAction::Edit,
        AuditAction::Delete,
    ];
    for (i, action) in expected.iter().enumerate() {
        let id = i as u64 + 1;
        let entry = ledger
            .audit_log_entry(&tenant(), &doc(), id)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("missing audit id {id}"));
        assert_eq!(entry.action, *action, "audit id {id}");
    }
    assert!(ledger.audit_log_entry(&tenant(), &doc(), 0).await.unwrap().is_none());
    assert!(ledger.audit_log_entry(&tenant(), &doc(), 6).await.unwrap().is_none());
}

#[tokio::test]
async fn shared_view_then_denied_update_scenario() {
    // Full walkthrough: register, create, share, access, then a denied
    // update, with exact audit numbering throughout.
    let ledger = Ledger::new(MemoryStore::new());
    let bob = principal("bob");

    ledger
        .register_business(&ctx("alice", 1), &tenant(), "Acme Corp")
        .await
        .unwrap();
    ledger
        .add_document(&ctx("alice", 2), &tenant(), &doc(), draft("Q3 contract"))
        .await
        .unwrap();

    let created = ledger.document_info(&tenant(), &doc()).await.unwrap().unwrap();
    assert_eq!(created.version, 1);
    let create_entry = ledger.audit_log_entry(&tenant(), &doc(), 1).await.unwrap().unwrap();
    assert_eq!(create_entry.action, AuditAction::Create);

    // Alice holds implicit Owner >= Admin, so she can share.
    ledger
        .grant_permission(&ctx("alice", 3), &tenant(), &doc(), &bob, PermissionLevel::View)
        .await
        .unwrap();
    let share_entry = ledger.audit_log_entry(&tenant(), &doc(), 2).await.unwrap().unwrap();
    assert_eq!(share_entry.action, AuditAction::Share);

    // Bob can view (View >= View) ...
    let viewed = ledger
        .access_document(&ctx("bob", 4), &tenant(), &doc())
        .await
        .unwrap();
    assert_eq!(viewed.name, "Q3 contract");
    let view_entry = ledger.audit_log_entry(&tenant(), &doc(), 3).await.unwrap().unwrap();
    assert_eq!(view_entry.action, AuditAction::View);
    assert_eq!(view_entry.actor, bob);

    // ... but cannot edit (View < Edit), and the denial consumes no id.
    let err = ledger
        .update_document(&ctx("bob", 5), &tenant(), &doc(), draft("sneaky edit"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotAuthorized { .. }));
    assert!(ledger.audit_log_entry(&tenant(), &doc(), 4).await.unwrap().is_none());
    assert_eq!(ledger.store().next_audit_id(&tenant(), &doc()).await.unwrap(), 4);

    // The document is unchanged.
    let record = ledger.document_info(&tenant(), &doc()).await.unwrap().unwrap();
    assert_eq!(record.version, 1);
    assert_eq!(record.name, "Q3 contract");

    // The next successful action takes id 4.
    ledger
        .update_document(&ctx("alice", 6), &tenant(), &doc(), draft("legit edit"))
        .await
        .unwrap();
    let edit_entry = ledger.audit_log_entry(&tenant(), &doc(), 4).await.unwrap().unwrap();
    assert_eq!(edit_entry.action, AuditAction::Edit);
}

#[tokio::test]
async fn non_owner_create_leaves_zero_trace() {
    let ledger = Ledger::new(MemoryStore::new());
    ledger
        .register_business(&ctx("alice", 1), &tenant(), "Acme Corp")
        .await
        .unwrap();

    let err = ledger
        .add_document(&ctx("carol", 2), &tenant(), &doc(), draft("intruder doc"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotAuthorized { .. }));

    assert!(ledger.document_info(&tenant(), &doc()).await.unwrap().is_none());
    assert!(ledger
        .store()
        .get_grant(&tenant(), &doc(), &principal("carol"))
        .await
        .unwrap()
        .is_none());
    assert_eq!(ledger.store().next_audit_id(&tenant(), &doc()).await.unwrap(), 1);
}

#[tokio::test]
async fn create_requires_business_and_free_key() {
    let ledger = Ledger::new(MemoryStore::new());

    let err = ledger
        .add_document(&ctx("alice", 1), &tenant(), &doc(), draft("too early"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::BusinessNotFound(_)));

    setup(&ledger).await;
    let err = ledger
        .add_document(&ctx("alice", 3), &tenant(), &doc(), draft("again"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DocumentExists { .. }));
}

#[tokio::test]
async fn access_denial_is_no_access_not_not_authorized() {
    let ledger = Ledger::new(MemoryStore::new());
    setup(&ledger).await;

    let err = ledger
        .access_document(&ctx("mallory", 3), &tenant(), &doc())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NoAccess { .. }));

    let missing = DocId::new("ghost").unwrap();
    let err = ledger
        .access_document(&ctx("alice", 4), &tenant(), &missing)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DocumentNotFound { .. }));
}

#[tokio::test]
async fn soft_deleted_documents_stay_readable_and_guarded() {
    let ledger = Ledger::new(MemoryStore::new());
    setup(&ledger).await;
    let bob = principal("bob");

    ledger
        .grant_permission(&ctx("alice", 3), &tenant(), &doc(), &bob, PermissionLevel::View)
        .await
        .unwrap();
    ledger
        .delete_document(&ctx("alice", 4), &tenant(), &doc())
        .await
        .unwrap();

    // Deletion is a lifecycle flag, not an access restriction.
    let record = ledger
        .access_document(&ctx("bob", 5), &tenant(), &doc())
        .await
        .unwrap();
    assert!(!record.active);

    // And a stranger is still denied.
    let err = ledger
        .access_document(&ctx("mallory", 6), &tenant(), &doc())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NoAccess { .. }));
}

#[tokio::test]
async fn admin_gate_for_share_and_delete() {
    let ledger = Ledger::new(MemoryStore::new());
    setup(&ledger).await;
    let bob = principal("bob");
    let carol = principal("carol");

    ledger
        .grant_permission(&ctx("alice", 3), &tenant(), &doc(), &bob, PermissionLevel::Edit)
        .await
        .unwrap();

    // Edit < Admin: bob can neither share nor delete nor revoke.
    let err = ledger
        .grant_permission(&ctx("bob", 4), &tenant(), &doc(), &carol, PermissionLevel::View)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotAuthorized { .. }));
    let err = ledger
        .revoke_permission(&ctx("bob", 5), &tenant(), &doc(), &carol)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotAuthorized { .. }));
    let err = ledger
        .delete_document(&ctx("bob", 6), &tenant(), &doc())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotAuthorized { .. }));

    // An Admin grantee can.
    ledger
        .grant_permission(&ctx("alice", 7), &tenant(), &doc(), &bob, PermissionLevel::Admin)
        .await
        .unwrap();
    ledger
        .grant_permission(&ctx("bob", 8), &tenant(), &doc(), &carol, PermissionLevel::View)
        .await
        .unwrap();
    ledger
        .delete_document(&ctx("bob", 9), &tenant(), &doc())
        .await
        .unwrap();
}

#[tokio::test]
async fn full_flow_on_sqlite_backend() {
    // Same semantics over the persistent backend.
    let ledger = Ledger::new(SqliteStore::open_memory().unwrap());
    let bob = principal("bob");
    setup(&ledger).await;

    ledger
        .grant_permission(&ctx("alice", 3), &tenant(), &doc(), &bob, PermissionLevel::View)
        .await
        .unwrap();
    ledger
        .access_document(&ctx("bob", 4), &tenant(), &doc())
        .await
        .unwrap();

    let err = ledger
        .update_document(&ctx("bob", 5), &tenant(), &doc(), draft("denied"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotAuthorized { .. }));

    for (id, action) in [
        (1, AuditAction::Create),
        (2, AuditAction::Share),
        (3, AuditAction::View),
    ] {
        let entry = ledger
            .audit_log_entry(&tenant(), &doc(), id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.action, action);
    }
    assert!(ledger.audit_log_entry(&tenant(), &doc(), 4).await.unwrap().is_none());
}
