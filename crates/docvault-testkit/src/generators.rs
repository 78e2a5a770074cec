//! Proptest generators for property-based testing.

use proptest::prelude::*;

use docvault_core::{
    AuditAction, ContentHash, DocId, DocType, DocumentDraft, GrantLevel, PermissionLevel,
    PrincipalId, TenantId,
};

/// Generate a valid bounded identifier string (1..=64 word characters).
fn id_string() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,63}"
}

/// Generate a random TenantId.
pub fn tenant_id() -> impl Strategy<Value = TenantId> {
    id_string().prop_map(|s| TenantId::new(s).unwrap())
}

/// Generate a random DocId.
pub fn doc_id() -> impl Strategy<Value = DocId> {
    id_string().prop_map(|s| DocId::new(s).unwrap())
}

/// Generate a random PrincipalId.
pub fn principal_id() -> impl Strategy<Value = PrincipalId> {
    id_string().prop_map(|s| PrincipalId::new(s).unwrap())
}

/// Generate a random ContentHash.
pub fn content_hash() -> impl Strategy<Value = ContentHash> {
    any::<[u8; 32]>().prop_map(ContentHash::from_bytes)
}

/// Generate any PermissionLevel, None and Owner included.
pub fn permission_level() -> impl Strategy<Value = PermissionLevel> {
    prop_oneof![
        Just(PermissionLevel::None),
        Just(PermissionLevel::View),
        Just(PermissionLevel::Edit),
        Just(PermissionLevel::Admin),
        Just(PermissionLevel::Owner),
    ]
}

/// Generate a grantable level only.
pub fn grant_level() -> impl Strategy<Value = GrantLevel> {
    prop_oneof![
        Just(GrantLevel::View),
        Just(GrantLevel::Edit),
        Just(GrantLevel::Admin),
    ]
}

/// Generate an AuditAction.
pub fn audit_action() -> impl Strategy<Value = AuditAction> {
    prop_oneof![
        Just(AuditAction::Create),
        Just(AuditAction::View),
        Just(AuditAction::Edit),
        Just(AuditAction::Share),
        Just(AuditAction::Delete),
    ]
}

/// Generate a reasonable clock value.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=i64::MAX / 2
}

/// Generate a valid document draft.
pub fn document_draft() -> impl Strategy<Value = DocumentDraft> {
    (id_string(), ".{0,100}", content_hash(), id_string()).prop_map(
        |(name, description, content_hash, doc_type)| DocumentDraft {
            name,
            description,
            content_hash,
            doc_type: DocType::new(doc_type).unwrap(),
        },
    )
}
