//! Stored record types: businesses, documents, grants, and audit entries.
//!
//! These are the values held behind the four maps of the system. Keys
//! (tenant, document, principal, log id) live outside the records so a
//! record can be moved between storage backends unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::level::PermissionLevel;
use crate::types::{ContentHash, DocType, PrincipalId};

/// A registered tenant scope.
///
/// The owner is immutable once set; no operation in the core changes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    /// The principal that registered the business. Implicitly holds
    /// [`PermissionLevel::Owner`] on every document under this tenant.
    pub owner: PrincipalId,
    /// Display name.
    pub name: String,
    /// Clock value at registration.
    pub registered_at: i64,
    /// Lifecycle flag. Always true in the current core (deactivation is
    /// not modeled) but persisted for forward compatibility.
    pub active: bool,
}

/// Versioned document metadata. Content itself is off-chain; only the
/// 32-byte hash reference is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Opaque reference to the off-chain content.
    pub content_hash: ContentHash,
    /// Document type tag.
    pub doc_type: DocType,
    /// Clock value at creation. Preserved across updates.
    pub created_at: i64,
    /// Clock value of the most recent create or update.
    pub updated_at: i64,
    /// Starts at 1, increments by exactly 1 per successful update.
    pub version: u64,
    /// Soft-delete flag. An inactive document persists and stays visible
    /// to lookups, audit, and permission checks.
    pub active: bool,
}

/// The mutable content fields of a document, as supplied by create and
/// update operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub name: String,
    pub description: String,
    pub content_hash: ContentHash,
    pub doc_type: DocType,
}

impl DocumentDraft {
    /// Validate the text bounds of the draft.
    pub fn validate(&self) -> Result<()> {
        crate::types::validate_name(&self.name)?;
        crate::types::validate_text(&self.description)?;
        Ok(())
    }
}

/// A stored permission grant for one (tenant, document, principal) key.
///
/// Invariant: `level` is never [`PermissionLevel::None`]; removing access
/// deletes the row instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    /// The granted level.
    pub level: PermissionLevel,
    /// Who granted it.
    pub granted_by: PrincipalId,
    /// Clock value at grant time.
    pub granted_at: i64,
}

/// The kind of action an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AuditAction {
    Create = 0,
    View = 1,
    Edit = 2,
    Share = 3,
    Delete = 4,
}

impl AuditAction {
    /// Numeric tag for storage.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse from a numeric tag.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Create),
            1 => Ok(Self::View),
            2 => Ok(Self::Edit),
            3 => Ok(Self::Share),
            4 => Ok(Self::Delete),
            other => Err(CoreError::UnknownAction(other)),
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::View => "view",
            Self::Edit => "edit",
            Self::Share => "share",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// One immutable entry in a document's audit log.
///
/// Entries are keyed by (tenant, document, log id) where log ids form a
/// gapless sequence starting at 1. Entries are never updated or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// The principal whose action produced this entry.
    pub actor: PrincipalId,
    /// What kind of action it was.
    pub action: AuditAction,
    /// Clock value when the action ran.
    pub at: i64,
    /// Free-text details, bounded.
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocType;

    fn draft() -> DocumentDraft {
        DocumentDraft {
            name: "Q3 contract".into(),
            description: "signed copy".into(),
            content_hash: ContentHash::ZERO,
            doc_type: DocType::new("contract").unwrap(),
        }
    }

    #[test]
    fn test_draft_validation() {
        assert!(draft().validate().is_ok());

        let mut long_name = draft();
        long_name.name = "x".repeat(257);
        assert!(long_name.validate().is_err());

        let mut long_desc = draft();
        long_desc.description = "x".repeat(501);
        assert!(long_desc.validate().is_err());
    }

    #[test]
    fn test_audit_action_roundtrip() {
        for action in [
            AuditAction::Create,
            AuditAction::View,
            AuditAction::Edit,
            AuditAction::Share,
            AuditAction::Delete,
        ] {
            assert_eq!(AuditAction::from_u8(action.as_u8()).unwrap(), action);
        }
        assert!(AuditAction::from_u8(5).is_err());
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let record = DocumentRecord {
            name: "doc".into(),
            description: String::new(),
            content_hash: ContentHash::from_bytes([9; 32]),
            doc_type: DocType::new("note").unwrap(),
            created_at: 10,
            updated_at: 20,
            version: 3,
            active: true,
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: DocumentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
