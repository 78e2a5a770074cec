//! # Docvault Core
//!
//! Pure primitives for docvault: identifiers, permission levels, and record
//! types. This crate contains no I/O and no storage; it is pure data and
//! validation.
//!
//! ## Key Types
//!
//! - [`TenantId`], [`DocId`], [`PrincipalId`] - bounded, validated identifiers
//! - [`ContentHash`] - 32-byte opaque reference to off-chain content
//! - [`PermissionLevel`] / [`GrantLevel`] - the graded access order and its
//!   grantable subset
//! - [`DocumentRecord`], [`BusinessRecord`], [`GrantRecord`], [`AuditEntry`] -
//!   the stored record types

pub mod error;
pub mod level;
pub mod record;
pub mod types;

pub use error::{CoreError, Result};
pub use level::{GrantLevel, PermissionLevel};
pub use record::{
    AuditAction, AuditEntry, BusinessRecord, DocumentDraft, DocumentRecord, GrantRecord,
};
pub use types::{
    validate_name, validate_text, ContentHash, DocId, DocType, PrincipalId, TenantId, MAX_ID_LEN,
    MAX_NAME_LEN, MAX_TEXT_LEN,
};
