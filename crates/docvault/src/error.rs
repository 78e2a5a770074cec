//! Error types for the Ledger.

use docvault_core::{CoreError, DocId, PermissionLevel, PrincipalId, TenantId};
use docvault_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Ledger operations.
///
/// Every variant is an expected, recoverable-by-caller condition. A failed
/// operation has zero side effects: no partial writes and no audit entry.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The tenant key is already registered.
    #[error("business already exists: {0}")]
    BusinessExists(TenantId),

    /// The referenced business does not exist.
    #[error("business not found: {0}")]
    BusinessNotFound(TenantId),

    /// The (tenant, document) key is already occupied.
    #[error("document already exists: {tenant}/{doc}")]
    DocumentExists { tenant: TenantId, doc: DocId },

    /// The referenced document does not exist.
    #[error("document not found: {tenant}/{doc}")]
    DocumentNotFound { tenant: TenantId, doc: DocId },

    /// The caller's level is insufficient for a mutating operation, or the
    /// caller is not the required owner.
    #[error("{caller} is not authorized for {required} on {tenant}/{doc}")]
    NotAuthorized {
        caller: PrincipalId,
        required: PermissionLevel,
        tenant: TenantId,
        doc: DocId,
    },

    /// View-specific denial, kept distinct from [`LedgerError::NotAuthorized`]
    /// so callers can tell read-denial from write-denial.
    #[error("{caller} has no access to {tenant}/{doc}")]
    NoAccess {
        caller: PrincipalId,
        tenant: TenantId,
        doc: DocId,
    },

    /// Grant level outside the grantable range [View, Admin].
    #[error("invalid permission level for grant: {0}")]
    InvalidPermissionLevel(PermissionLevel),

    /// Domain-value validation error (bounds, parsing).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage substrate error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for Ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
