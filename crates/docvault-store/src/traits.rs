//! Store trait: the abstract interface over the four maps of the system.
//!
//! The assumed substrate is an ordered key-value store with atomic
//! single-key read-modify-write. This trait expresses exactly the point
//! operations the ledger needs; there is deliberately no range read or
//! listing. Enumeration belongs to an external projection, not the core.

use async_trait::async_trait;
use docvault_core::{
    AuditEntry, BusinessRecord, DocId, DocumentRecord, GrantRecord, PrincipalId, TenantId,
};

use crate::error::Result;

/// Result of inserting a keyed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The key was free and the record was written.
    Inserted,
    /// The key was already occupied; nothing was written.
    AlreadyExists,
}

impl InsertOutcome {
    /// Whether the record was actually written.
    pub fn inserted(self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }
}

/// An in-place edit of a document record, applied under the store's own
/// synchronization.
pub type DocumentMutation = Box<dyn FnOnce(&mut DocumentRecord) + Send>;

/// The Store trait: async interface over business, document, grant, and
/// audit state.
///
/// All methods are async to support both the in-memory backend and SQLite
/// (which runs behind `spawn_blocking`).
///
/// # Design Notes
///
/// - **Occupied keys are not errors**: `insert_*` reports a collision via
///   [`InsertOutcome`] so callers can map it to a domain error without a
///   separate read racing the write.
/// - **Atomic document edits**: [`Store::mutate_document`] runs the read,
///   the caller's closure, and the write-back as one atomic step per
///   (tenant, document) key. Callers never overwrite a record they read in
///   an earlier call, so concurrent version bumps cannot clobber each
///   other.
/// - **Atomic audit append**: [`Store::append_audit`] reads the per-document
///   counter (default 1), writes the entry under that id, and advances the
///   counter, all as one atomic step per (tenant, document) key. Two
///   concurrent appends for the same document never observe the same id.
/// - **Audit entries are immutable**: there is no update or delete for
///   them, by construction.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────
    // Business registry
    // ─────────────────────────────────────────────────────────────────────

    /// Insert a business if the tenant key is free.
    async fn insert_business(
        &self,
        tenant: &TenantId,
        record: &BusinessRecord,
    ) -> Result<InsertOutcome>;

    /// Point lookup of a business.
    async fn get_business(&self, tenant: &TenantId) -> Result<Option<BusinessRecord>>;

    // ─────────────────────────────────────────────────────────────────────
    // Document store
    // ─────────────────────────────────────────────────────────────────────

    /// Insert a document if the (tenant, doc) key is free.
    async fn insert_document(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        record: &DocumentRecord,
    ) -> Result<InsertOutcome>;

    /// Atomically read, mutate, and write back a document record.
    ///
    /// Returns the post-mutation record, or `None` when the key is absent
    /// (the mutation is then not applied).
    async fn mutate_document(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        mutation: DocumentMutation,
    ) -> Result<Option<DocumentRecord>>;

    /// Point lookup of a document.
    async fn get_document(&self, tenant: &TenantId, doc: &DocId)
        -> Result<Option<DocumentRecord>>;

    // ─────────────────────────────────────────────────────────────────────
    // Permission table
    // ─────────────────────────────────────────────────────────────────────

    /// Insert or overwrite a grant row.
    async fn upsert_grant(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        principal: &PrincipalId,
        record: &GrantRecord,
    ) -> Result<()>;

    /// Point lookup of a grant row.
    async fn get_grant(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        principal: &PrincipalId,
    ) -> Result<Option<GrantRecord>>;

    /// Delete a grant row if present. Returns whether a row existed.
    async fn remove_grant(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        principal: &PrincipalId,
    ) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────
    // Audit log
    // ─────────────────────────────────────────────────────────────────────

    /// Atomically assign the next log id for (tenant, doc), write the entry
    /// under it, and advance the counter. Returns the assigned id.
    async fn append_audit(&self, tenant: &TenantId, doc: &DocId, entry: &AuditEntry)
        -> Result<u64>;

    /// Point lookup of an audit entry. Id 0 is never assigned.
    async fn get_audit_entry(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        log_id: u64,
    ) -> Result<Option<AuditEntry>>;

    /// Peek at the next id the counter would assign (1 if never written).
    /// Read-only; does not advance the counter.
    async fn next_audit_id(&self, tenant: &TenantId, doc: &DocId) -> Result<u64>;
}
