//! The Ledger: unified API over businesses, documents, permissions, and the
//! audit log.
//!
//! Every public operation follows the same shape: validate arguments, check
//! existence, consult the resolver, mutate, then append exactly one audit
//! entry. A failed precondition returns before any write, so failed
//! operations leave no trace: no audit entry and no consumed
//! log id.

use std::sync::Arc;

use tracing::{debug, warn};

use docvault_core::{
    validate_name, AuditAction, AuditEntry, BusinessRecord, DocId, DocumentDraft, DocumentRecord,
    GrantLevel, GrantRecord, PermissionLevel, PrincipalId, TenantId, MAX_TEXT_LEN,
};
use docvault_store::{InsertOutcome, Store};

use crate::error::{LedgerError, Result};
use crate::resolver;

/// Per-operation transaction context, supplied by the hosting environment.
///
/// The host authenticates the caller and provides the logical clock; the
/// ledger treats both as givens. Making them explicit parameters (rather
/// than ambient state) lets tests simulate arbitrary callers and times.
#[derive(Debug, Clone)]
pub struct TxContext {
    /// The authenticated caller of the current operation.
    pub caller: PrincipalId,
    /// The logical clock value, stable for the duration of the operation.
    pub now: i64,
}

impl TxContext {
    /// Create a new transaction context.
    pub fn new(caller: PrincipalId, now: i64) -> Self {
        Self { caller, now }
    }
}

/// Lifecycle policy: the active flag a document carries after an update.
///
/// An update unconditionally reactivates the document, soft-deleted or not.
/// Carried over from the source design as-is; this function is the single
/// place to change if updates should ever stop reviving deleted documents.
fn active_after_update(_previous: bool) -> bool {
    true
}

/// Clip audit details to the storage bound at a character boundary.
///
/// Details are ledger-composed, so the bound must never fail an otherwise
/// valid operation.
fn clip_details(mut details: String) -> String {
    if details.len() > MAX_TEXT_LEN {
        let mut end = MAX_TEXT_LEN;
        while !details.is_char_boundary(end) {
            end -= 1;
        }
        details.truncate(end);
    }
    details
}

/// The main Ledger struct.
///
/// Generic over the storage backend. All state lives in the store; the
/// ledger itself is stateless and cheap to share.
pub struct Ledger<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Ledger<S> {
    /// Create a new ledger over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────
    // Business registry
    // ─────────────────────────────────────────────────────────────────────

    /// Register a business under `tenant` with the caller as owner.
    ///
    /// The owner is immutable once set; there is no re-registration,
    /// transfer, or deactivation.
    pub async fn register_business(
        &self,
        ctx: &TxContext,
        tenant: &TenantId,
        name: &str,
    ) -> Result<()> {
        validate_name(name)?;

        let record = BusinessRecord {
            owner: ctx.caller.clone(),
            name: name.to_owned(),
            registered_at: ctx.now,
            active: true,
        };

        match self.store.insert_business(tenant, &record).await? {
            InsertOutcome::Inserted => {
                debug!(%tenant, owner = %ctx.caller, "business registered");
                Ok(())
            }
            InsertOutcome::AlreadyExists => Err(LedgerError::BusinessExists(tenant.clone())),
        }
    }

    /// Look up a business record. Pure; never fails on missing keys.
    pub async fn business_info(&self, tenant: &TenantId) -> Result<Option<BusinessRecord>> {
        Ok(self.store.get_business(tenant).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Document lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Create a document under (tenant, doc).
    ///
    /// Creation is owner-only, stricter than the Edit/Admin gates used
    /// elsewhere. On success the caller also receives an explicit Owner
    /// grant row. That row is redundant with the owner bypass, but external
    /// consumers reading the permission table directly depend on seeing it.
    pub async fn add_document(
        &self,
        ctx: &TxContext,
        tenant: &TenantId,
        doc: &DocId,
        draft: DocumentDraft,
    ) -> Result<()> {
        draft.validate()?;

        let business = self
            .store
            .get_business(tenant)
            .await?
            .ok_or_else(|| LedgerError::BusinessNotFound(tenant.clone()))?;

        if business.owner != ctx.caller {
            warn!(%tenant, %doc, caller = %ctx.caller, "document creation denied");
            return Err(LedgerError::NotAuthorized {
                caller: ctx.caller.clone(),
                required: PermissionLevel::Owner,
                tenant: tenant.clone(),
                doc: doc.clone(),
            });
        }

        let record = DocumentRecord {
            name: draft.name,
            description: draft.description,
            content_hash: draft.content_hash,
            doc_type: draft.doc_type,
            created_at: ctx.now,
            updated_at: ctx.now,
            version: 1,
            active: true,
        };

        match self.store.insert_document(tenant, doc, &record).await? {
            InsertOutcome::Inserted => {}
            InsertOutcome::AlreadyExists => {
                return Err(LedgerError::DocumentExists {
                    tenant: tenant.clone(),
                    doc: doc.clone(),
                });
            }
        }

        self.store
            .upsert_grant(
                tenant,
                doc,
                &ctx.caller,
                &GrantRecord {
                    level: PermissionLevel::Owner,
                    granted_by: ctx.caller.clone(),
                    granted_at: ctx.now,
                },
            )
            .await?;

        let log_id = self
            .audit(
                ctx,
                tenant,
                doc,
                AuditAction::Create,
                format!("created \"{}\"", record.name),
            )
            .await?;
        debug!(%tenant, %doc, log_id, "document created");
        Ok(())
    }

    /// Update a document's content fields.
    ///
    /// Requires at least Edit. Preserves the creation time, bumps the
    /// version by exactly 1, and applies the [`active_after_update`]
    /// lifecycle policy.
    pub async fn update_document(
        &self,
        ctx: &TxContext,
        tenant: &TenantId,
        doc: &DocId,
        draft: DocumentDraft,
    ) -> Result<()> {
        draft.validate()?;

        self.get_existing(tenant, doc).await?;
        self.require(ctx, tenant, doc, PermissionLevel::Edit).await?;

        // The read-bump-write runs inside the store as one atomic step, so
        // concurrent updates of the same document serialize and each bump
        // lands. None here means the record vanished after the existence
        // check above; documents are never hard-deleted, so surface it as
        // not-found rather than inventing a record.
        let now = ctx.now;
        let record = self
            .store
            .mutate_document(
                tenant,
                doc,
                Box::new(move |record| {
                    record.name = draft.name;
                    record.description = draft.description;
                    record.content_hash = draft.content_hash;
                    record.doc_type = draft.doc_type;
                    record.updated_at = now;
                    record.version += 1;
                    record.active = active_after_update(record.active);
                }),
            )
            .await?
            .ok_or_else(|| LedgerError::DocumentNotFound {
                tenant: tenant.clone(),
                doc: doc.clone(),
            })?;

        let log_id = self
            .audit(
                ctx,
                tenant,
                doc,
                AuditAction::Edit,
                format!("updated to version {}", record.version),
            )
            .await?;
        debug!(%tenant, %doc, version = record.version, log_id, "document updated");
        Ok(())
    }

    /// Soft-delete a document. Requires at least Admin.
    ///
    /// Only the active flag changes. The record stays readable, keeps its
    /// version, and remains subject to permission checks and audit.
    pub async fn delete_document(
        &self,
        ctx: &TxContext,
        tenant: &TenantId,
        doc: &DocId,
    ) -> Result<()> {
        self.get_existing(tenant, doc).await?;
        self.require(ctx, tenant, doc, PermissionLevel::Admin)
            .await?;

        self.store
            .mutate_document(tenant, doc, Box::new(|record| record.active = false))
            .await?
            .ok_or_else(|| LedgerError::DocumentNotFound {
                tenant: tenant.clone(),
                doc: doc.clone(),
            })?;

        let log_id = self
            .audit(ctx, tenant, doc, AuditAction::Delete, "soft-deleted".into())
            .await?;
        debug!(%tenant, %doc, log_id, "document soft-deleted");
        Ok(())
    }

    /// Record that the caller consulted a document. Requires at least View.
    ///
    /// No data-model side effect beyond the VIEW audit entry; returns the
    /// record that was read. Read denial is [`LedgerError::NoAccess`],
    /// distinct from the write-denial error.
    pub async fn access_document(
        &self,
        ctx: &TxContext,
        tenant: &TenantId,
        doc: &DocId,
    ) -> Result<DocumentRecord> {
        let record = self.get_existing(tenant, doc).await?;

        let allowed = resolver::authorize(
            self.store.as_ref(),
            tenant,
            doc,
            &ctx.caller,
            PermissionLevel::View,
        )
        .await?;
        if !allowed {
            warn!(%tenant, %doc, caller = %ctx.caller, "document access denied");
            return Err(LedgerError::NoAccess {
                caller: ctx.caller.clone(),
                tenant: tenant.clone(),
                doc: doc.clone(),
            });
        }

        self.audit(ctx, tenant, doc, AuditAction::View, "accessed".into())
            .await?;
        Ok(record)
    }

    /// Look up a document record. Pure; never fails on missing keys.
    pub async fn document_info(
        &self,
        tenant: &TenantId,
        doc: &DocId,
    ) -> Result<Option<DocumentRecord>> {
        Ok(self.store.get_document(tenant, doc).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Permissions
    // ─────────────────────────────────────────────────────────────────────

    /// Grant `grantee` a level on a document. Requires at least Admin.
    ///
    /// Only [View, Admin] are grantable: None and Owner fail with
    /// [`LedgerError::InvalidPermissionLevel`] for every caller, the owner
    /// included. Grants overwrite; granting View after Admin downgrades.
    pub async fn grant_permission(
        &self,
        ctx: &TxContext,
        tenant: &TenantId,
        doc: &DocId,
        grantee: &PrincipalId,
        level: PermissionLevel,
    ) -> Result<()> {
        let level = GrantLevel::try_from(level)
            .map_err(|_| LedgerError::InvalidPermissionLevel(level))?;

        self.get_existing(tenant, doc).await?;
        self.require(ctx, tenant, doc, PermissionLevel::Admin)
            .await?;

        self.store
            .upsert_grant(
                tenant,
                doc,
                grantee,
                &GrantRecord {
                    level: level.level(),
                    granted_by: ctx.caller.clone(),
                    granted_at: ctx.now,
                },
            )
            .await?;

        let log_id = self
            .audit(
                ctx,
                tenant,
                doc,
                AuditAction::Share,
                format!("granted {} to {}", level.level(), grantee),
            )
            .await?;
        debug!(%tenant, %doc, %grantee, level = %level.level(), log_id, "permission granted");
        Ok(())
    }

    /// Remove `grantee`'s grant row. Requires at least Admin.
    ///
    /// Idempotent: revoking a principal with no stored grant still succeeds
    /// and still appends a SHARE audit entry.
    pub async fn revoke_permission(
        &self,
        ctx: &TxContext,
        tenant: &TenantId,
        doc: &DocId,
        grantee: &PrincipalId,
    ) -> Result<()> {
        self.get_existing(tenant, doc).await?;
        self.require(ctx, tenant, doc, PermissionLevel::Admin)
            .await?;

        let existed = self.store.remove_grant(tenant, doc, grantee).await?;

        let log_id = self
            .audit(
                ctx,
                tenant,
                doc,
                AuditAction::Share,
                format!("revoked access for {}", grantee),
            )
            .await?;
        debug!(%tenant, %doc, %grantee, existed, log_id, "permission revoked");
        Ok(())
    }

    /// The effective permission level a principal holds on a document.
    ///
    /// Owner for the business owner, else the stored grant level, else
    /// None, also for unknown tenants and documents. Never fails.
    pub async fn user_permission(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        principal: &PrincipalId,
    ) -> Result<PermissionLevel> {
        Ok(resolver::current_level(self.store.as_ref(), tenant, doc, principal).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Audit log
    // ─────────────────────────────────────────────────────────────────────

    /// Point lookup of an audit entry. Id 0 and unassigned ids yield `None`.
    pub async fn audit_log_entry(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        log_id: u64,
    ) -> Result<Option<AuditEntry>> {
        Ok(self.store.get_audit_entry(tenant, doc, log_id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    async fn get_existing(&self, tenant: &TenantId, doc: &DocId) -> Result<DocumentRecord> {
        self.store
            .get_document(tenant, doc)
            .await?
            .ok_or_else(|| LedgerError::DocumentNotFound {
                tenant: tenant.clone(),
                doc: doc.clone(),
            })
    }

    async fn require(
        &self,
        ctx: &TxContext,
        tenant: &TenantId,
        doc: &DocId,
        required: PermissionLevel,
    ) -> Result<()> {
        let allowed =
            resolver::authorize(self.store.as_ref(), tenant, doc, &ctx.caller, required).await?;
        if allowed {
            Ok(())
        } else {
            warn!(%tenant, %doc, caller = %ctx.caller, %required, "operation denied");
            Err(LedgerError::NotAuthorized {
                caller: ctx.caller.clone(),
                required,
                tenant: tenant.clone(),
                doc: doc.clone(),
            })
        }
    }

    /// Append one audit entry via the per-document counter.
    ///
    /// Runs only after the operation's mutation; a store failure here
    /// surfaces as `LedgerError::Store` rather than being dropped.
    async fn audit(
        &self,
        ctx: &TxContext,
        tenant: &TenantId,
        doc: &DocId,
        action: AuditAction,
        details: String,
    ) -> Result<u64> {
        let entry = AuditEntry {
            actor: ctx.caller.clone(),
            action,
            at: ctx.now,
            details: clip_details(details),
        };
        Ok(self.store.append_audit(tenant, doc, &entry).await?)
    }
}
