//! In-memory implementation of the Store trait.
//!
//! Primarily for tests. Same semantics as SQLite but everything lives in
//! ordered maps with no persistence. Each trait call takes the inner lock
//! once, which is what makes the audit append a single atomic step.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use docvault_core::{
    AuditEntry, BusinessRecord, DocId, DocumentRecord, GrantRecord, PrincipalId, TenantId,
};

use crate::error::{Result, StoreError};
use crate::traits::{DocumentMutation, InsertOutcome, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    businesses: BTreeMap<TenantId, BusinessRecord>,
    documents: BTreeMap<(TenantId, DocId), DocumentRecord>,
    grants: BTreeMap<(TenantId, DocId, PrincipalId), GrantRecord>,
    audit_entries: BTreeMap<(TenantId, DocId, u64), AuditEntry>,
    audit_counters: BTreeMap<(TenantId, DocId), u64>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_business(
        &self,
        tenant: &TenantId,
        record: &BusinessRecord,
    ) -> Result<InsertOutcome> {
        let mut inner = self.write()?;
        if inner.businesses.contains_key(tenant) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        inner.businesses.insert(tenant.clone(), record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn get_business(&self, tenant: &TenantId) -> Result<Option<BusinessRecord>> {
        Ok(self.read()?.businesses.get(tenant).cloned())
    }

    async fn insert_document(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        record: &DocumentRecord,
    ) -> Result<InsertOutcome> {
        let mut inner = self.write()?;
        let key = (tenant.clone(), doc.clone());
        if inner.documents.contains_key(&key) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        inner.documents.insert(key, record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn mutate_document(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        mutation: DocumentMutation,
    ) -> Result<Option<DocumentRecord>> {
        // Read, mutate, and write-back under one write guard; a concurrent
        // mutation of the same key cannot interleave.
        let mut inner = self.write()?;
        match inner.documents.get_mut(&(tenant.clone(), doc.clone())) {
            Some(record) => {
                mutation(record);
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn get_document(
        &self,
        tenant: &TenantId,
        doc: &DocId,
    ) -> Result<Option<DocumentRecord>> {
        Ok(self
            .read()?
            .documents
            .get(&(tenant.clone(), doc.clone()))
            .cloned())
    }

    async fn upsert_grant(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        principal: &PrincipalId,
        record: &GrantRecord,
    ) -> Result<()> {
        let mut inner = self.write()?;
        inner.grants.insert(
            (tenant.clone(), doc.clone(), principal.clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn get_grant(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        principal: &PrincipalId,
    ) -> Result<Option<GrantRecord>> {
        Ok(self
            .read()?
            .grants
            .get(&(tenant.clone(), doc.clone(), principal.clone()))
            .cloned())
    }

    async fn remove_grant(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        principal: &PrincipalId,
    ) -> Result<bool> {
        let mut inner = self.write()?;
        Ok(inner
            .grants
            .remove(&(tenant.clone(), doc.clone(), principal.clone()))
            .is_some())
    }

    async fn append_audit(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        entry: &AuditEntry,
    ) -> Result<u64> {
        // Single write-guard acquisition: counter read, entry write, and
        // counter advance cannot interleave with another append.
        let mut inner = self.write()?;
        let counter_key = (tenant.clone(), doc.clone());
        let log_id = *inner.audit_counters.get(&counter_key).unwrap_or(&1);
        inner
            .audit_entries
            .insert((tenant.clone(), doc.clone(), log_id), entry.clone());
        inner.audit_counters.insert(counter_key, log_id + 1);
        Ok(log_id)
    }

    async fn get_audit_entry(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        log_id: u64,
    ) -> Result<Option<AuditEntry>> {
        Ok(self
            .read()?
            .audit_entries
            .get(&(tenant.clone(), doc.clone(), log_id))
            .cloned())
    }

    async fn next_audit_id(&self, tenant: &TenantId, doc: &DocId) -> Result<u64> {
        Ok(*self
            .read()?
            .audit_counters
            .get(&(tenant.clone(), doc.clone()))
            .unwrap_or(&1))
    }
}
