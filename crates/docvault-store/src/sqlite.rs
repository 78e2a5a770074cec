//! SQLite implementation of the Store trait.
//!
//! The persistent backend. Uses rusqlite with bundled SQLite, wrapped in
//! async via tokio::spawn_blocking. The audit append runs in one SQLite
//! transaction, which gives the counter its atomic read-increment-write.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use docvault_core::{
    AuditAction, AuditEntry, BusinessRecord, ContentHash, DocId, DocType, DocumentRecord,
    GrantRecord, PermissionLevel, PrincipalId, TenantId,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{DocumentMutation, InsertOutcome, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(&path)?;
        migration::migrate(&mut conn)?;
        debug!(path = %path.as_ref().display(), "sqlite store opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking read-only operation on the connection.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }

    /// Run a blocking operation that needs mutable access (transactions).
    async fn with_conn_mut<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }
}

fn bad(e: impl std::fmt::Display) -> StoreError {
    StoreError::InvalidData(e.to_string())
}

fn row_to_business(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, i64, bool)> {
    Ok((
        row.get("owner")?,
        row.get("name")?,
        row.get("registered_at")?,
        row.get("active")?,
    ))
}

fn business_from_parts(parts: (String, String, i64, bool)) -> Result<BusinessRecord> {
    Ok(BusinessRecord {
        owner: PrincipalId::new(parts.0).map_err(bad)?,
        name: parts.1,
        registered_at: parts.2,
        active: parts.3,
    })
}

type DocumentParts = (String, String, Vec<u8>, String, i64, i64, u64, bool);

fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentParts> {
    Ok((
        row.get("name")?,
        row.get("description")?,
        row.get("content_hash")?,
        row.get("doc_type")?,
        row.get("created_at")?,
        row.get("updated_at")?,
        row.get("version")?,
        row.get("active")?,
    ))
}

fn document_from_parts(parts: DocumentParts) -> Result<DocumentRecord> {
    Ok(DocumentRecord {
        name: parts.0,
        description: parts.1,
        content_hash: ContentHash::try_from(parts.2.as_slice()).map_err(bad)?,
        doc_type: DocType::new(parts.3).map_err(bad)?,
        created_at: parts.4,
        updated_at: parts.5,
        version: parts.6,
        active: parts.7,
    })
}

fn row_to_grant(row: &rusqlite::Row<'_>) -> rusqlite::Result<(u8, String, i64)> {
    Ok((
        row.get("level")?,
        row.get("granted_by")?,
        row.get("granted_at")?,
    ))
}

fn grant_from_parts(parts: (u8, String, i64)) -> Result<GrantRecord> {
    Ok(GrantRecord {
        level: PermissionLevel::from_u8(parts.0).map_err(bad)?,
        granted_by: PrincipalId::new(parts.1).map_err(bad)?,
        granted_at: parts.2,
    })
}

fn row_to_audit(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, u8, i64, String)> {
    Ok((
        row.get("actor")?,
        row.get("action")?,
        row.get("at")?,
        row.get("details")?,
    ))
}

fn audit_from_parts(parts: (String, u8, i64, String)) -> Result<AuditEntry> {
    Ok(AuditEntry {
        actor: PrincipalId::new(parts.0).map_err(bad)?,
        action: AuditAction::from_u8(parts.1).map_err(bad)?,
        at: parts.2,
        details: parts.3,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_business(
        &self,
        tenant: &TenantId,
        record: &BusinessRecord,
    ) -> Result<InsertOutcome> {
        let tenant = tenant.clone();
        let record = record.clone();

        self.with_conn(move |conn| {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO businesses (tenant, owner, name, registered_at, active)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    tenant.as_str(),
                    record.owner.as_str(),
                    record.name,
                    record.registered_at,
                    record.active,
                ],
            )?;
            Ok(if changed == 1 {
                InsertOutcome::Inserted
            } else {
                InsertOutcome::AlreadyExists
            })
        })
        .await
    }

    async fn get_business(&self, tenant: &TenantId) -> Result<Option<BusinessRecord>> {
        let tenant = tenant.clone();

        self.with_conn(move |conn| {
            let parts = conn
                .query_row(
                    "SELECT owner, name, registered_at, active
                     FROM businesses WHERE tenant = ?1",
                    params![tenant.as_str()],
                    row_to_business,
                )
                .optional()?;
            parts.map(business_from_parts).transpose()
        })
        .await
    }

    async fn insert_document(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        record: &DocumentRecord,
    ) -> Result<InsertOutcome> {
        let tenant = tenant.clone();
        let doc = doc.clone();
        let record = record.clone();

        self.with_conn(move |conn| {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO documents
                 (tenant, doc, name, description, content_hash, doc_type,
                  created_at, updated_at, version, active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    tenant.as_str(),
                    doc.as_str(),
                    record.name,
                    record.description,
                    record.content_hash.as_bytes().as_slice(),
                    record.doc_type.as_str(),
                    record.created_at,
                    record.updated_at,
                    record.version,
                    record.active,
                ],
            )?;
            Ok(if changed == 1 {
                InsertOutcome::Inserted
            } else {
                InsertOutcome::AlreadyExists
            })
        })
        .await
    }

    async fn mutate_document(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        mutation: DocumentMutation,
    ) -> Result<Option<DocumentRecord>> {
        let tenant = tenant.clone();
        let doc = doc.clone();

        self.with_conn_mut(move |conn| {
            // One transaction: row read, mutation, write-back. A concurrent
            // mutation of the same key sees either all of this or none.
            let tx = conn.transaction()?;

            let parts = tx
                .query_row(
                    "SELECT name, description, content_hash, doc_type,
                            created_at, updated_at, version, active
                     FROM documents WHERE tenant = ?1 AND doc = ?2",
                    params![tenant.as_str(), doc.as_str()],
                    row_to_document,
                )
                .optional()?;
            let mut record = match parts.map(document_from_parts).transpose()? {
                Some(record) => record,
                None => return Ok(None),
            };

            mutation(&mut record);

            tx.execute(
                "UPDATE documents SET
                    name = ?3, description = ?4, content_hash = ?5, doc_type = ?6,
                    created_at = ?7, updated_at = ?8, version = ?9, active = ?10
                 WHERE tenant = ?1 AND doc = ?2",
                params![
                    tenant.as_str(),
                    doc.as_str(),
                    record.name,
                    record.description,
                    record.content_hash.as_bytes().as_slice(),
                    record.doc_type.as_str(),
                    record.created_at,
                    record.updated_at,
                    record.version,
                    record.active,
                ],
            )?;

            tx.commit()?;
            Ok(Some(record))
        })
        .await
    }

    async fn get_document(
        &self,
        tenant: &TenantId,
        doc: &DocId,
    ) -> Result<Option<DocumentRecord>> {
        let tenant = tenant.clone();
        let doc = doc.clone();

        self.with_conn(move |conn| {
            let parts = conn
                .query_row(
                    "SELECT name, description, content_hash, doc_type,
                            created_at, updated_at, version, active
                     FROM documents WHERE tenant = ?1 AND doc = ?2",
                    params![tenant.as_str(), doc.as_str()],
                    row_to_document,
                )
                .optional()?;
            parts.map(document_from_parts).transpose()
        })
        .await
    }

    async fn upsert_grant(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        principal: &PrincipalId,
        record: &GrantRecord,
    ) -> Result<()> {
        let tenant = tenant.clone();
        let doc = doc.clone();
        let principal = principal.clone();
        let record = record.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO permission_grants (tenant, doc, principal, level, granted_by, granted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (tenant, doc, principal) DO UPDATE SET
                    level = excluded.level,
                    granted_by = excluded.granted_by,
                    granted_at = excluded.granted_at",
                params![
                    tenant.as_str(),
                    doc.as_str(),
                    principal.as_str(),
                    record.level.as_u8(),
                    record.granted_by.as_str(),
                    record.granted_at,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_grant(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        principal: &PrincipalId,
    ) -> Result<Option<GrantRecord>> {
        let tenant = tenant.clone();
        let doc = doc.clone();
        let principal = principal.clone();

        self.with_conn(move |conn| {
            let parts = conn
                .query_row(
                    "SELECT level, granted_by, granted_at
                     FROM permission_grants
                     WHERE tenant = ?1 AND doc = ?2 AND principal = ?3",
                    params![tenant.as_str(), doc.as_str(), principal.as_str()],
                    row_to_grant,
                )
                .optional()?;
            parts.map(grant_from_parts).transpose()
        })
        .await
    }

    async fn remove_grant(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        principal: &PrincipalId,
    ) -> Result<bool> {
        let tenant = tenant.clone();
        let doc = doc.clone();
        let principal = principal.clone();

        self.with_conn(move |conn| {
            let changed = conn.execute(
                "DELETE FROM permission_grants
                 WHERE tenant = ?1 AND doc = ?2 AND principal = ?3",
                params![tenant.as_str(), doc.as_str(), principal.as_str()],
            )?;
            Ok(changed == 1)
        })
        .await
    }

    async fn append_audit(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        entry: &AuditEntry,
    ) -> Result<u64> {
        let tenant = tenant.clone();
        let doc = doc.clone();
        let entry = entry.clone();

        self.with_conn_mut(move |conn| {
            // One transaction: counter read, entry insert, counter advance.
            let tx = conn.transaction()?;

            let log_id: u64 = tx
                .query_row(
                    "SELECT next_id FROM audit_counters WHERE tenant = ?1 AND doc = ?2",
                    params![tenant.as_str(), doc.as_str()],
                    |row| row.get(0),
                )
                .optional()?
                .unwrap_or(1);

            tx.execute(
                "INSERT INTO audit_entries (tenant, doc, log_id, actor, action, at, details)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    tenant.as_str(),
                    doc.as_str(),
                    log_id,
                    entry.actor.as_str(),
                    entry.action.as_u8(),
                    entry.at,
                    entry.details,
                ],
            )?;

            tx.execute(
                "INSERT INTO audit_counters (tenant, doc, next_id) VALUES (?1, ?2, ?3)
                 ON CONFLICT (tenant, doc) DO UPDATE SET next_id = excluded.next_id",
                params![tenant.as_str(), doc.as_str(), log_id + 1],
            )?;

            tx.commit()?;
            Ok(log_id)
        })
        .await
    }

    async fn get_audit_entry(
        &self,
        tenant: &TenantId,
        doc: &DocId,
        log_id: u64,
    ) -> Result<Option<AuditEntry>> {
        let tenant = tenant.clone();
        let doc = doc.clone();

        self.with_conn(move |conn| {
            let parts = conn
                .query_row(
                    "SELECT actor, action, at, details
                     FROM audit_entries
                     WHERE tenant = ?1 AND doc = ?2 AND log_id = ?3",
                    params![tenant.as_str(), doc.as_str(), log_id],
                    row_to_audit,
                )
                .optional()?;
            parts.map(audit_from_parts).transpose()
        })
        .await
    }

    async fn next_audit_id(&self, tenant: &TenantId, doc: &DocId) -> Result<u64> {
        let tenant = tenant.clone();
        let doc = doc.clone();

        self.with_conn(move |conn| {
            let next: Option<u64> = conn
                .query_row(
                    "SELECT next_id FROM audit_counters WHERE tenant = ?1 AND doc = ?2",
                    params![tenant.as_str(), doc.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(next.unwrap_or(1))
        })
        .await
    }
}
