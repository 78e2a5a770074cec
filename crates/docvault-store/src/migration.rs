//! Database schema migrations for SQLite.
//!
//! Simple versioned migration system: each migration transforms the schema
//! from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema (the four maps of the core).
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Business registry: one row per tenant, owner immutable
        CREATE TABLE businesses (
            tenant TEXT PRIMARY KEY,
            owner TEXT NOT NULL,
            name TEXT NOT NULL,
            registered_at INTEGER NOT NULL,
            active INTEGER NOT NULL DEFAULT 1
        );

        -- Document metadata; content itself is off-chain, only the hash here
        CREATE TABLE documents (
            tenant TEXT NOT NULL,
            doc TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            content_hash BLOB NOT NULL,       -- 32 bytes
            doc_type TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            version INTEGER NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,

            PRIMARY KEY (tenant, doc)
        );

        -- Permission grants; a row with level NONE is never stored
        CREATE TABLE permission_grants (
            tenant TEXT NOT NULL,
            doc TEXT NOT NULL,
            principal TEXT NOT NULL,
            level INTEGER NOT NULL,           -- PermissionLevel ordinal
            granted_by TEXT NOT NULL,
            granted_at INTEGER NOT NULL,

            PRIMARY KEY (tenant, doc, principal)
        );

        -- Append-only audit log; rows are never updated or deleted
        CREATE TABLE audit_entries (
            tenant TEXT NOT NULL,
            doc TEXT NOT NULL,
            log_id INTEGER NOT NULL,          -- gapless, starts at 1 per doc
            actor TEXT NOT NULL,
            action INTEGER NOT NULL,          -- AuditAction ordinal
            at INTEGER NOT NULL,
            details TEXT NOT NULL,

            PRIMARY KEY (tenant, doc, log_id)
        );

        -- Next log id per document; advanced in the same transaction that
        -- writes the entry it numbers
        CREATE TABLE audit_counters (
            tenant TEXT NOT NULL,
            doc TEXT NOT NULL,
            next_id INTEGER NOT NULL,

            PRIMARY KEY (tenant, doc)
        );

        CREATE INDEX idx_grants_principal ON permission_grants(principal);
        CREATE INDEX idx_audit_actor ON audit_entries(actor);
        "#,
    )?;

    Ok(())
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
