//! # Docvault
//!
//! Access-controlled, versioned document-reference store with a
//! tamper-evident audit trail, scoped under tenant ("business") boundaries.
//!
//! ## Overview
//!
//! - **Businesses**: the top-level ownership scope. One owner, registered
//!   once, never transferred.
//! - **Documents**: versioned metadata referencing off-chain content by a
//!   32-byte hash. Created by the owner, updated by Edit-level principals,
//!   soft-deleted by Admin-level principals.
//! - **Permissions**: graded levels (`None < View < Edit < Admin < Owner`)
//!   granted per (document, principal). The business owner bypasses the
//!   table entirely.
//! - **Audit log**: append-only, per-document, gapless ids starting at 1.
//!   Every successful create/view/edit/share/delete appends exactly one
//!   immutable entry.
//!
//! ## Key Concepts
//!
//! - Authorization precedes mutation; mutation precedes logging.
//! - Failed preconditions leave zero trace: no writes, no audit entry.
//! - Caller identity and the clock arrive per call via [`TxContext`],
//!   supplied by the hosting environment.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docvault::{Ledger, TxContext};
//! use docvault::core::{ContentHash, DocId, DocType, DocumentDraft, PrincipalId, TenantId};
//! use docvault::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("vault.db").unwrap();
//!     let ledger = Ledger::new(store);
//!
//!     let alice = PrincipalId::new("alice").unwrap();
//!     let ctx = TxContext::new(alice, 1);
//!     let tenant = TenantId::new("acme").unwrap();
//!     let doc = DocId::new("d1").unwrap();
//!
//!     ledger.register_business(&ctx, &tenant, "Acme Corp").await.unwrap();
//!     ledger
//!         .add_document(
//!             &ctx,
//!             &tenant,
//!             &doc,
//!             DocumentDraft {
//!                 name: "Q3 contract".into(),
//!                 description: "signed copy".into(),
//!                 content_hash: ContentHash::compute(b"..."),
//!                 doc_type: DocType::new("contract").unwrap(),
//!             },
//!         )
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod error;
pub mod ledger;
pub mod resolver;

// Re-export component crates
pub use docvault_core as core;
pub use docvault_store as store;

// Re-export main types for convenience
pub use error::{LedgerError, Result};
pub use ledger::{Ledger, TxContext};

// Re-export commonly used core types
pub use docvault_core::{
    AuditAction, AuditEntry, BusinessRecord, ContentHash, DocId, DocType, DocumentDraft,
    DocumentRecord, GrantLevel, GrantRecord, PermissionLevel, PrincipalId, TenantId,
};
