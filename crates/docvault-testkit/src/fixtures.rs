//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: an in-memory ledger, a manual
//! clock, and a few named principals.

use std::sync::atomic::{AtomicI64, Ordering};

use docvault::{Ledger, TxContext};
use docvault_core::{ContentHash, DocId, DocType, DocumentDraft, PrincipalId, TenantId};
use docvault_store::MemoryStore;

/// A test fixture with an in-memory ledger and a deterministic clock.
///
/// The clock advances by one tick per issued context, so every operation in
/// a test gets a distinct, reproducible timestamp.
pub struct TestFixture {
    pub ledger: Ledger<MemoryStore>,
    clock: AtomicI64,
}

impl TestFixture {
    /// Create a new fixture starting at clock value 1.
    pub fn new() -> Self {
        Self {
            ledger: Ledger::new(MemoryStore::new()),
            clock: AtomicI64::new(1),
        }
    }

    /// Issue a context for `caller`, advancing the clock.
    pub fn ctx(&self, caller: &str) -> TxContext {
        let now = self.clock.fetch_add(1, Ordering::SeqCst);
        TxContext::new(principal(caller), now)
    }

    /// The clock value the next context will carry.
    pub fn next_tick(&self) -> i64 {
        self.clock.load(Ordering::SeqCst)
    }

    /// Register a business owned by `owner`.
    pub async fn register(&self, tenant: &TenantId, owner: &str) {
        self.ledger
            .register_business(&self.ctx(owner), tenant, "Test Business")
            .await
            .expect("register_business");
    }

    /// Create a document as `owner` with generated content.
    pub async fn create_document(&self, tenant: &TenantId, doc: &DocId, owner: &str) {
        self.ledger
            .add_document(&self.ctx(owner), tenant, doc, draft(doc.as_str()))
            .await
            .expect("add_document");
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand principal constructor for tests.
pub fn principal(name: &str) -> PrincipalId {
    PrincipalId::new(name).expect("valid principal")
}

/// Shorthand tenant constructor for tests.
pub fn tenant(name: &str) -> TenantId {
    TenantId::new(name).expect("valid tenant id")
}

/// Shorthand document-id constructor for tests.
pub fn doc(name: &str) -> DocId {
    DocId::new(name).expect("valid doc id")
}

/// A draft whose content hash is derived from `seed`.
pub fn draft(seed: &str) -> DocumentDraft {
    DocumentDraft {
        name: format!("doc {seed}"),
        description: format!("fixture document for {seed}"),
        content_hash: ContentHash::compute(seed.as_bytes()),
        doc_type: DocType::new("fixture").expect("valid doc type"),
    }
}
