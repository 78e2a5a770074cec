//! # Docvault Store
//!
//! Storage abstraction for docvault. Provides a trait-based interface over
//! the four maps of the system (businesses, documents, grants, audit
//! log/counter) with SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InsertOutcome`] - Result of inserting a keyed record
//!
//! ## Design Notes
//!
//! - **Collision is not an error**: `insert_*` reports an occupied key via
//!   [`InsertOutcome::AlreadyExists`]
//! - **Atomic document edits**: [`Store::mutate_document`] applies the
//!   caller's closure under the store's own synchronization, so concurrent
//!   edits of one document serialize instead of clobbering each other
//! - **Atomic audit append**: the per-document counter read, entry write,
//!   and counter advance happen as one step (one lock acquisition in memory,
//!   one transaction in SQLite)
//! - **Point lookups only**: enumeration is left to an external projection

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{DocumentMutation, InsertOutcome, Store};
