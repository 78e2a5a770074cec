//! # Docvault Testkit
//!
//! Testing utilities for docvault: fixtures with a deterministic clock and
//! proptest generators for domain values.
//!
//! Not intended for production use.

pub mod fixtures;
pub mod generators;

pub use fixtures::{doc, draft, principal, tenant, TestFixture};
