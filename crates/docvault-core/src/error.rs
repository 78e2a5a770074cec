//! Error types for docvault core primitives.

use thiserror::Error;

/// Errors raised while constructing or validating core domain values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("{what} must not be empty")]
    EmptyIdentifier { what: &'static str },

    #[error("{what} exceeds {max} bytes (got {got})")]
    TooLong {
        what: &'static str,
        max: usize,
        got: usize,
    },

    #[error("content hash must be exactly 32 bytes (got {0})")]
    InvalidHashLength(usize),

    #[error("unknown permission level: {0}")]
    UnknownLevel(u8),

    #[error("unknown audit action: {0}")]
    UnknownAction(u8),

    #[error("permission level {0} is not grantable")]
    NotGrantable(crate::level::PermissionLevel),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
