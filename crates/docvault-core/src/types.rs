//! Strong type definitions for docvault.
//!
//! All identifiers are newtypes to prevent misuse at compile time. Text
//! identifiers are bounded and validated at construction, so a value that
//! exists is always in range.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Maximum length in bytes for tenant, document, principal, and type ids.
pub const MAX_ID_LEN: usize = 64;
/// Maximum length in bytes for display names.
pub const MAX_NAME_LEN: usize = 256;
/// Maximum length in bytes for descriptions and audit details.
pub const MAX_TEXT_LEN: usize = 500;

fn check_text(what: &'static str, value: &str, max: usize) -> Result<()> {
    if value.is_empty() {
        return Err(CoreError::EmptyIdentifier { what });
    }
    if value.len() > max {
        return Err(CoreError::TooLong {
            what,
            max,
            got: value.len(),
        });
    }
    Ok(())
}

/// Validate a display name (empty allowed would make no sense; bounded).
pub fn validate_name(value: &str) -> Result<()> {
    check_text("name", value, MAX_NAME_LEN)
}

/// Validate a description or audit-details string. Empty is allowed.
pub fn validate_text(value: &str) -> Result<()> {
    if value.len() > MAX_TEXT_LEN {
        return Err(CoreError::TooLong {
            what: "text",
            max: MAX_TEXT_LEN,
            got: value.len(),
        });
    }
    Ok(())
}

macro_rules! bounded_id {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier, validating the length bound.
            pub fn new(value: impl Into<String>) -> Result<Self> {
                let value = value.into();
                check_text($label, &value, MAX_ID_LEN)?;
                Ok(Self(value))
            }

            /// Get the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }
    };
}

bounded_id! {
    /// The key of a tenant ("business") scope.
    TenantId, "tenant id"
}

bounded_id! {
    /// A document identifier, unique within its tenant.
    DocId, "document id"
}

bounded_id! {
    /// An externally-authenticated caller identity.
    ///
    /// The hosting environment authenticates principals; docvault only
    /// compares them for equality.
    PrincipalId, "principal"
}

bounded_id! {
    /// A free-form document type tag ("contract", "invoice", ...).
    DocType, "document type"
}

/// A 32-byte opaque reference to off-chain document content.
///
/// The core never verifies this hash against content; it is carried as an
/// opaque value. [`ContentHash::compute`] is a convenience for callers that
/// hash the content themselves.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash arbitrary content bytes with Blake3.
    pub fn compute(content: &[u8]) -> Self {
        Self(*blake3::hash(content).as_bytes())
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> std::result::Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The zero hash (used as a sentinel).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for ContentHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for ContentHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for ContentHash {
    type Error = CoreError;

    fn try_from(slice: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = slice
            .try_into()
            .map_err(|_| CoreError::InvalidHashLength(slice.len()))?;
        Ok(Self(arr))
    }
}
