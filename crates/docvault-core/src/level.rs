//! Permission levels and their total order.
//!
//! Authorization everywhere reduces to `held >= required` on this order.
//! Owner is never granted through the permission table; it is either implied
//! by business ownership or written as the creator's implicit self-grant.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Graded access level, totally ordered.
///
/// `None(0) < View(1) < Edit(2) < Admin(3) < Owner(4)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum PermissionLevel {
    None = 0,
    View = 1,
    Edit = 2,
    Admin = 3,
    Owner = 4,
}

impl PermissionLevel {
    /// Numeric ordinal of this level.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse from a numeric ordinal.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::View),
            2 => Ok(Self::Edit),
            3 => Ok(Self::Admin),
            4 => Ok(Self::Owner),
            other => Err(CoreError::UnknownLevel(other)),
        }
    }

    /// Whether this level satisfies a required level.
    pub fn satisfies(self, required: PermissionLevel) -> bool {
        self >= required
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::View => "view",
            Self::Edit => "edit",
            Self::Admin => "admin",
            Self::Owner => "owner",
        };
        f.write_str(s)
    }
}

/// The subset of levels assignable through the grant operation.
///
/// `None` would be a stored no-op (revoke deletes instead) and `Owner` is
/// only ever established via business ownership, so neither is constructible
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantLevel {
    View,
    Edit,
    Admin,
}

impl GrantLevel {
    /// Widen back to the full level ordering.
    pub const fn level(self) -> PermissionLevel {
        match self {
            Self::View => PermissionLevel::View,
            Self::Edit => PermissionLevel::Edit,
            Self::Admin => PermissionLevel::Admin,
        }
    }
}

impl TryFrom<PermissionLevel> for GrantLevel {
    type Error = CoreError;

    fn try_from(level: PermissionLevel) -> Result<Self> {
        match level {
            PermissionLevel::View => Ok(Self::View),
            PermissionLevel::Edit => Ok(Self::Edit),
            PermissionLevel::Admin => Ok(Self::Admin),
            other => Err(CoreError::NotGrantable(other)),
        }
    }
}

impl From<GrantLevel> for PermissionLevel {
    fn from(level: GrantLevel) -> Self {
        level.level()
    }
}
