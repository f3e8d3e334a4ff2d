use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A permission level on a workspace.
///
/// Levels form a total order; holding a level implies every lower level.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    #[default]
    None,
    Read,
    Write,
    Admin,
    Owner,
}

impl Permission {
    /// Every level, lowest first.
    pub const ALL: [Permission; 5] = [
        Permission::None,
        Permission::Read,
        Permission::Write,
        Permission::Admin,
        Permission::Owner,
    ];

    /// Numeric level, `0` for NONE through `4` for OWNER.
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Look up a permission by numeric level.
    pub fn from_level(level: u8) -> Option<Self> {
        Self::ALL.get(usize::from(level)).copied()
    }

    /// Wire name of the permission.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Admin => "ADMIN",
            Self::Owner => "OWNER",
        }
    }

    /// The verb used in authorization messages, e.g. "User foo may not
    /// *write to* workspace 3".
    pub fn operation(self) -> &'static str {
        match self {
            Self::None => "no permission required, this should never actually show up anywhere",
            Self::Read => "read",
            Self::Write => "write to",
            Self::Admin => "administrate",
            Self::Owner => "administrate as an owner",
        }
    }

    /// Whether this level grants read access.
    pub fn is_readable(self) -> bool {
        self >= Self::Read
    }

    /// Whether this level may be granted to all users.
    pub fn is_valid_global(self) -> bool {
        self <= Self::Read
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = TypeError;

    /// Accepts the wire names in any case and the single letter API codes
    /// `n`, `r`, `w` and `a`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "none" => Ok(Self::None),
            "r" | "read" => Ok(Self::Read),
            "w" | "write" => Ok(Self::Write),
            "a" | "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            _ => Err(TypeError::UnknownPermission(s.to_string())),
        }
    }
}
