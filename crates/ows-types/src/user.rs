use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};

/// A named workspace user. Anonymous callers are represented as
/// `Option<User>::None` rather than a sentinel user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(String);

impl User {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TypeError::Empty { field: "Username" });
        }
        Ok(Self(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The world pseudo-user through which workspaces are made public.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllUsers {
    symbol: char,
}

impl AllUsers {
    pub const DEFAULT_SYMBOL: char = '*';

    pub fn new(symbol: char) -> Self {
        Self { symbol }
    }

    pub fn symbol(&self) -> char {
        self.symbol
    }
}

impl Default for AllUsers {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SYMBOL)
    }
}

impl fmt::Display for AllUsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_requires_name() {
        assert_eq!(User::new("alice").unwrap().name(), "alice");
        let err = User::new("  ").unwrap_err();
        assert_eq!(err.to_string(), "Username cannot be null or the empty string");
    }

    #[test]
    fn all_users_defaults_to_star() {
        assert_eq!(AllUsers::default().symbol(), '*');
        assert_eq!(AllUsers::default().to_string(), "*");
    }
}
