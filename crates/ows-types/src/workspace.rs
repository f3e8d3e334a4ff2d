use std::fmt;

use serde::Serialize;

use crate::error::{Result, TypeError};
use crate::names::validate_workspace_name;

/// A workspace as named by a client: either a numeric ID or a name.
///
/// Exactly one form is ever present. Both forms are validated on
/// construction, so holding a `WorkspaceIdentifier` means it is well formed,
/// though the workspace may not exist.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceIdentifier {
    Id(u64),
    Name(String),
}

impl WorkspaceIdentifier {
    /// Address a workspace by ID. IDs must be positive.
    pub fn from_id(id: i64) -> Result<Self> {
        if id < 1 {
            return Err(TypeError::NotPositive {
                field: "Workspace id",
            });
        }
        Ok(Self::Id(id as u64))
    }

    /// Address a workspace by name.
    pub fn from_name(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_workspace_name(&name)?;
        Ok(Self::Name(name))
    }

    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Name(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Name(name) => Some(name),
        }
    }

    /// The ID or name, whichever this identifier carries.
    pub fn identifier_string(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Name(name) => name.clone(),
        }
    }

    /// Whether `resolved` is the workspace this identifier names.
    pub fn matches(&self, resolved: &ResolvedWorkspaceId) -> bool {
        match self {
            Self::Id(id) => *id == resolved.id(),
            Self::Name(name) => name == resolved.name(),
        }
    }
}

impl fmt::Display for WorkspaceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// A workspace as it exists in the store.
///
/// Only the store layer creates these, in response to a resolution call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResolvedWorkspaceId {
    id: u64,
    name: String,
    locked: bool,
    deleted: bool,
}

impl ResolvedWorkspaceId {
    pub fn new(id: u64, name: impl Into<String>, locked: bool, deleted: bool) -> Result<Self> {
        if id < 1 {
            return Err(TypeError::NotPositive {
                field: "Workspace id",
            });
        }
        let name = name.into();
        validate_workspace_name(&name)?;
        Ok(Self {
            id,
            name,
            locked,
            deleted,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// The by-ID identifier for this workspace.
    pub fn identifier(&self) -> WorkspaceIdentifier {
        WorkspaceIdentifier::Id(self.id)
    }
}

impl fmt::Display for ResolvedWorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ResolvedWorkspaceId [id={}, name={}, locked={}, deleted={}]",
            self.id, self.name, self.locked, self.deleted
        )
    }
}
