use ows_types::{Reference, TypeError, WorkspaceIdentifier};

/// Errors from workspace store operations.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// The workspace does not exist.
    #[error("No workspace with {} {} exists", identifier_kind(.identifier), .identifier)]
    NoSuchWorkspace { identifier: WorkspaceIdentifier },

    /// The workspace exists but has been deleted.
    #[error("Workspace {identifier} is deleted")]
    WorkspaceDeleted { identifier: WorkspaceIdentifier },

    /// A workspace name was reused.
    #[error("Workspace name {0} is already in use")]
    WorkspaceNameInUse(String),

    /// The object does not exist in the workspace.
    #[error("No object with id {object_id} exists in workspace {workspace_id}")]
    NoSuchObject { workspace_id: u64, object_id: u64 },

    /// A saved object referenced a version the store does not hold.
    #[error("Object references nonexistent object {target}")]
    DanglingReference { target: Reference },

    /// Stored data failed an internal consistency check.
    #[error("corrupt store data: {0}")]
    Corrupt(String),

    /// The backend could not service the request.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A fixture object listed no versions.
    #[error("Object {object} in workspace {workspace} has no versions")]
    NoVersions { workspace: String, object: String },

    /// Fixture or other input could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Type(#[from] TypeError),
}

fn identifier_kind(identifier: &WorkspaceIdentifier) -> &'static str {
    match identifier {
        WorkspaceIdentifier::Id(_) => "id",
        WorkspaceIdentifier::Name(_) => "name",
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_messages() {
        let e = StoreError::NoSuchWorkspace {
            identifier: WorkspaceIdentifier::Id(3),
        };
        assert_eq!(e.to_string(), "No workspace with id 3 exists");
        let e = StoreError::NoSuchWorkspace {
            identifier: WorkspaceIdentifier::from_name("foo").unwrap(),
        };
        assert_eq!(e.to_string(), "No workspace with name foo exists");
        let e = StoreError::WorkspaceDeleted {
            identifier: WorkspaceIdentifier::Id(3),
        };
        assert_eq!(e.to_string(), "Workspace 3 is deleted");
    }
}
