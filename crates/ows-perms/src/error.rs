use std::fmt;

use ows_address::Address;
use ows_store::StoreError;
use ows_types::{Permission, ResolvedWorkspaceId, User, WorkspaceIdentifier};

/// The caller may not perform an operation on a workspace.
///
/// Always carries the denied workspace so callers need not parse messages.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthorizationError {
    /// A write-class operation targeted a locked workspace.
    #[error(
        "The workspace with id {}, name {}, is locked and may not be modified",
        .workspace.id(),
        .workspace.name()
    )]
    Locked { workspace: ResolvedWorkspaceId },

    /// The caller's permission is below the required permission.
    #[error("{} may not {operation} workspace {workspace}", Actor(.user.as_ref()))]
    InsufficientPermission {
        user: Option<User>,
        operation: String,
        workspace: WorkspaceIdentifier,
        required: Permission,
        available: Permission,
    },
}

impl AuthorizationError {
    /// The workspace access was denied to.
    pub fn workspace(&self) -> WorkspaceIdentifier {
        match self {
            Self::Locked { workspace } => workspace.identifier(),
            Self::InsufficientPermission { workspace, .. } => workspace.clone(),
        }
    }
}

struct Actor<'a>(Option<&'a User>);

impl fmt::Display for Actor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(user) => write!(f, "User {user}"),
            None => f.write_str("Anonymous users"),
        }
    }
}

/// Errors from permission checkers.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CheckError {
    #[error("No workspace identifiers provided")]
    NoWorkspaces,

    #[error("No object identifiers provided")]
    NoObjects,

    #[error("operation cannot be null or the empty string")]
    EmptyOperation,

    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),

    /// An object's workspace was missing, deleted, or not accessible.
    #[error("Object {} cannot be accessed: {source}", .object.identifier_string())]
    InaccessibleObject {
        object: Box<Address>,
        source: Box<CheckError>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CheckError {
    /// The authorization failure behind this error, if any.
    pub fn authorization(&self) -> Option<&AuthorizationError> {
        match self {
            Self::Unauthorized(e) => Some(e),
            Self::InaccessibleObject { source, .. } => source.authorization(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.authorization().is_some()
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
