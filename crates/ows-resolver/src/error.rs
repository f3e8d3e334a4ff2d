use std::fmt;

use ows_address::Address;
use ows_perms::AuthorizationError;
use ows_store::StoreError;
use ows_types::{ResolvedWorkspaceId, TypeError, User};

/// Errors that abort a whole resolution call.
///
/// Per-address outcomes are reported as [`ResolutionFailure`]s inside the
/// result instead.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No object identifiers provided")]
    NoObjects,

    #[error("Invalid resolver configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store returned data that does not form a valid identifier.
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Why one address in a batch could not be resolved.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// The address's workspace is missing or deleted.
    #[error("Object {} cannot be accessed: {source}", .object.identifier_string())]
    NoSuchWorkspace {
        object: Box<Address>,
        source: StoreError,
    },

    #[error(
        "No object with {} exists in workspace {} (name {})",
        ObjectLabel(.object),
        .workspace.id(),
        .workspace.name()
    )]
    NoSuchObject {
        object: Box<Address>,
        workspace: ResolvedWorkspaceId,
    },

    #[error(
        "Object {} in workspace {} (name {}) has been deleted",
        .object.identifier_string(),
        .workspace.id(),
        .workspace.name()
    )]
    ObjectDeleted {
        object: Box<Address>,
        workspace: ResolvedWorkspaceId,
    },

    #[error("Object {} cannot be accessed: {source}", .object.identifier_string())]
    Unauthorized {
        object: Box<Address>,
        source: AuthorizationError,
    },

    /// An object in a reference path does not reference the next one.
    ///
    /// `path_index` is the 1-based position of the address in the batch,
    /// `position` the 1-based position of `from` in its path.
    #[error(
        "Reference path #{path_index} starting with object {} {}in workspace {}, position {position}: \
         Object {} {}in workspace {} does not contain a reference to object {} {}in workspace {}",
        .start.identifier_string(),
        VersionLabel(.start),
        .start.workspace_identifier_string(),
        .from.identifier_string(),
        VersionLabel(.from),
        .from.workspace_identifier_string(),
        .to.identifier_string(),
        VersionLabel(.to),
        .to.workspace_identifier_string()
    )]
    BrokenPath {
        path_index: usize,
        position: usize,
        start: Box<Address>,
        from: Box<Address>,
        to: Box<Address>,
    },

    /// A reference lookup found no readable object referencing the target.
    #[error(
        "{}object {} in workspace {} is not accessible to {}",
        LookupVersion(.object.version()),
        .object.identifier_string(),
        .object.workspace_identifier_string(),
        LookupUser(.user.as_ref())
    )]
    Inaccessible {
        object: Box<Address>,
        user: Option<User>,
    },

    #[error("Reached reference search limit")]
    SearchLimitExceeded { object: Box<Address> },
}

impl ResolutionFailure {
    /// The input address this failure belongs to.
    pub fn object(&self) -> &Address {
        match self {
            Self::NoSuchWorkspace { object, .. }
            | Self::NoSuchObject { object, .. }
            | Self::ObjectDeleted { object, .. }
            | Self::Unauthorized { object, .. }
            | Self::Inaccessible { object, .. }
            | Self::SearchLimitExceeded { object } => object,
            Self::BrokenPath { start, .. } => start,
        }
    }

    /// Missing workspace, object, or reference path edge.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoSuchWorkspace { .. }
                | Self::NoSuchObject { .. }
                | Self::ObjectDeleted { .. }
                | Self::BrokenPath { .. }
        )
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::Inaccessible { .. })
    }
}

struct ObjectLabel<'a>(&'a Address);

impl fmt::Display for ObjectLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.0.id(), self.0.name()) {
            (Some(id), _) => write!(f, "id {id}")?,
            (None, Some(name)) => write!(f, "name {name}")?,
            (None, None) => {}
        }
        if let Some(v) = self.0.version() {
            write!(f, " and version {v}")?;
        }
        Ok(())
    }
}

struct VersionLabel<'a>(&'a Address);

impl fmt::Display for VersionLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.version() {
            Some(v) => write!(f, "version {v} "),
            None => Ok(()),
        }
    }
}

struct LookupVersion(Option<u32>);

impl fmt::Display for LookupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "Version {v} of "),
            None => f.write_str("The latest version of "),
        }
    }
}

struct LookupUser<'a>(Option<&'a User>);

impl fmt::Display for LookupUser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(user) => write!(f, "user {user}"),
            None => f.write_str("anonymous users"),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ows_types::WorkspaceIdentifier;

    fn addr(s: &str) -> Box<Address> {
        Box::new(Address::parse(s).unwrap())
    }

    fn ws() -> ResolvedWorkspaceId {
        ResolvedWorkspaceId::new(3, "alice:reads", false, false).unwrap()
    }

    #[test]
    fn no_such_object_messages() {
        let e = ResolutionFailure::NoSuchObject {
            object: addr("3/genome"),
            workspace: ws(),
        };
        assert_eq!(e.to_string(), "No object with name genome exists in workspace 3 (name alice:reads)");
        assert!(e.is_not_found());

        let e = ResolutionFailure::NoSuchObject {
            object: addr("3/24/2"),
            workspace: ws(),
        };
        assert_eq!(
            e.to_string(),
            "No object with id 24 and version 2 exists in workspace 3 (name alice:reads)"
        );
    }

    #[test]
    fn deleted_message() {
        let e = ResolutionFailure::ObjectDeleted {
            object: addr("3/24"),
            workspace: ws(),
        };
        assert_eq!(e.to_string(), "Object 24 in workspace 3 (name alice:reads) has been deleted");
    }

    #[test]
    fn workspace_failure_wraps_store_error() {
        let e = ResolutionFailure::NoSuchWorkspace {
            object: addr("9/24"),
            source: StoreError::NoSuchWorkspace {
                identifier: WorkspaceIdentifier::Id(9),
            },
        };
        assert_eq!(e.to_string(), "Object 24 cannot be accessed: No workspace with id 9 exists");
        assert_eq!(e.object().reference_string(), "9/24");
    }

    #[test]
    fn broken_path_message() {
        let e = ResolutionFailure::BrokenPath {
            path_index: 2,
            position: 1,
            start: addr("3/27/1"),
            from: addr("3/27/1"),
            to: addr("other/24"),
        };
        assert_eq!(
            e.to_string(),
            "Reference path #2 starting with object 27 version 1 in workspace 3, position 1: \
             Object 27 version 1 in workspace 3 does not contain a reference to object 24 in \
             workspace other"
        );
        assert!(e.is_not_found());
        assert!(!e.is_unauthorized());
    }

    #[test]
    fn inaccessible_messages() {
        let e = ResolutionFailure::Inaccessible {
            object: addr("3/24"),
            user: Some(User::new("bob").unwrap()),
        };
        assert_eq!(
            e.to_string(),
            "The latest version of object 24 in workspace 3 is not accessible to user bob"
        );
        assert!(e.is_unauthorized());

        let e = ResolutionFailure::Inaccessible {
            object: addr("3/24/5"),
            user: None,
        };
        assert_eq!(
            e.to_string(),
            "Version 5 of object 24 in workspace 3 is not accessible to anonymous users"
        );
    }

    #[test]
    fn search_limit_message() {
        let e = ResolutionFailure::SearchLimitExceeded { object: addr("3/24") };
        assert_eq!(e.to_string(), "Reached reference search limit");
        assert!(!e.is_not_found());
    }
}
