use thiserror::Error;

use crate::permission::Permission;

/// Errors produced when constructing or parsing foundation types.
///
/// Messages are part of the public contract; clients see them verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("{field} cannot be null or the empty string")]
    Empty { field: &'static str },

    #[error("{field} size greater than limit {max}")]
    TooLong { field: &'static str, max: usize },

    #[error("Illegal character in {kind} name {name}: {ch}")]
    IllegalCharacter {
        kind: &'static str,
        name: String,
        ch: char,
    },

    #[error("Object names cannot be integers: {0}")]
    IntegerObjectName(String),

    #[error("Workspace name {0} may only contain one : delimiter")]
    MultipleDelimiters(String),

    #[error("User name missing from {0}")]
    MissingUserName(String),

    #[error("Workspace name missing from {0}")]
    MissingWorkspaceName(String),

    #[error("{field} must be > 0")]
    NotPositive { field: &'static str },

    #[error("{field} {value} exceeds the maximum of {max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        max: u64,
    },

    #[error("All arguments must be > 0")]
    InvalidReference,

    #[error("ref {0} is not an absolute reference")]
    NotAbsoluteReference(String),

    #[error("If a version is specified in a reference limit the object ID and workspace ID must also be specified")]
    LimitVersionWithoutObject,

    #[error("If an object ID is specified in a reference limit the workspace ID must also be specified")]
    LimitObjectWithoutWorkspace,

    #[error("Illegal integer {field} in reference string {reference}: {token}")]
    IllegalLimitInteger {
        field: &'static str,
        reference: String,
        token: String,
    },

    #[error("Illegal reference string, expected no more than 2 separators: {0}")]
    LimitSeparators(String),

    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    #[error("Permissions for workspace {0} have already been set")]
    PermissionsAlreadySet(u64),

    #[error("Illegal global permission: {0}")]
    IllegalGlobalPermission(Permission),

    #[error("Cannot add unreadable workspace")]
    UnreadableWorkspace,

    #[error("anonymous users can't have user specific permissions")]
    AnonymousUserPermission,
}

pub type Result<T> = std::result::Result<T, TypeError>;
