//! Error types for address construction and parsing.

use ows_types::TypeError;
use thiserror::Error;

/// Errors raised while building or parsing an [`Address`](crate::Address).
///
/// These are client input errors: nothing has been looked up yet.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Null or blank input.
    #[error("{what} cannot be null or the empty string")]
    Empty { what: &'static str },

    /// A single reference did not have two or three parts.
    #[error("Illegal number of separators '/' in object reference '{reference}'")]
    Separators { reference: String },

    /// The version part was not an integer.
    #[error("Unable to parse version portion of object reference '{reference}' to an integer")]
    UnparseableVersion { reference: String },

    /// Neither or both of name and ID were supplied.
    #[error(
        "Must provide one and only one of object name (was: {}) or id (was: {})",
        or_null(.name),
        or_null(.id)
    )]
    NameOrId { name: Option<String>, id: Option<u64> },

    #[error("This object identifier has no reference path")]
    NoReferencePath,

    /// A reference was required to use numeric workspace and object IDs.
    #[error("Reference {reference} is not absolute")]
    NotAbsolute { reference: String },

    /// A failure at a 1-based position within a reference path.
    #[error("Reference path position {position}: {source}")]
    PathPosition {
        position: usize,
        source: Box<AddressError>,
    },

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl AddressError {
    pub(crate) fn at_position(self, position: usize) -> Self {
        Self::PathPosition {
            position,
            source: Box::new(self),
        }
    }
}

fn or_null<T: std::fmt::Display>(v: &Option<T>) -> String {
    v.as_ref().map_or_else(|| "null".to_string(), ToString::to_string)
}

pub type Result<T> = std::result::Result<T, AddressError>;
