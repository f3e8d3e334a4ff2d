//! Start-after cursors for ordered object listings.
//!
//! Listings are sorted by workspace ID ascending, object ID ascending and
//! version descending (newest version of each object first). A [`RefLimit`]
//! names a position in that order; a listing resumed from it returns only
//! the references that sort after it.

use std::cmp::{Ordering, Reverse};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};
use crate::reference::{Reference, REFERENCE_SEPARATOR};

/// The listing order: workspace ascending, object ascending, version
/// descending.
pub fn listing_order(a: &Reference, b: &Reference) -> Ordering {
    order_key(a.workspace_id(), a.object_id(), a.version()).cmp(&order_key(
        b.workspace_id(),
        b.object_id(),
        b.version(),
    ))
}

fn order_key(workspace_id: u64, object_id: u64, version: u32) -> (u64, u64, Reverse<u32>) {
    (workspace_id, object_id, Reverse(version))
}

/// An optional `(workspace, object, version)` triple bounding a listing.
///
/// If a version is present the object and workspace IDs are too; if an
/// object ID is present the workspace ID is too. The empty limit imposes no
/// bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefLimit {
    workspace_id: Option<u64>,
    object_id: Option<u64>,
    version: Option<u32>,
}

impl RefLimit {
    /// The limit that admits everything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a limit. Values less than 1 are treated as absent and versions
    /// above `u32::MAX` are clamped.
    pub fn build(workspace_id: Option<i64>, object_id: Option<i64>, version: Option<i64>) -> Result<Self> {
        let workspace_id = positive(workspace_id);
        let object_id = positive(object_id);
        let version = positive(version).map(|v| u32::try_from(v).unwrap_or(u32::MAX));

        if version.is_some() && (object_id.is_none() || workspace_id.is_none()) {
            return Err(TypeError::LimitVersionWithoutObject);
        }
        if object_id.is_some() && workspace_id.is_none() {
            return Err(TypeError::LimitObjectWithoutWorkspace);
        }
        Ok(Self {
            workspace_id,
            object_id,
            version,
        })
    }

    /// Parse a client supplied `w[/o[/v]]` string.
    ///
    /// Tokens are trimmed, trailing empty segments are ignored and a blank
    /// string yields the empty limit.
    ///
    /// ```
    /// use ows_types::RefLimit;
    ///
    /// let limit = RefLimit::from_ref_string(" 6 / 24 /").unwrap();
    /// assert_eq!(limit, RefLimit::build(Some(6), Some(24), None).unwrap());
    /// assert!(RefLimit::from_ref_string("6/x").is_err());
    /// ```
    pub fn from_ref_string(reference: &str) -> Result<Self> {
        if reference.trim().is_empty() {
            return Ok(Self::empty());
        }
        let mut tokens: Vec<&str> = reference.split(REFERENCE_SEPARATOR).collect();
        while tokens.last().is_some_and(|t| t.is_empty()) {
            tokens.pop();
        }
        if tokens.len() > 3 {
            return Err(TypeError::LimitSeparators(reference.to_string()));
        }

        let parse = |index: usize, field: &'static str| -> Result<Option<i64>> {
            let Some(token) = tokens.get(index) else {
                return Ok(None);
            };
            let token = token.trim();
            token.parse::<i64>().map(Some).map_err(|_| TypeError::IllegalLimitInteger {
                field,
                reference: reference.to_string(),
                token: token.to_string(),
            })
        };
        let workspace_id = parse(0, "workspace ID")?;
        let object_id = parse(1, "object ID")?;
        let version = parse(2, "version")?;
        Self::build(workspace_id, object_id, version)
    }

    pub fn workspace_id(&self) -> Option<u64> {
        self.workspace_id
    }

    pub fn object_id(&self) -> Option<u64> {
        self.object_id
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// Whether the limit bounds anything.
    pub fn is_present(&self) -> bool {
        self.workspace_id.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.is_present()
    }

    /// The limit one step along the listing order: a version above 1 moves
    /// to the next older version, version 1 moves to the next object with
    /// no version bound. Limits without a version are returned unchanged.
    pub fn decrement_version_incrementing_object_id(&self) -> Self {
        match (self.workspace_id, self.object_id, self.version) {
            (Some(ws), Some(obj), Some(ver)) if ver > 1 => Self {
                workspace_id: Some(ws),
                object_id: Some(obj),
                version: Some(ver - 1),
            },
            (Some(ws), Some(obj), Some(_)) => Self {
                workspace_id: Some(ws),
                object_id: Some(obj.saturating_add(1)),
                version: None,
            },
            _ => *self,
        }
    }

    /// Whether `reference` falls after this limit in [`listing_order`].
    ///
    /// A full limit excludes itself. A limit naming only a workspace, or a
    /// workspace and object, starts at the beginning of that workspace or
    /// object.
    pub fn admits(&self, reference: &Reference) -> bool {
        let start = self.decrement_version_incrementing_object_id();
        let Some(ws) = start.workspace_id else {
            return true;
        };
        let key = order_key(ws, start.object_id.unwrap_or(0), start.version.unwrap_or(u32::MAX));
        order_key(reference.workspace_id(), reference.object_id(), reference.version()) >= key
    }
}

fn positive(value: Option<i64>) -> Option<u64> {
    value.filter(|v| *v > 0).map(|v| v as u64)
}

impl fmt::Display for RefLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt<T: fmt::Display>(v: Option<T>) -> String {
            v.map_or_else(|| "null".to_string(), |v| v.to_string())
        }
        write!(
            f,
            "RefLimit [wsid={}, objid={}, ver={}]",
            opt(self.workspace_id),
            opt(self.object_id),
            opt(self.version)
        )
    }
}
