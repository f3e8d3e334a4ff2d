use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};

/// Separator between the parts of a reference string.
pub const REFERENCE_SEPARATOR: char = '/';

/// An absolute object coordinate: workspace ID, object ID and version.
///
/// All three parts are positive. The canonical string form is `w/o/v`.
/// References order by workspace, then object, then version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference {
    workspace_id: u64,
    object_id: u64,
    version: u32,
}

impl Reference {
    pub fn new(workspace_id: u64, object_id: u64, version: u32) -> Result<Self> {
        if workspace_id < 1 || object_id < 1 || version < 1 {
            return Err(TypeError::InvalidReference);
        }
        Ok(Self {
            workspace_id,
            object_id,
            version,
        })
    }

    pub fn workspace_id(&self) -> u64 {
        self.workspace_id
    }

    pub fn object_id(&self) -> u64 {
        self.object_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.workspace_id,
            self.object_id,
            self.version,
            sep = REFERENCE_SEPARATOR
        )
    }
}

impl FromStr for Reference {
    type Err = TypeError;

    /// Parse an absolute `w/o/v` string. Surrounding whitespace on each part
    /// is ignored.
    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(TypeError::Empty { field: "reference" });
        }
        let not_absolute = || TypeError::NotAbsoluteReference(s.to_string());
        let parts: Vec<&str> = s.split(REFERENCE_SEPARATOR).map(str::trim).collect();
        let [ws, obj, ver] = parts.as_slice() else {
            return Err(not_absolute());
        };
        let ws: u64 = ws.parse().map_err(|_| not_absolute())?;
        let obj: u64 = obj.parse().map_err(|_| not_absolute())?;
        let ver: u32 = ver.parse().map_err(|_| not_absolute())?;
        Self::new(ws, obj, ver).map_err(|_| not_absolute())
    }
}

impl TryFrom<String> for Reference {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Reference> for String {
    fn from(r: Reference) -> Self {
        r.to_string()
    }
}
