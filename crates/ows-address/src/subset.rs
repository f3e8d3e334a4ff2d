use serde::{Deserialize, Serialize};

/// Selects part of an object's data by JSON pointer-like paths.
///
/// An empty selection means the whole object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubsetSelection {
    paths: Vec<String>,
    strict_maps: bool,
    strict_arrays: bool,
}

impl SubsetSelection {
    pub const STRICT_MAPS_DEFAULT: bool = false;
    pub const STRICT_ARRAYS_DEFAULT: bool = true;

    /// The selection of the whole object.
    pub const EMPTY: SubsetSelection = SubsetSelection {
        paths: Vec::new(),
        strict_maps: Self::STRICT_MAPS_DEFAULT,
        strict_arrays: Self::STRICT_ARRAYS_DEFAULT,
    };

    pub fn new(paths: Vec<String>, strict_maps: bool, strict_arrays: bool) -> Self {
        Self {
            paths,
            strict_maps,
            strict_arrays,
        }
    }

    /// A selection with default strictness.
    pub fn from_paths(paths: Vec<String>) -> Self {
        Self::new(paths, Self::STRICT_MAPS_DEFAULT, Self::STRICT_ARRAYS_DEFAULT)
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether selecting a missing map key is an error.
    pub fn is_strict_maps(&self) -> bool {
        self.strict_maps
    }

    /// Whether selecting a missing array index is an error.
    pub fn is_strict_arrays(&self) -> bool {
        self.strict_arrays
    }

    /// Split the path at `index` into unescaped segments. Leading and
    /// trailing `/` are ignored; `~1` decodes to `/` and `~0` to `~`.
    pub fn path_segments(&self, index: usize) -> Option<Vec<String>> {
        let path = self.paths.get(index)?;
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.strip_suffix('/').unwrap_or(path);
        Some(
            path.split('/')
                .map(|seg| seg.replace("~1", "/").replace("~0", "~"))
                .collect(),
        )
    }
}

impl Default for SubsetSelection {
    fn default() -> Self {
        Self::EMPTY
    }
}
