use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, Result};

/// Default ceiling on references examined by a reference lookup.
pub const DEFAULT_MAX_SEARCH_COUNT: usize = 10_000;

/// Configuration for the object resolver.
///
/// Fields missing from a TOML document take their default values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum number of references a reference lookup may examine before
    /// giving up on the remaining targets.
    pub max_search_count: usize,
    /// Treat every existing workspace as readable.
    pub as_admin: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_search_count: DEFAULT_MAX_SEARCH_COUNT,
            as_admin: false,
        }
    }
}

impl ResolverConfig {
    /// Administrative resolution: permissions are not consulted.
    pub fn admin() -> Self {
        Self {
            as_admin: true,
            ..Default::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ResolveError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ResolveError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ResolveError::Config(e.to_string()))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_search_count < 1 {
            return Err(ResolveError::Config(
                "max_search_count must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
