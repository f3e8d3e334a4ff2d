use std::fmt;

use serde::Serialize;

use ows_types::names::validate_object_name;
use ows_types::{Reference, ResolvedWorkspaceId, TypeError};

use crate::address::ObjectSelector;

/// An address whose workspace has been resolved but whose object has not.
///
/// The store maps these to concrete [`Reference`]s, resolving names and
/// "latest version".
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedAddress {
    workspace: ResolvedWorkspaceId,
    object: ObjectSelector,
    version: Option<u32>,
}

impl ResolvedAddress {
    pub fn new(workspace: ResolvedWorkspaceId, object: ObjectSelector, version: Option<u32>) -> Self {
        Self {
            workspace,
            object,
            version,
        }
    }

    /// The address of a concrete reference within its resolved workspace.
    pub fn from_reference(workspace: ResolvedWorkspaceId, reference: &Reference) -> Self {
        Self::new(
            workspace,
            ObjectSelector::Id(reference.object_id()),
            Some(reference.version()),
        )
    }

    pub fn workspace(&self) -> &ResolvedWorkspaceId {
        &self.workspace
    }

    pub fn object(&self) -> &ObjectSelector {
        &self.object
    }

    pub fn name(&self) -> Option<&str> {
        self.object.name()
    }

    pub fn id(&self) -> Option<u64> {
        self.object.id()
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.workspace.id(), self.object)?;
        if let Some(v) = self.version {
            write!(f, "/{v}")?;
        }
        Ok(())
    }
}

/// A fully resolved object version.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedObjectId {
    workspace: ResolvedWorkspaceId,
    reference: Reference,
    name: String,
    deleted: bool,
}

impl ResolvedObjectId {
    pub fn new(
        workspace: ResolvedWorkspaceId,
        id: u64,
        version: u32,
        name: impl Into<String>,
        deleted: bool,
    ) -> Result<Self, TypeError> {
        if id < 1 {
            return Err(TypeError::NotPositive { field: "Object id" });
        }
        if version < 1 {
            return Err(TypeError::NotPositive {
                field: "Object version",
            });
        }
        let reference = Reference::new(workspace.id(), id, version)?;
        let name = name.into();
        validate_object_name(&name)?;
        Ok(Self {
            workspace,
            reference,
            name,
            deleted,
        })
    }

    pub fn workspace(&self) -> &ResolvedWorkspaceId {
        &self.workspace
    }

    pub fn id(&self) -> u64 {
        self.reference.object_id()
    }

    pub fn version(&self) -> u32 {
        self.reference.version()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// The absolute reference of this object version.
    pub fn reference(&self) -> Reference {
        self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rws() -> ResolvedWorkspaceId {
        ResolvedWorkspaceId::new(3, "foo", false, false).unwrap()
    }

    #[test]
    fn resolved_object_reference() {
        let o = ResolvedObjectId::new(rws(), 24, 1, "reads", true).unwrap();
        assert_eq!(o.reference().to_string(), "3/24/1");
        assert_eq!(o.name(), "reads");
        assert!(o.is_deleted());
    }

    #[test]
    fn resolved_object_validation() {
        assert!(ResolvedObjectId::new(rws(), 0, 1, "x", false).is_err());
        assert!(ResolvedObjectId::new(rws(), 1, 0, "x", false).is_err());
        assert!(ResolvedObjectId::new(rws(), 1, 1, "7", false).is_err());
    }

    #[test]
    fn resolved_address_from_reference() {
        let r = Reference::new(3, 24, 1).unwrap();
        let a = ResolvedAddress::from_reference(rws(), &r);
        assert_eq!(a.id(), Some(24));
        assert_eq!(a.version(), Some(1));
        assert_eq!(a.to_string(), "3/24/1");
    }
}
