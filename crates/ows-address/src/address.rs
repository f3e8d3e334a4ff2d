use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use ows_types::names::validate_object_name;
use ows_types::reference::REFERENCE_SEPARATOR;
use ows_types::{Reference, ResolvedWorkspaceId, TypeError, WorkspaceIdentifier};

use crate::error::{AddressError, Result};
use crate::resolved::ResolvedAddress;
use crate::subset::SubsetSelection;

/// How an address names its object within the workspace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectSelector {
    Name(String),
    Id(u64),
}

impl ObjectSelector {
    /// The name or the ID, whichever is present.
    pub fn identifier_string(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Id(id) => id.to_string(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Id(_) => None,
        }
    }

    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Name(_) => None,
            Self::Id(id) => Some(*id),
        }
    }
}

impl fmt::Display for ObjectSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// How the object is reached.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Locator {
    /// The object is read directly; its workspace must be readable.
    #[default]
    Direct,
    /// The object is reached from this address through the listed objects,
    /// each referenced by the one before it. The last entry is the target.
    Path(Vec<Address>),
    /// The object is found by searching up its incoming references for an
    /// object the caller can read.
    Lookup,
}

/// The address of exactly one object in one, possibly unresolved, workspace.
///
/// Built with [`Address::builder`] or parsed from a reference string. An
/// address is immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    workspace: WorkspaceIdentifier,
    object: ObjectSelector,
    version: Option<u32>,
    locator: Locator,
    subset: SubsetSelection,
}

impl Address {
    /// Start building an address in `workspace`.
    pub fn builder(workspace: WorkspaceIdentifier) -> AddressBuilder {
        AddressBuilder {
            workspace,
            name: None,
            id: None,
            version: None,
            locator: Locator::Direct,
            subset: SubsetSelection::EMPTY,
        }
    }

    /// A builder initialised from this address.
    pub fn to_builder(&self) -> AddressBuilder {
        AddressBuilder {
            workspace: self.workspace.clone(),
            name: self.object.name().map(str::to_string),
            id: self.object.id(),
            version: self.version,
            locator: self.locator.clone(),
            subset: self.subset.clone(),
        }
    }

    /// Parse a single `workspace/object[/version]` reference.
    pub fn parse(reference: &str) -> Result<Self> {
        crate::parse::parse_reference(reference, false)
    }

    pub fn workspace(&self) -> &WorkspaceIdentifier {
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

    /// The requested version, or `None` for the latest.
    pub fn version(&self) -> Option<u32> {
        self.version
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn subset(&self) -> &SubsetSelection {
        &self.subset
    }

    /// The object name or ID.
    pub fn identifier_string(&self) -> String {
        self.object.identifier_string()
    }

    /// The workspace name or ID.
    pub fn workspace_identifier_string(&self) -> String {
        self.workspace.identifier_string()
    }

    /// The reference string for this address, `workspace/object[/version]`.
    pub fn reference_string(&self) -> String {
        let mut s = format!(
            "{}{REFERENCE_SEPARATOR}{}",
            self.workspace, self.object
        );
        if let Some(v) = self.version {
            s.push(REFERENCE_SEPARATOR);
            s.push_str(&v.to_string());
        }
        s
    }

    /// Whether both the workspace and the object are addressed by ID.
    pub fn is_absolute(&self) -> bool {
        self.workspace.id().is_some() && self.object.id().is_some()
    }

    /// The absolute reference this address spells out, if it names the
    /// workspace, object and version numerically.
    pub fn to_reference(&self) -> Option<Reference> {
        Reference::new(self.workspace.id()?, self.object.id()?, self.version?).ok()
    }

    pub fn has_ref_path(&self) -> bool {
        matches!(self.locator, Locator::Path(_))
    }

    /// The objects following this one in its reference path. Empty unless
    /// the address has a path.
    pub fn ref_path(&self) -> &[Address] {
        match &self.locator {
            Locator::Path(path) => path,
            _ => &[],
        }
    }

    /// The final object of the reference path.
    pub fn last(&self) -> Result<&Address> {
        self.ref_path().last().ok_or(AddressError::NoReferencePath)
    }

    pub fn is_lookup_required(&self) -> bool {
        matches!(self.locator, Locator::Lookup)
    }

    /// Pair this address with its resolved workspace.
    pub fn resolve_workspace(&self, workspace: ResolvedWorkspaceId) -> ResolvedAddress {
        ResolvedAddress::new(workspace, self.object.clone(), self.version)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference_string())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Staging area for an [`Address`].
///
/// Setting a name clears the ID and vice versa; setting a non-empty
/// reference path clears the lookup flag and setting the lookup flag clears
/// the path.
#[derive(Clone, Debug)]
pub struct AddressBuilder {
    workspace: WorkspaceIdentifier,
    name: Option<String>,
    id: Option<u64>,
    version: Option<u32>,
    locator: Locator,
    subset: SubsetSelection,
}

impl AddressBuilder {
    /// Name the object. `None` leaves the builder unchanged.
    pub fn with_name(self, name: Option<&str>) -> Result<Self> {
        self.with_name_checked(name, false)
    }

    /// Name the object, failing if `exclusive` and an ID is already set.
    pub fn with_name_checked(mut self, name: Option<&str>, exclusive: bool) -> Result<Self> {
        let Some(name) = name else {
            return Ok(self);
        };
        if exclusive && self.id.is_some() {
            return Err(AddressError::NameOrId {
                name: Some(name.to_string()),
                id: self.id,
            });
        }
        validate_object_name(name)?;
        self.name = Some(name.to_string());
        self.id = None;
        Ok(self)
    }

    /// Set the object ID. `None` leaves the builder unchanged.
    pub fn with_id(self, id: Option<i64>) -> Result<Self> {
        self.with_id_checked(id, false)
    }

    /// Set the object ID, failing if `exclusive` and a name is already set.
    pub fn with_id_checked(mut self, id: Option<i64>, exclusive: bool) -> Result<Self> {
        let Some(id) = id else {
            return Ok(self);
        };
        if exclusive && self.name.is_some() {
            return Err(AddressError::NameOrId {
                name: self.name.clone(),
                id: u64::try_from(id).ok(),
            });
        }
        if id < 1 {
            return Err(TypeError::NotPositive { field: "Object id" }.into());
        }
        self.id = Some(id as u64);
        self.name = None;
        Ok(self)
    }

    /// Pin a version. `None` selects the latest.
    pub fn with_version(mut self, version: Option<i64>) -> Result<Self> {
        self.version = match version {
            None => None,
            Some(v) if v < 1 => {
                return Err(TypeError::NotPositive {
                    field: "Object version",
                }
                .into())
            }
            Some(v) => Some(u32::try_from(v).map_err(|_| TypeError::OutOfRange {
                field: "Object version",
                value: v,
                max: u64::from(u32::MAX),
            })?),
        };
        Ok(self)
    }

    /// Set the objects that follow this one in a reference path. An empty
    /// path removes any existing path.
    pub fn with_reference_path(mut self, path: Vec<Address>) -> Self {
        if path.is_empty() {
            if matches!(self.locator, Locator::Path(_)) {
                self.locator = Locator::Direct;
            }
        } else {
            self.locator = Locator::Path(path);
        }
        self
    }

    /// Require a reference graph search for the object.
    pub fn with_lookup_required(mut self, lookup: bool) -> Self {
        if lookup {
            self.locator = Locator::Lookup;
        } else if matches!(self.locator, Locator::Lookup) {
            self.locator = Locator::Direct;
        }
        self
    }

    /// Restrict the data returned for the object. `None` selects the whole
    /// object.
    pub fn with_subset_selection(mut self, subset: Option<SubsetSelection>) -> Self {
        self.subset = subset.unwrap_or_default();
        self
    }

    pub fn build(self) -> Result<Address> {
        let object = match (self.name, self.id) {
            (Some(name), None) => ObjectSelector::Name(name),
            (None, Some(id)) => ObjectSelector::Id(id),
            (name, id) => return Err(AddressError::NameOrId { name, id }),
        };
        Ok(Address {
            workspace: self.workspace,
            object,
            version: self.version,
            locator: self.locator,
            subset: self.subset,
        })
    }
}
