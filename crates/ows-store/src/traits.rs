use std::collections::{HashMap, HashSet};

use ows_address::ResolvedAddress;
use ows_types::{Permission, PermissionSet, Reference, ResolvedWorkspaceId, User, WorkspaceIdentifier};

use crate::error::StoreResult;
use crate::listing::{ListObjectsParameters, ObjectInformation};

/// Name and deletion state of a stored object version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectState {
    pub name: String,
    pub deleted: bool,
    /// Whether the workspace holding the object is deleted.
    pub workspace_deleted: bool,
}

/// The store collaborator consumed by the permission checker and resolver.
///
/// Every lookup is batched: callers pass a set of keys and receive a map.
/// Keys with no answer are absent from the returned map unless documented
/// otherwise.
///
/// All implementations must satisfy these invariants:
/// - Resolved workspaces and references are only ever produced by the store.
/// - Deleted objects remain resolvable; deletion is reported through
///   [`ObjectState`], never by hiding the object.
/// - Incoming references are verified: every returned edge was recorded when
///   the referencing version was saved, and its target existed at that time.
/// - All I/O errors are propagated, never silently ignored.
pub trait WorkspaceStore: Send + Sync {
    /// Resolve workspace identifiers.
    ///
    /// Without `suppress_errors` a missing or deleted workspace fails the
    /// whole call. With it, missing workspaces are omitted and deleted ones
    /// are returned with their deleted flag set.
    fn resolve_workspaces(
        &self,
        ids: &HashSet<WorkspaceIdentifier>,
        suppress_errors: bool,
    ) -> StoreResult<HashMap<WorkspaceIdentifier, ResolvedWorkspaceId>>;

    /// The user's permissions on each of `workspaces`. Every workspace is
    /// present in the result, readable or not. `None` is the anonymous user.
    fn get_permissions(
        &self,
        user: Option<&User>,
        workspaces: &HashSet<ResolvedWorkspaceId>,
    ) -> StoreResult<PermissionSet>;

    /// Every non-deleted workspace on which the user holds at least
    /// `minimum`, optionally counting world readable workspaces as READ.
    fn get_all_permissions(
        &self,
        user: Option<&User>,
        minimum: Permission,
        include_world_readable: bool,
    ) -> StoreResult<PermissionSet>;

    /// Map addresses to concrete references, resolving names and "latest
    /// version". Addresses naming a missing object or version are omitted.
    fn get_object_reference(
        &self,
        objects: &HashSet<ResolvedAddress>,
    ) -> StoreResult<HashMap<ResolvedAddress, Reference>>;

    /// Name and deletion state of each stored reference.
    fn get_object_states(
        &self,
        refs: &HashSet<Reference>,
    ) -> StoreResult<HashMap<Reference, ObjectState>>;

    /// Whether each reference is stored, deleted or not. Every requested
    /// reference is present in the result.
    ///
    /// Default implementation derives the answer from
    /// [`get_object_states`](Self::get_object_states).
    fn get_object_exists(&self, refs: &HashSet<Reference>) -> StoreResult<HashMap<Reference, bool>> {
        let states = self.get_object_states(refs)?;
        Ok(refs.iter().map(|r| (*r, states.contains_key(r))).collect())
    }

    /// The references that point at each of `refs`. Every requested
    /// reference is present in the result, possibly with an empty set.
    fn get_incoming_references(
        &self,
        refs: &HashSet<Reference>,
    ) -> StoreResult<HashMap<Reference, HashSet<Reference>>>;

    /// List objects in listing order, resuming after the parameters' cursor.
    fn list_objects(&self, params: &ListObjectsParameters) -> StoreResult<Vec<ObjectInformation>>;
}
