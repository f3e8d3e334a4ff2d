use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use ows_address::{Address, Locator, ResolvedAddress, ResolvedObjectId};
use ows_perms::compare_permission;
use ows_store::{ObjectState, StoreError, WorkspaceStore};
use ows_types::{Permission, PermissionSet, Reference, ResolvedWorkspaceId, User, WorkspaceIdentifier};

use crate::config::ResolverConfig;
use crate::error::{ResolutionFailure, ResolveError, Result};
use crate::refsearch::{ReadableWorkspaces, ReferenceGraphSearch};

// ----------------------------------------------------------------------
// Results
// ----------------------------------------------------------------------

/// How an address was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResolutionKind {
    /// The object's workspace is readable and the object was read directly.
    Direct,
    /// The object was reached through a chain of references.
    Path,
}

/// A resolved address: the concrete object and the references walked to
/// reach it, ending with the object itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Resolution {
    kind: ResolutionKind,
    object: ResolvedObjectId,
    path: Vec<Reference>,
}

impl Resolution {
    pub fn kind(&self) -> ResolutionKind {
        self.kind
    }

    pub fn object(&self) -> &ResolvedObjectId {
        &self.object
    }

    pub fn path(&self) -> &[Reference] {
        &self.path
    }
}

type Outcome = std::result::Result<Resolution, ResolutionFailure>;

/// The outcome of resolving a batch of addresses.
///
/// Every input address has exactly one outcome: a [`Resolution`] or a
/// [`ResolutionFailure`]. Duplicate input addresses share one outcome.
#[derive(Clone, Debug, Default)]
pub struct ResolutionResult {
    objects: Vec<Address>,
    outcomes: HashMap<Address, Outcome>,
}

impl ResolutionResult {
    /// The distinct input addresses, in input order.
    pub fn objects(&self) -> &[Address] {
        &self.objects
    }

    pub fn resolution(&self, object: &Address) -> Option<&Resolution> {
        self.outcomes.get(object).and_then(|o| o.as_ref().ok())
    }

    pub fn kind(&self, object: &Address) -> Option<ResolutionKind> {
        self.resolution(object).map(Resolution::kind)
    }

    pub fn resolved_object(&self, object: &Address) -> Option<&ResolvedObjectId> {
        self.resolution(object).map(Resolution::object)
    }

    /// The references walked to reach the object, ending with the object.
    pub fn reference_path(&self, object: &Address) -> Option<&[Reference]> {
        self.resolution(object).map(Resolution::path)
    }

    pub fn failure(&self, object: &Address) -> Option<&ResolutionFailure> {
        self.outcomes.get(object).and_then(|o| o.as_ref().err())
    }

    /// Every failure, in input order.
    pub fn failures(&self) -> impl Iterator<Item = &ResolutionFailure> {
        self.objects.iter().filter_map(|o| self.failure(o))
    }

    /// The addresses resolved with `kind`, in input order.
    pub fn resolved_objects(&self, kind: ResolutionKind) -> Vec<(&Address, &ResolvedObjectId)> {
        self.objects
            .iter()
            .filter_map(|o| self.resolution(o).map(|r| (o, r)))
            .filter(|(_, r)| r.kind == kind)
            .map(|(o, r)| (o, &r.object))
            .collect()
    }

    /// Whether every address resolved.
    pub fn is_complete(&self) -> bool {
        self.outcomes.values().all(|o| o.is_ok())
    }
}

// ----------------------------------------------------------------------
// Builder
// ----------------------------------------------------------------------

/// Builds an [`ObjectResolver`].
pub struct ObjectResolverBuilder<'a, S: WorkspaceStore + ?Sized> {
    store: &'a S,
    user: Option<User>,
    objects: Vec<Address>,
    config: ResolverConfig,
}

impl<'a, S: WorkspaceStore + ?Sized> ObjectResolverBuilder<'a, S> {
    pub fn with_object(mut self, object: Address) -> Self {
        self.objects.push(object);
        self
    }

    pub fn with_objects(mut self, objects: impl IntoIterator<Item = Address>) -> Self {
        self.objects.extend(objects);
        self
    }

    /// Skip permission checks. Deleted workspaces and objects still apply.
    pub fn with_as_admin(mut self, as_admin: bool) -> Self {
        self.config.as_admin = as_admin;
        self
    }

    /// Ceiling on references examined by reference lookups.
    pub fn with_max_search_count(mut self, count: usize) -> Self {
        self.config.max_search_count = count;
        self
    }

    pub fn with_config(mut self, config: &ResolverConfig) -> Self {
        self.config = config.clone();
        self
    }

    pub fn build(self) -> Result<ObjectResolver<'a, S>> {
        if self.objects.is_empty() {
            return Err(ResolveError::NoObjects);
        }
        self.config.validate()?;
        let mut seen = HashSet::with_capacity(self.objects.len());
        let objects = self
            .objects
            .into_iter()
            .filter(|o| seen.insert(o.clone()))
            .collect();
        Ok(ObjectResolver {
            store: self.store,
            user: self.user,
            objects,
            config: self.config,
        })
    }

    /// Build the resolver and resolve its objects.
    pub fn resolve(self) -> Result<ResolutionResult> {
        self.build()?.resolve()
    }
}

// ----------------------------------------------------------------------
// Resolver
// ----------------------------------------------------------------------

/// Resolves a batch of addresses for one caller.
///
/// Resolution reads a consistent snapshot of workspaces and permissions at
/// the start of the call. The number of store calls depends on reference
/// path and search depth, never on the number of addresses:
///
/// 1. resolve every workspace named anywhere in the batch,
/// 2. fetch the caller's permissions on them,
/// 3. map every address and path element to a concrete reference,
/// 4. fetch the state of every reference,
/// 5. fetch incoming references for path elements not directly readable,
/// 6. for lookups, fetch the caller's readable workspaces and search the
///    incoming reference graph level by level.
///
/// An object that is deleted, or whose workspace is not readable, is still
/// returned when the address reaches it through references from an object
/// the caller can read.
pub struct ObjectResolver<'a, S: WorkspaceStore + ?Sized> {
    store: &'a S,
    user: Option<User>,
    objects: Vec<Address>,
    config: ResolverConfig,
}

impl<'a, S: WorkspaceStore + ?Sized> ObjectResolver<'a, S> {
    /// Start building a resolver. `None` is the anonymous user.
    pub fn builder(store: &'a S, user: Option<User>) -> ObjectResolverBuilder<'a, S> {
        ObjectResolverBuilder {
            store,
            user,
            objects: Vec::new(),
            config: ResolverConfig::default(),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn objects(&self) -> &[Address] {
        &self.objects
    }

    pub fn is_admin(&self) -> bool {
        self.config.as_admin
    }

    /// Resolve every address. Store failures abort the call; everything
    /// else is reported per address in the result.
    pub fn resolve(&self) -> Result<ResolutionResult> {
        let snapshot = self.snapshot()?;
        let mut outcomes: HashMap<Address, Outcome> = HashMap::with_capacity(self.objects.len());

        // Workspace checks for addresses, resolved workspaces for path
        // elements. Path elements in missing workspaces stay unresolved and
        // break their path later.
        let mut heads: HashMap<&Address, ResolvedAddress> = HashMap::new();
        let mut hops: HashMap<&Address, ResolvedAddress> = HashMap::new();
        for object in &self.objects {
            let head = match object.locator() {
                Locator::Lookup => snapshot
                    .workspaces
                    .get(object.workspace())
                    .cloned()
                    .ok_or_else(|| self.inaccessible(object)),
                Locator::Direct | Locator::Path(_) => snapshot.readable_workspace(object).cloned(),
            };
            match head {
                Ok(rws) => {
                    heads.insert(object, object.resolve_workspace(rws));
                }
                Err(failure) => {
                    outcomes.insert(object.clone(), Err(failure));
                    continue;
                }
            }
            for hop in object.ref_path() {
                if let Some(rws) = snapshot.workspaces.get(hop.workspace()) {
                    hops.insert(hop, hop.resolve_workspace(rws.clone()));
                }
            }
        }

        let addresses: HashSet<ResolvedAddress> = heads.values().chain(hops.values()).cloned().collect();
        let refs = if addresses.is_empty() {
            HashMap::new()
        } else {
            self.store.get_object_reference(&addresses)?
        };
        let all_refs: HashSet<Reference> = refs.values().copied().collect();
        let states = if all_refs.is_empty() {
            HashMap::new()
        } else {
            self.store.get_object_states(&all_refs)?
        };
        let objects = Objects {
            snapshot: &snapshot,
            refs,
            states,
        };

        let edge_targets: HashSet<Reference> = hops
            .values()
            .filter_map(|hop| objects.reference(hop).filter(|r| !objects.directly_readable(hop, r)))
            .collect();
        let incoming = if edge_targets.is_empty() {
            HashMap::new()
        } else {
            self.store.get_incoming_references(&edge_targets)?
        };

        let mut lookups: Vec<(&Address, &ResolvedAddress, Reference)> = Vec::new();
        for (index, object) in self.objects.iter().enumerate() {
            let Some(head) = heads.get(object) else {
                continue;
            };
            let outcome = match object.locator() {
                Locator::Direct => objects.direct(object, head)?,
                Locator::Path(path) => objects.path(index + 1, object, head, path, &hops, &incoming)?,
                Locator::Lookup => match objects.lookup_start(head) {
                    None => Err(self.inaccessible(object)),
                    Some((r, true)) => objects.resolution(ResolutionKind::Path, head, vec![r])?,
                    Some((r, false)) => {
                        lookups.push((object, head, r));
                        continue;
                    }
                },
            };
            outcomes.insert(object.clone(), outcome);
        }

        let searched = lookups.len();
        if !lookups.is_empty() {
            let readable = self.readable_workspaces()?;
            let targets: HashSet<Reference> = lookups.iter().map(|(_, _, r)| *r).collect();
            let found = ReferenceGraphSearch::new(self.store, readable, self.config.max_search_count)
                .search(&targets)?;
            for (object, head, r) in lookups {
                let outcome = match found.path(&r) {
                    Some(path) => objects.resolution(ResolutionKind::Path, head, path.to_vec())?,
                    None if found.limit_reached() => Err(ResolutionFailure::SearchLimitExceeded {
                        object: Box::new(object.clone()),
                    }),
                    None => Err(self.inaccessible(object)),
                };
                outcomes.insert(object.clone(), outcome);
            }
        }

        for failure in outcomes.values().filter_map(|o| o.as_ref().err()) {
            warn!(object = %failure.object(), error = %failure, "object not resolved");
        }
        debug!(
            objects = self.objects.len(),
            resolved = outcomes.values().filter(|o| o.is_ok()).count(),
            searched,
            admin = self.config.as_admin,
            "resolved objects"
        );
        Ok(ResolutionResult {
            objects: self.objects.clone(),
            outcomes,
        })
    }

    fn snapshot(&self) -> Result<Snapshot<'_>> {
        let ids: HashSet<WorkspaceIdentifier> = self
            .objects
            .iter()
            .flat_map(|o| std::iter::once(o).chain(o.ref_path()))
            .map(|o| o.workspace().clone())
            .collect();
        let workspaces = self.store.resolve_workspaces(&ids, true)?;
        let permissions = if self.config.as_admin {
            None
        } else {
            let live: HashSet<ResolvedWorkspaceId> =
                workspaces.values().filter(|w| !w.is_deleted()).cloned().collect();
            Some(self.store.get_permissions(self.user.as_ref(), &live)?)
        };
        Ok(Snapshot {
            user: self.user.as_ref(),
            workspaces,
            permissions,
        })
    }

    fn readable_workspaces(&self) -> Result<ReadableWorkspaces> {
        if self.config.as_admin {
            return Ok(ReadableWorkspaces::All);
        }
        let perms = self
            .store
            .get_all_permissions(self.user.as_ref(), Permission::Read, false)?;
        Ok(ReadableWorkspaces::Only(perms.workspaces().map(ResolvedWorkspaceId::id).collect()))
    }

    fn inaccessible(&self, object: &Address) -> ResolutionFailure {
        ResolutionFailure::Inaccessible {
            object: Box::new(object.clone()),
            user: self.user.clone(),
        }
    }
}

// ----------------------------------------------------------------------
// Per-call state
// ----------------------------------------------------------------------

/// Workspaces and permissions as of the start of the call.
struct Snapshot<'u> {
    user: Option<&'u User>,
    workspaces: HashMap<WorkspaceIdentifier, ResolvedWorkspaceId>,
    /// `None` when resolving as an administrator.
    permissions: Option<PermissionSet>,
}

impl Snapshot<'_> {
    fn is_readable(&self, workspace: &ResolvedWorkspaceId) -> bool {
        !workspace.is_deleted()
            && self
                .permissions
                .as_ref()
                .map_or(true, |p| p.has_permission(workspace, Permission::Read))
    }

    /// Readable through the user's own grant. World access does not count.
    fn is_user_readable(&self, workspace: &ResolvedWorkspaceId) -> bool {
        !workspace.is_deleted()
            && self
                .permissions
                .as_ref()
                .map_or(true, |p| p.has_user_permission(workspace, Permission::Read))
    }

    /// The workspace of an address the caller must be able to read directly.
    fn readable_workspace(&self, object: &Address) -> std::result::Result<&ResolvedWorkspaceId, ResolutionFailure> {
        let wsi = object.workspace();
        let missing = |source| ResolutionFailure::NoSuchWorkspace {
            object: Box::new(object.clone()),
            source,
        };
        let rws = self
            .workspaces
            .get(wsi)
            .ok_or_else(|| missing(StoreError::NoSuchWorkspace { identifier: wsi.clone() }))?;
        if rws.is_deleted() {
            return Err(missing(StoreError::WorkspaceDeleted { identifier: wsi.clone() }));
        }
        if let Some(perms) = &self.permissions {
            compare_permission(
                self.user,
                Permission::Read,
                perms.permission(rws),
                wsi,
                Permission::Read.operation(),
            )
            .map_err(|source| ResolutionFailure::Unauthorized {
                object: Box::new(object.clone()),
                source,
            })?;
        }
        Ok(rws)
    }
}

/// Concrete references and their states for every address in the call.
struct Objects<'s, 'u> {
    snapshot: &'s Snapshot<'u>,
    refs: HashMap<ResolvedAddress, Reference>,
    states: HashMap<Reference, ObjectState>,
}

impl Objects<'_, '_> {
    fn reference(&self, address: &ResolvedAddress) -> Option<Reference> {
        self.refs.get(address).copied()
    }

    fn live(&self, r: &Reference) -> bool {
        self.states.get(r).is_some_and(|s| !s.deleted)
    }

    fn directly_readable(&self, address: &ResolvedAddress, r: &Reference) -> bool {
        self.snapshot.is_readable(address.workspace()) && self.live(r)
    }

    fn resolution(&self, kind: ResolutionKind, target: &ResolvedAddress, path: Vec<Reference>) -> Result<Outcome> {
        let r = path
            .last()
            .copied()
            .ok_or_else(|| StoreError::Corrupt("empty reference path".to_string()))?;
        let state = self
            .states
            .get(&r)
            .ok_or_else(|| StoreError::Corrupt(format!("no state for reference {r}")))?;
        let object = ResolvedObjectId::new(
            target.workspace().clone(),
            r.object_id(),
            r.version(),
            state.name.clone(),
            state.deleted,
        )?;
        Ok(Ok(Resolution { kind, object, path }))
    }

    /// The concrete head of a direct address or reference path. The head
    /// must exist and not be deleted.
    fn head(&self, object: &Address, head: &ResolvedAddress) -> std::result::Result<Reference, ResolutionFailure> {
        let Some(r) = self.reference(head).filter(|r| self.states.contains_key(r)) else {
            return Err(ResolutionFailure::NoSuchObject {
                object: Box::new(object.clone()),
                workspace: head.workspace().clone(),
            });
        };
        if !self.live(&r) {
            return Err(ResolutionFailure::ObjectDeleted {
                object: Box::new(object.clone()),
                workspace: head.workspace().clone(),
            });
        }
        Ok(r)
    }

    fn direct(&self, object: &Address, head: &ResolvedAddress) -> Result<Outcome> {
        match self.head(object, head) {
            Ok(r) => self.resolution(ResolutionKind::Direct, head, vec![r]),
            Err(failure) => Ok(Err(failure)),
        }
    }

    /// Walk a reference path. Each element after the head is accepted when
    /// it is directly readable, or when it is stored and the previous
    /// element references it.
    fn path(
        &self,
        path_index: usize,
        object: &Address,
        head: &ResolvedAddress,
        path: &[Address],
        hops: &HashMap<&Address, ResolvedAddress>,
        incoming: &HashMap<Reference, HashSet<Reference>>,
    ) -> Result<Outcome> {
        let mut previous = match self.head(object, head) {
            Ok(r) => r,
            Err(failure) => return Ok(Err(failure)),
        };
        let mut walked = vec![previous];
        let mut from = object;
        let mut target = head;
        for (position, hop) in path.iter().enumerate() {
            let resolved = hops.get(hop);
            let accepted = resolved.and_then(|ra| {
                let r = self.reference(ra)?;
                if !self.states.contains_key(&r) {
                    return None;
                }
                let edge = incoming.get(&r).is_some_and(|refs| refs.contains(&previous));
                (self.directly_readable(ra, &r) || edge).then_some((ra, r))
            });
            let Some((ra, r)) = accepted else {
                return Ok(Err(ResolutionFailure::BrokenPath {
                    path_index,
                    position: position + 1,
                    start: Box::new(object.clone()),
                    from: Box::new(from.clone()),
                    to: Box::new(hop.clone()),
                }));
            };
            walked.push(r);
            previous = r;
            from = hop;
            target = ra;
        }
        self.resolution(ResolutionKind::Path, target, walked)
    }

    /// The concrete target of a lookup and whether it can be returned
    /// without a search.
    fn lookup_start(&self, head: &ResolvedAddress) -> Option<(Reference, bool)> {
        let r = self.reference(head).filter(|r| self.states.contains_key(r))?;
        Some((r, self.snapshot.is_user_readable(head.workspace()) && self.live(&r)))
    }
}
