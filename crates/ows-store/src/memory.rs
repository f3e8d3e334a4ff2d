use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use ows_address::{ObjectSelector, ResolvedAddress};
use ows_types::names::{validate_object_name, validate_workspace_name};
use ows_types::{
    listing_order, Permission, PermissionSet, Reference, ResolvedWorkspaceId, User,
    WorkspaceIdentifier,
};

use crate::error::{StoreError, StoreResult};
use crate::listing::{ListObjectsParameters, ObjectInformation};
use crate::traits::{ObjectState, WorkspaceStore};

#[derive(Debug)]
struct ObjectRecord {
    name: String,
    deleted: bool,
    /// Outgoing references of each version; index 0 is version 1.
    versions: Vec<Vec<Reference>>,
}

impl ObjectRecord {
    fn latest_version(&self) -> u32 {
        self.versions.len() as u32
    }

    fn has_version(&self, version: u32) -> bool {
        version >= 1 && version <= self.latest_version()
    }
}

#[derive(Debug)]
struct WorkspaceRecord {
    name: String,
    locked: bool,
    deleted: bool,
    world_readable: bool,
    acl: HashMap<User, Permission>,
    objects: BTreeMap<u64, ObjectRecord>,
    object_names: HashMap<String, u64>,
}

impl WorkspaceRecord {
    fn resolved(&self, id: u64) -> StoreResult<ResolvedWorkspaceId> {
        Ok(ResolvedWorkspaceId::new(id, &self.name, self.locked, self.deleted)?)
    }

    fn user_permission(&self, user: Option<&User>) -> Permission {
        user.and_then(|u| self.acl.get(u).copied())
            .unwrap_or(Permission::None)
    }

    fn global_permission(&self) -> Permission {
        if self.world_readable {
            Permission::Read
        } else {
            Permission::None
        }
    }

    fn object_id(&self, selector: &ObjectSelector) -> Option<u64> {
        match selector {
            ObjectSelector::Id(id) => self.objects.contains_key(id).then_some(*id),
            ObjectSelector::Name(name) => self.object_names.get(name).copied(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    workspaces: BTreeMap<u64, WorkspaceRecord>,
    workspace_names: HashMap<String, u64>,
    incoming: HashMap<Reference, HashSet<Reference>>,
}

impl State {
    fn find(&self, id: &WorkspaceIdentifier) -> Option<(u64, &WorkspaceRecord)> {
        let ws_id = match id {
            WorkspaceIdentifier::Id(ws_id) => *ws_id,
            WorkspaceIdentifier::Name(name) => *self.workspace_names.get(name)?,
        };
        self.workspaces.get(&ws_id).map(|ws| (ws_id, ws))
    }

    fn object(&self, r: &Reference) -> Option<&ObjectRecord> {
        self.workspaces
            .get(&r.workspace_id())?
            .objects
            .get(&r.object_id())
            .filter(|o| o.has_version(r.version()))
    }

    fn workspace_mut(&mut self, id: u64) -> StoreResult<&mut WorkspaceRecord> {
        self.workspaces
            .get_mut(&id)
            .ok_or(StoreError::NoSuchWorkspace {
                identifier: WorkspaceIdentifier::Id(id),
            })
    }
}

/// In-memory workspace store.
///
/// Intended for tests, fixtures and embedding. All state is held behind a
/// `RwLock`; every trait method takes one read lock, so each batch call sees
/// a consistent snapshot.
pub struct InMemoryWorkspaceStore {
    state: RwLock<State>,
}

impl InMemoryWorkspaceStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".into()))
    }

    // ------------------------------------------------------------------
    // Workspaces
    // ------------------------------------------------------------------

    /// Create a workspace owned by `owner`, who receives OWNER permission.
    /// IDs are assigned sequentially from 1.
    pub fn create_workspace(&self, owner: &User, name: &str) -> StoreResult<ResolvedWorkspaceId> {
        validate_workspace_name(name)?;
        let mut state = self.write()?;
        if state.workspace_names.contains_key(name) {
            return Err(StoreError::WorkspaceNameInUse(name.to_string()));
        }
        let id = state.workspaces.keys().next_back().map_or(1, |last| last + 1);
        let record = WorkspaceRecord {
            name: name.to_string(),
            locked: false,
            deleted: false,
            world_readable: false,
            acl: HashMap::from([(owner.clone(), Permission::Owner)]),
            objects: BTreeMap::new(),
            object_names: HashMap::new(),
        };
        let resolved = record.resolved(id)?;
        state.workspaces.insert(id, record);
        state.workspace_names.insert(name.to_string(), id);
        debug!(id, name, owner = %owner, "created workspace");
        Ok(resolved)
    }

    /// Grant `user` a permission on a workspace. NONE revokes.
    pub fn set_permission(&self, workspace_id: u64, user: &User, perm: Permission) -> StoreResult<()> {
        let mut state = self.write()?;
        let ws = state.workspace_mut(workspace_id)?;
        if perm == Permission::None {
            ws.acl.remove(user);
        } else {
            ws.acl.insert(user.clone(), perm);
        }
        Ok(())
    }

    pub fn set_world_readable(&self, workspace_id: u64, readable: bool) -> StoreResult<()> {
        self.write()?.workspace_mut(workspace_id)?.world_readable = readable;
        Ok(())
    }

    pub fn set_locked(&self, workspace_id: u64, locked: bool) -> StoreResult<()> {
        self.write()?.workspace_mut(workspace_id)?.locked = locked;
        Ok(())
    }

    pub fn set_workspace_deleted(&self, workspace_id: u64, deleted: bool) -> StoreResult<()> {
        self.write()?.workspace_mut(workspace_id)?.deleted = deleted;
        Ok(())
    }

    /// The current resolved form of a workspace.
    pub fn resolved_workspace(&self, workspace_id: u64) -> StoreResult<ResolvedWorkspaceId> {
        let state = self.read()?;
        let ws = state
            .workspaces
            .get(&workspace_id)
            .ok_or(StoreError::NoSuchWorkspace {
                identifier: WorkspaceIdentifier::Id(workspace_id),
            })?;
        ws.resolved(workspace_id)
    }

    // ------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------

    /// Save a new version of the object called `name`, creating the object
    /// if needed. Every outgoing reference must name a stored version.
    pub fn save_object(
        &self,
        workspace_id: u64,
        name: &str,
        references: &[Reference],
    ) -> StoreResult<Reference> {
        validate_object_name(name)?;
        let mut guard = self.write()?;
        let state = &mut *guard;

        if let Some(target) = references.iter().find(|r| state.object(r).is_none()) {
            return Err(StoreError::DanglingReference { target: *target });
        }

        let ws = state
            .workspaces
            .get_mut(&workspace_id)
            .ok_or(StoreError::NoSuchWorkspace {
                identifier: WorkspaceIdentifier::Id(workspace_id),
            })?;
        if ws.deleted {
            return Err(StoreError::WorkspaceDeleted {
                identifier: WorkspaceIdentifier::Id(workspace_id),
            });
        }
        let object_id = match ws.object_names.get(name) {
            Some(id) => *id,
            None => {
                let id = ws.objects.keys().next_back().map_or(1, |last| last + 1);
                ws.objects.insert(
                    id,
                    ObjectRecord {
                        name: name.to_string(),
                        deleted: false,
                        versions: Vec::new(),
                    },
                );
                ws.object_names.insert(name.to_string(), id);
                id
            }
        };
        let object = ws
            .objects
            .get_mut(&object_id)
            .ok_or_else(|| StoreError::Corrupt(format!("object index for {name} is stale")))?;
        object.versions.push(references.to_vec());
        let saved = Reference::new(workspace_id, object_id, object.latest_version())?;

        for target in references {
            state.incoming.entry(*target).or_default().insert(saved);
        }
        debug!(reference = %saved, refs = references.len(), "saved object version");
        Ok(saved)
    }

    /// Mark every version of an object deleted or restore it.
    pub fn set_object_deleted(&self, workspace_id: u64, object_id: u64, deleted: bool) -> StoreResult<()> {
        let mut state = self.write()?;
        let object = state
            .workspace_mut(workspace_id)?
            .objects
            .get_mut(&object_id)
            .ok_or(StoreError::NoSuchObject {
                workspace_id,
                object_id,
            })?;
        object.deleted = deleted;
        Ok(())
    }
}

impl Default for InMemoryWorkspaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceStore for InMemoryWorkspaceStore {
    fn resolve_workspaces(
        &self,
        ids: &HashSet<WorkspaceIdentifier>,
        suppress_errors: bool,
    ) -> StoreResult<HashMap<WorkspaceIdentifier, ResolvedWorkspaceId>> {
        let state = self.read()?;
        let mut resolved = HashMap::with_capacity(ids.len());
        for id in ids {
            let Some((ws_id, ws)) = state.find(id) else {
                if suppress_errors {
                    continue;
                }
                return Err(StoreError::NoSuchWorkspace {
                    identifier: id.clone(),
                });
            };
            if ws.deleted && !suppress_errors {
                return Err(StoreError::WorkspaceDeleted {
                    identifier: id.clone(),
                });
            }
            resolved.insert(id.clone(), ws.resolved(ws_id)?);
        }
        debug!(requested = ids.len(), resolved = resolved.len(), "resolved workspaces");
        Ok(resolved)
    }

    fn get_permissions(
        &self,
        user: Option<&User>,
        workspaces: &HashSet<ResolvedWorkspaceId>,
    ) -> StoreResult<PermissionSet> {
        let state = self.read()?;
        let mut builder = PermissionSet::builder(user.cloned(), Default::default());
        for rws in workspaces {
            let (user_perm, global) = state
                .workspaces
                .get(&rws.id())
                .map_or((Permission::None, Permission::None), |ws| {
                    (ws.user_permission(user), ws.global_permission())
                });
            if user_perm == Permission::None && global == Permission::None {
                builder.with_unreadable_workspace(rws.clone())?;
            } else {
                builder.with_workspace(rws.clone(), Some(user_perm), Some(global))?;
            }
        }
        debug!(workspaces = workspaces.len(), "fetched permissions");
        Ok(builder.build())
    }

    fn get_all_permissions(
        &self,
        user: Option<&User>,
        minimum: Permission,
        include_world_readable: bool,
    ) -> StoreResult<PermissionSet> {
        let state = self.read()?;
        let mut builder = PermissionSet::builder(user.cloned(), Default::default());
        for (id, ws) in state.workspaces.iter().filter(|(_, ws)| !ws.deleted) {
            let user_perm = ws.user_permission(user);
            let global = if include_world_readable {
                ws.global_permission()
            } else {
                Permission::None
            };
            let effective = user_perm.max(global);
            if effective == Permission::None || effective < minimum {
                continue;
            }
            builder.with_workspace(ws.resolved(*id)?, Some(user_perm), Some(global))?;
        }
        Ok(builder.build())
    }

    fn get_object_reference(
        &self,
        objects: &HashSet<ResolvedAddress>,
    ) -> StoreResult<HashMap<ResolvedAddress, Reference>> {
        let state = self.read()?;
        let mut refs = HashMap::with_capacity(objects.len());
        for addr in objects {
            let ws_id = addr.workspace().id();
            let Some(ws) = state.workspaces.get(&ws_id) else {
                continue;
            };
            let Some((object_id, object)) = ws
                .object_id(addr.object())
                .and_then(|id| ws.objects.get(&id).map(|o| (id, o)))
            else {
                continue;
            };
            let version = addr.version().unwrap_or_else(|| object.latest_version());
            if object.has_version(version) {
                refs.insert(addr.clone(), Reference::new(ws_id, object_id, version)?);
            }
        }
        debug!(requested = objects.len(), found = refs.len(), "resolved object references");
        Ok(refs)
    }

    fn get_object_states(
        &self,
        refs: &HashSet<Reference>,
    ) -> StoreResult<HashMap<Reference, ObjectState>> {
        let state = self.read()?;
        Ok(refs
            .iter()
            .filter_map(|r| {
                let workspace_deleted = state.workspaces.get(&r.workspace_id())?.deleted;
                state.object(r).map(|o| {
                    (
                        *r,
                        ObjectState {
                            name: o.name.clone(),
                            deleted: o.deleted,
                            workspace_deleted,
                        },
                    )
                })
            })
            .collect())
    }

    fn get_incoming_references(
        &self,
        refs: &HashSet<Reference>,
    ) -> StoreResult<HashMap<Reference, HashSet<Reference>>> {
        let state = self.read()?;
        let incoming: HashMap<Reference, HashSet<Reference>> = refs
            .iter()
            .map(|r| (*r, state.incoming.get(r).cloned().unwrap_or_default()))
            .collect();
        debug!(
            requested = refs.len(),
            edges = incoming.values().map(HashSet::len).sum::<usize>(),
            "fetched incoming references"
        );
        Ok(incoming)
    }

    fn list_objects(&self, params: &ListObjectsParameters) -> StoreResult<Vec<ObjectInformation>> {
        let state = self.read()?;
        let pset = params.permissions();
        let mut rows = Vec::new();
        for rws in pset.workspaces() {
            if !pset.has_permission(rws, Permission::Read) {
                continue;
            }
            let Some(ws) = state.workspaces.get(&rws.id()).filter(|ws| !ws.deleted) else {
                continue;
            };
            for (object_id, object) in &ws.objects {
                if !params.includes(*object_id, object.deleted) {
                    continue;
                }
                let latest = object.latest_version();
                let first = if params.show_all_versions() { 1 } else { latest };
                for version in first..=latest {
                    rows.push(ObjectInformation {
                        reference: Reference::new(rws.id(), *object_id, version)?,
                        name: object.name.clone(),
                        workspace_name: ws.name.clone(),
                        deleted: object.deleted,
                    });
                }
            }
        }
        rows.sort_by(|a, b| listing_order(&a.reference, &b.reference));
        let start_after = params.start_after();
        let page: Vec<ObjectInformation> = rows
            .into_iter()
            .filter(|row| start_after.admits(&row.reference))
            .take(params.limit())
            .collect();
        debug!(rows = page.len(), start_after = %start_after, "listed objects");
        Ok(page)
    }
}

impl std::fmt::Debug for InMemoryWorkspaceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.state.read().map(|s| s.workspaces.len()).unwrap_or(0);
        f.debug_struct("InMemoryWorkspaceStore")
            .field("workspace_count", &count)
            .finish()
    }
}
