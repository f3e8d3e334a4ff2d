use std::collections::{HashMap, HashSet};

use tracing::debug;

use ows_address::{Address, ResolvedAddress};
use ows_store::{StoreError, WorkspaceStore};
use ows_types::{Permission, PermissionSet, ResolvedWorkspaceId, User, WorkspaceIdentifier};

use crate::error::{AuthorizationError, CheckError, Result};

/// Builds permission checkers for one caller against one store.
pub struct PermissionsCheckerFactory<'a, S: WorkspaceStore + ?Sized> {
    store: &'a S,
    user: Option<User>,
}

impl<'a, S: WorkspaceStore + ?Sized> PermissionsCheckerFactory<'a, S> {
    /// `None` is the anonymous user.
    pub fn new(store: &'a S, user: Option<User>) -> Self {
        Self { store, user }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// A checker requiring `perm` on every workspace in `workspaces`.
    pub fn workspace_checker(
        &self,
        workspaces: Vec<WorkspaceIdentifier>,
        perm: Permission,
    ) -> Result<WorkspaceChecker<'a, S>> {
        if workspaces.is_empty() {
            return Err(CheckError::NoWorkspaces);
        }
        Ok(WorkspaceChecker {
            store: self.store,
            user: self.user.clone(),
            workspaces: dedup(workspaces),
            perm,
            operation: perm.operation().to_string(),
        })
    }

    /// A checker requiring `perm` on a single workspace.
    pub fn single_workspace_checker(
        &self,
        workspace: WorkspaceIdentifier,
        perm: Permission,
    ) -> SingleWorkspaceChecker<'a, S> {
        SingleWorkspaceChecker {
            inner: WorkspaceChecker {
                store: self.store,
                user: self.user.clone(),
                workspaces: vec![workspace.clone()],
                perm,
                operation: perm.operation().to_string(),
            },
            workspace,
        }
    }

    /// A checker requiring `perm` on the workspace of every object in
    /// `objects`.
    pub fn object_checker(&self, objects: Vec<Address>, perm: Permission) -> Result<ObjectChecker<'a, S>> {
        if objects.is_empty() {
            return Err(CheckError::NoObjects);
        }
        Ok(ObjectChecker {
            store: self.store,
            user: self.user.clone(),
            objects: dedup(objects),
            perm,
            operation: perm.operation().to_string(),
            suppress_errors: false,
            include_deleted_workspaces: false,
        })
    }

    /// A checker requiring `perm` on the workspace of one object.
    pub fn single_object_checker(&self, object: Address, perm: Permission) -> SingleObjectChecker<'a, S> {
        SingleObjectChecker {
            inner: ObjectChecker {
                store: self.store,
                user: self.user.clone(),
                objects: vec![object.clone()],
                perm,
                operation: perm.operation().to_string(),
                suppress_errors: false,
                include_deleted_workspaces: false,
            },
            object,
        }
    }
}

/// Fail if `perm` is a write-class permission and the workspace is
/// locked. Locked workspaces always permit READ and NONE.
pub fn check_locked(
    perm: Permission,
    workspace: &ResolvedWorkspaceId,
) -> std::result::Result<(), AuthorizationError> {
    if perm > Permission::Read && workspace.is_locked() {
        return Err(AuthorizationError::Locked {
            workspace: workspace.clone(),
        });
    }
    Ok(())
}

/// Fail if `available` is below `required`.
pub fn compare_permission(
    user: Option<&User>,
    required: Permission,
    available: Permission,
    workspace: &WorkspaceIdentifier,
    operation: &str,
) -> std::result::Result<(), AuthorizationError> {
    if available < required {
        return Err(AuthorizationError::InsufficientPermission {
            user: user.cloned(),
            operation: operation.to_string(),
            workspace: workspace.clone(),
            required,
            available,
        });
    }
    Ok(())
}

fn dedup<T: Clone + Eq + std::hash::Hash>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|i| seen.insert(i.clone())).collect()
}

fn validate_operation(operation: &str) -> Result<String> {
    if operation.trim().is_empty() {
        return Err(CheckError::EmptyOperation);
    }
    Ok(operation.to_string())
}

fn permissions_for<S: WorkspaceStore + ?Sized>(
    store: &S,
    user: Option<&User>,
    resolved: &HashMap<WorkspaceIdentifier, ResolvedWorkspaceId>,
) -> Result<PermissionSet> {
    let set: HashSet<ResolvedWorkspaceId> = resolved.values().cloned().collect();
    Ok(store.get_permissions(user, &set)?)
}

// ----------------------------------------------------------------------
// Workspace checkers
// ----------------------------------------------------------------------

/// Checks a permission on a batch of workspaces.
pub struct WorkspaceChecker<'a, S: WorkspaceStore + ?Sized> {
    store: &'a S,
    user: Option<User>,
    workspaces: Vec<WorkspaceIdentifier>,
    perm: Permission,
    operation: String,
}

impl<S: WorkspaceStore + ?Sized> WorkspaceChecker<'_, S> {
    /// Override the verb used in denial messages.
    pub fn with_operation(mut self, operation: &str) -> Result<Self> {
        self.operation = validate_operation(operation)?;
        Ok(self)
    }

    /// Resolve and check every workspace, in input order. Missing or deleted
    /// workspaces fail the check.
    pub fn check(&self) -> Result<HashMap<WorkspaceIdentifier, ResolvedWorkspaceId>> {
        let ids: HashSet<WorkspaceIdentifier> = self.workspaces.iter().cloned().collect();
        let resolved = self.store.resolve_workspaces(&ids, false)?;
        let perms = permissions_for(self.store, self.user.as_ref(), &resolved)?;

        for wsi in &self.workspaces {
            let rws = resolved.get(wsi).ok_or_else(|| StoreError::NoSuchWorkspace {
                identifier: wsi.clone(),
            })?;
            check_locked(self.perm, rws)?;
            compare_permission(
                self.user.as_ref(),
                self.perm,
                perms.permission(rws),
                wsi,
                &self.operation,
            )?;
        }
        debug!(
            workspaces = self.workspaces.len(),
            required = %self.perm,
            "workspace permission check passed"
        );
        Ok(resolved)
    }
}

/// Checks a permission on one workspace.
pub struct SingleWorkspaceChecker<'a, S: WorkspaceStore + ?Sized> {
    inner: WorkspaceChecker<'a, S>,
    workspace: WorkspaceIdentifier,
}

impl<S: WorkspaceStore + ?Sized> SingleWorkspaceChecker<'_, S> {
    pub fn with_operation(mut self, operation: &str) -> Result<Self> {
        self.inner = self.inner.with_operation(operation)?;
        Ok(self)
    }

    pub fn check(&self) -> Result<ResolvedWorkspaceId> {
        let mut resolved = self.inner.check()?;
        resolved.remove(&self.workspace).ok_or_else(|| {
            StoreError::NoSuchWorkspace {
                identifier: self.workspace.clone(),
            }
            .into()
        })
    }
}

// ----------------------------------------------------------------------
// Object checker
// ----------------------------------------------------------------------

/// Checks a permission on the workspaces of a batch of objects.
///
/// Failures are reported per object as
/// [`CheckError::InaccessibleObject`].
pub struct ObjectChecker<'a, S: WorkspaceStore + ?Sized> {
    store: &'a S,
    user: Option<User>,
    objects: Vec<Address>,
    perm: Permission,
    operation: String,
    suppress_errors: bool,
    include_deleted_workspaces: bool,
}

impl<S: WorkspaceStore + ?Sized> ObjectChecker<'_, S> {
    pub fn with_operation(mut self, operation: &str) -> Result<Self> {
        self.operation = validate_operation(operation)?;
        Ok(self)
    }

    /// Omit inaccessible objects from the result instead of failing.
    pub fn with_suppress_errors(mut self, suppress: bool) -> Self {
        self.suppress_errors = suppress;
        self
    }

    /// Accept objects in deleted workspaces.
    pub fn with_include_deleted_workspaces(mut self, include: bool) -> Self {
        self.include_deleted_workspaces = include;
        self
    }

    pub fn check(&self) -> Result<HashMap<Address, ResolvedAddress>> {
        let ids: HashSet<WorkspaceIdentifier> =
            self.objects.iter().map(|o| o.workspace().clone()).collect();
        let resolved = self.store.resolve_workspaces(&ids, true)?;
        let perms = permissions_for(self.store, self.user.as_ref(), &resolved)?;

        let mut out = HashMap::with_capacity(self.objects.len());
        for object in &self.objects {
            match self.check_object(object, &resolved, &perms) {
                Ok(rws) => {
                    out.insert(object.clone(), object.resolve_workspace(rws.clone()));
                }
                Err(_) if self.suppress_errors => {}
                Err(e) => {
                    return Err(CheckError::InaccessibleObject {
                        object: Box::new(object.clone()),
                        source: Box::new(e),
                    })
                }
            }
        }
        debug!(
            objects = self.objects.len(),
            accessible = out.len(),
            required = %self.perm,
            "object permission check finished"
        );
        Ok(out)
    }

    fn check_object<'r>(
        &self,
        object: &Address,
        resolved: &'r HashMap<WorkspaceIdentifier, ResolvedWorkspaceId>,
        perms: &PermissionSet,
    ) -> Result<&'r ResolvedWorkspaceId> {
        let wsi = object.workspace();
        let rws = resolved.get(wsi).ok_or_else(|| StoreError::NoSuchWorkspace {
            identifier: wsi.clone(),
        })?;
        if rws.is_deleted() && !self.include_deleted_workspaces {
            return Err(StoreError::WorkspaceDeleted {
                identifier: wsi.clone(),
            }
            .into());
        }
        check_locked(self.perm, rws)?;
        compare_permission(
            self.user.as_ref(),
            self.perm,
            perms.permission(rws),
            wsi,
            &self.operation,
        )?;
        Ok(rws)
    }
}

/// Checks a permission on the workspace of one object. Objects in deleted
/// workspaces are always refused.
pub struct SingleObjectChecker<'a, S: WorkspaceStore + ?Sized> {
    inner: ObjectChecker<'a, S>,
    object: Address,
}

impl<S: WorkspaceStore + ?Sized> SingleObjectChecker<'_, S> {
    pub fn with_operation(mut self, operation: &str) -> Result<Self> {
        self.inner = self.inner.with_operation(operation)?;
        Ok(self)
    }

    pub fn check(&self) -> Result<ResolvedAddress> {
        let mut resolved = self.inner.check()?;
        resolved.remove(&self.object).ok_or_else(|| {
            StoreError::NoSuchWorkspace {
                identifier: self.object.workspace().clone(),
            }
            .into()
        })
    }
}
