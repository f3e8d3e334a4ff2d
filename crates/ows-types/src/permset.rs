use std::collections::HashMap;

use crate::error::{Result, TypeError};
use crate::permission::Permission;
use crate::user::{AllUsers, User};
use crate::workspace::ResolvedWorkspaceId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Grant {
    user: Permission,
    global: Permission,
}

/// A snapshot of one user's permissions over a set of resolved workspaces.
///
/// Each workspace maps to the user's own permission and the permission
/// granted to all users, which is at most READ. Workspaces the user cannot
/// read may still be present so that callers can cache negative results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionSet {
    user: Option<User>,
    global_user: AllUsers,
    grants: HashMap<ResolvedWorkspaceId, Grant>,
}

impl PermissionSet {
    /// Start building a permission set. `None` is the anonymous user.
    pub fn builder(user: Option<User>, global_user: AllUsers) -> PermissionSetBuilder {
        PermissionSetBuilder {
            user,
            global_user,
            grants: HashMap::new(),
        }
    }

    /// The user this set describes, or `None` for anonymous.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn global_user(&self) -> AllUsers {
        self.global_user
    }

    /// The effective permission: the user's permission, raised to READ if
    /// the workspace is world readable. Unknown workspaces have NONE.
    pub fn permission(&self, ws: &ResolvedWorkspaceId) -> Permission {
        self.grants
            .get(ws)
            .map_or(Permission::None, |g| g.user.max(g.global))
    }

    /// The permission granted to this user specifically.
    pub fn user_permission(&self, ws: &ResolvedWorkspaceId) -> Permission {
        self.grants.get(ws).map_or(Permission::None, |g| g.user)
    }

    pub fn is_world_readable(&self, ws: &ResolvedWorkspaceId) -> bool {
        self.grants
            .get(ws)
            .is_some_and(|g| g.global >= Permission::Read)
    }

    /// Whether the effective permission is at least `perm`.
    pub fn has_permission(&self, ws: &ResolvedWorkspaceId, perm: Permission) -> bool {
        self.permission(ws) >= perm
    }

    /// Whether the user specific permission is at least `perm`.
    pub fn has_user_permission(&self, ws: &ResolvedWorkspaceId, perm: Permission) -> bool {
        self.user_permission(ws) >= perm
    }

    pub fn has_workspace(&self, ws: &ResolvedWorkspaceId) -> bool {
        self.grants.contains_key(ws)
    }

    /// Every workspace in the set, readable or not.
    pub fn workspaces(&self) -> impl Iterator<Item = &ResolvedWorkspaceId> {
        self.grants.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }
}

/// Accumulates workspace grants for a [`PermissionSet`].
#[derive(Debug)]
pub struct PermissionSetBuilder {
    user: Option<User>,
    global_user: AllUsers,
    grants: HashMap<ResolvedWorkspaceId, Grant>,
}

impl PermissionSetBuilder {
    /// Record a readable workspace. Missing permissions count as NONE.
    ///
    /// Fails if the workspace was already added, if the global permission is
    /// above READ, if an anonymous user is given a user permission, or if
    /// both permissions are NONE (use
    /// [`with_unreadable_workspace`](Self::with_unreadable_workspace) for those).
    pub fn with_workspace(
        &mut self,
        ws: ResolvedWorkspaceId,
        user_perm: Option<Permission>,
        global_perm: Option<Permission>,
    ) -> Result<&mut Self> {
        self.check_new(&ws)?;
        let user = user_perm.unwrap_or_default();
        let global = global_perm.unwrap_or_default();
        if !global.is_valid_global() {
            return Err(TypeError::IllegalGlobalPermission(global));
        }
        if self.user.is_none() && user != Permission::None {
            return Err(TypeError::AnonymousUserPermission);
        }
        if user == Permission::None && global == Permission::None {
            return Err(TypeError::UnreadableWorkspace);
        }
        self.grants.insert(ws, Grant { user, global });
        Ok(self)
    }

    /// Record a workspace the user cannot read.
    pub fn with_unreadable_workspace(&mut self, ws: ResolvedWorkspaceId) -> Result<&mut Self> {
        self.check_new(&ws)?;
        self.grants.insert(
            ws,
            Grant {
                user: Permission::None,
                global: Permission::None,
            },
        );
        Ok(self)
    }

    pub fn has_workspace(&self, ws: &ResolvedWorkspaceId) -> bool {
        self.grants.contains_key(ws)
    }

    pub fn build(self) -> PermissionSet {
        PermissionSet {
            user: self.user,
            global_user: self.global_user,
            grants: self.grants,
        }
    }

    fn check_new(&self, ws: &ResolvedWorkspaceId) -> Result<()> {
        if self.grants.contains_key(ws) {
            return Err(TypeError::PermissionsAlreadySet(ws.id()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws(id: u64) -> ResolvedWorkspaceId {
        ResolvedWorkspaceId::new(id, format!("ws{id}"), false, false).unwrap()
    }

    fn alice() -> Option<User> {
        Some(User::new("alice").unwrap())
    }

    #[test]
    fn empty_set() {
        let p = PermissionSet::builder(alice(), AllUsers::default()).build();
        assert!(p.is_empty());
        assert_eq!(p.user().map(User::name), Some("alice"));
        assert_eq!(p.permission(&ws(1)), Permission::None);
        assert!(!p.has_workspace(&ws(1)));
        assert!(!p.is_world_readable(&ws(1)));
        assert!(p.has_permission(&ws(1), Permission::None));
        assert!(!p.has_permission(&ws(1), Permission::Read));
    }

    #[test]
    fn effective_permission_combines_user_and_world() {
        let mut b = PermissionSet::builder(alice(), AllUsers::default());
        b.with_workspace(ws(1), Some(Permission::Admin), None)
            .unwrap()
            .with_workspace(ws(2), None, Some(Permission::Read))
            .unwrap()
            .with_workspace(ws(3), Some(Permission::Write), Some(Permission::Read))
            .unwrap()
            .with_unreadable_workspace(ws(4))
            .unwrap();
        assert!(b.has_workspace(&ws(4)));
        let p = b.build();

        assert_eq!(p.len(), 4);
        assert_eq!(p.permission(&ws(1)), Permission::Admin);
        assert_eq!(p.permission(&ws(2)), Permission::Read);
        assert_eq!(p.user_permission(&ws(2)), Permission::None);
        assert!(p.is_world_readable(&ws(2)));
        assert_eq!(p.permission(&ws(3)), Permission::Write);
        assert!(p.has_user_permission(&ws(3), Permission::Write));
        assert!(!p.has_user_permission(&ws(3), Permission::Admin));
        assert_eq!(p.permission(&ws(4)), Permission::None);
        assert!(p.has_workspace(&ws(4)));
    }

    #[test]
    fn duplicate_workspace_rejected_regardless_of_values() {
        let mut b = PermissionSet::builder(alice(), AllUsers::default());
        b.with_workspace(ws(5), Some(Permission::Read), None).unwrap();
        for (u, g) in [
            (Some(Permission::Read), None),
            (None, Some(Permission::Write)),
            (None, None),
        ] {
            let err = b.with_workspace(ws(5), u, g).unwrap_err();
            assert_eq!(err.to_string(), "Permissions for workspace 5 have already been set");
        }
        let err = b.with_unreadable_workspace(ws(5)).unwrap_err();
        assert!(matches!(err, TypeError::PermissionsAlreadySet(5)), "got: {err}");
    }

    #[test]
    fn global_permission_capped_at_read() {
        let mut b = PermissionSet::builder(alice(), AllUsers::default());
        for perm in [Permission::Write, Permission::Admin, Permission::Owner] {
            let err = b.with_workspace(ws(1), None, Some(perm)).unwrap_err();
            assert_eq!(err.to_string(), format!("Illegal global permission: {perm}"));
        }
        assert!(!b.has_workspace(&ws(1)));
    }

    #[test]
    fn anonymous_users_only_see_world_permission() {
        let mut b = PermissionSet::builder(None, AllUsers::default());
        let err = b
            .with_workspace(ws(1), Some(Permission::Read), Some(Permission::Read))
            .unwrap_err();
        assert_eq!(err.to_string(), "anonymous users can't have user specific permissions");
        b.with_workspace(ws(1), None, Some(Permission::Read)).unwrap();
        let p = b.build();
        assert!(p.user().is_none());
        assert_eq!(p.permission(&ws(1)), Permission::Read);
    }

    #[test]
    fn none_none_requires_unreadable_path() {
        let mut b = PermissionSet::builder(alice(), AllUsers::default());
        let err = b
            .with_workspace(ws(1), Some(Permission::None), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot add unreadable workspace");
        b.with_unreadable_workspace(ws(1)).unwrap();
        assert!(b.has_workspace(&ws(1)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_permission() -> impl Strategy<Value = Permission> {
        (0u8..5).prop_map(|l| Permission::from_level(l).unwrap())
    }

    proptest! {
        #[test]
        fn has_permission_matches_lattice(
            grants in prop::collection::vec((arb_permission(), any::<bool>()), 1..10),
            probe in arb_permission(),
        ) {
            let mut b = PermissionSet::builder(Some(User::new("u").unwrap()), AllUsers::default());
            for (i, (user, world)) in grants.iter().enumerate() {
                let rws = ResolvedWorkspaceId::new(i as u64 + 1, format!("w{i}"), false, false).unwrap();
                let global = world.then_some(Permission::Read);
                if *user == Permission::None && !world {
                    b.with_unreadable_workspace(rws).unwrap();
                } else {
                    b.with_workspace(rws, Some(*user), global).unwrap();
                }
            }
            let p = b.build();
            for rws in p.workspaces() {
                prop_assert_eq!(p.has_permission(rws, probe), p.permission(rws) >= probe);
                prop_assert!(p.permission(rws) >= p.user_permission(rws));
            }
        }

        #[test]
        fn world_permission_never_above_read(perm in arb_permission()) {
            let mut b = PermissionSet::builder(Some(User::new("u").unwrap()), AllUsers::default());
            let rws = ResolvedWorkspaceId::new(1, "w", false, false).unwrap();
            let res = b.with_workspace(rws, Some(Permission::Read), Some(perm));
            prop_assert_eq!(res.is_ok(), perm <= Permission::Read);
        }
    }
}
