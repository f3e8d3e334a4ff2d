//! JSON descriptions of store contents.
//!
//! Workspaces receive IDs in the order they are listed, starting at 1, and
//! objects receive IDs in order within their workspace. Object versions may
//! reference any version saved before them. Every object needs at least one
//! version.
//!
//! ```json
//! {
//!   "workspaces": [
//!     {
//!       "name": "genomes",
//!       "owner": "alice",
//!       "permissions": { "bob": "READ" },
//!       "objects": [
//!         { "name": "contigs", "versions": [ { "references": [] } ] }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use ows_types::{Permission, Reference, User};

use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryWorkspaceStore;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreFixture {
    #[serde(default)]
    pub workspaces: Vec<WorkspaceFixture>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceFixture {
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub world_readable: bool,
    #[serde(default)]
    pub permissions: BTreeMap<String, Permission>,
    #[serde(default)]
    pub objects: Vec<ObjectFixture>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectFixture {
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub versions: Vec<VersionFixture>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionFixture {
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl StoreFixture {
    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a fixture from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Build an in-memory store holding the fixture's contents.
    pub fn into_store(self) -> StoreResult<InMemoryWorkspaceStore> {
        let store = InMemoryWorkspaceStore::new();
        let mut saved = 0usize;
        for ws in self.workspaces {
            let rws = store.create_workspace(&User::new(ws.owner)?, &ws.name)?;
            for (user, perm) in ws.permissions {
                store.set_permission(rws.id(), &User::new(user)?, perm)?;
            }
            for object in ws.objects {
                if object.versions.is_empty() {
                    return Err(StoreError::NoVersions {
                        workspace: ws.name,
                        object: object.name,
                    });
                }
                let mut last = None;
                for version in &object.versions {
                    last = Some(store.save_object(rws.id(), &object.name, &version.references)?);
                    saved += 1;
                }
                if let Some(r) = last.filter(|_| object.deleted) {
                    store.set_object_deleted(rws.id(), r.object_id(), true)?;
                }
            }
            store.set_world_readable(rws.id(), ws.world_readable)?;
            store.set_locked(rws.id(), ws.locked)?;
            store.set_workspace_deleted(rws.id(), ws.deleted)?;
        }
        info!(versions = saved, "loaded store fixture");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::WorkspaceStore;
    use std::collections::HashSet;
    use std::io::Write;

    const FIXTURE: &str = r#"{
        "workspaces": [
            {
                "name": "shared",
                "owner": "alice",
                "permissions": { "bob": "READ" },
                "objects": [
                    { "name": "target", "deleted": true, "versions": [ {} ] },
                    { "name": "holder", "versions": [ { "references": ["1/1/1"] } ] }
                ]
            },
            { "name": "private", "owner": "carol", "world_readable": true, "locked": true }
        ]
    }"#;

    #[test]
    fn loads_workspaces_and_objects() {
        let store = StoreFixture::from_json(FIXTURE).unwrap().into_store().unwrap();
        let ws1 = store.resolved_workspace(1).unwrap();
        let ws2 = store.resolved_workspace(2).unwrap();
        assert_eq!(ws1.name(), "shared");
        assert!(ws2.is_locked());

        let bob = User::new("bob").unwrap();
        let p = store
            .get_permissions(Some(&bob), &HashSet::from([ws1.clone(), ws2.clone()]))
            .unwrap();
        assert_eq!(p.permission(&ws1), Permission::Read);
        assert!(p.is_world_readable(&ws2));

        let target = Reference::new(1, 1, 1).unwrap();
        let states = store.get_object_states(&HashSet::from([target])).unwrap();
        assert!(states[&target].deleted);
        let incoming = store.get_incoming_references(&HashSet::from([target])).unwrap();
        assert_eq!(incoming[&target], HashSet::from([Reference::new(1, 2, 1).unwrap()]));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();
        let fixture = StoreFixture::load(file.path()).unwrap();
        assert_eq!(fixture.workspaces.len(), 2);
        assert_eq!(fixture.workspaces[0].permissions["bob"], Permission::Read);
    }

    #[test]
    fn rejects_bad_fixtures() {
        let err = StoreFixture::from_json("{\"workspaces\": 3}").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)), "got: {err}");

        let dangling = r#"{"workspaces":[{"name":"w","owner":"o","objects":[
            {"name":"x","versions":[{"references":["1/5/1"]}]}]}]}"#;
        let err = StoreFixture::from_json(dangling).unwrap().into_store().unwrap_err();
        assert!(matches!(err, StoreError::DanglingReference { .. }), "got: {err}");

        let empty = r#"{"workspaces":[{"name":"w","owner":"o","objects":[
            {"name":"x","versions":[]},{"name":"y","versions":[{}]}]}]}"#;
        let err = StoreFixture::from_json(empty).unwrap().into_store().unwrap_err();
        assert_eq!(
            err,
            StoreError::NoVersions {
                workspace: "w".to_string(),
                object: "x".to_string()
            }
        );
        assert_eq!(err.to_string(), "Object x in workspace w has no versions");
    }
}
