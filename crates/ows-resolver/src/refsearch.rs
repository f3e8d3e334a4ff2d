//! Breadth-first search up the incoming reference graph.
//!
//! Given a set of target references, find for each one an object the caller
//! can read that (transitively) references it. Every level of the search
//! costs two batched store calls for all targets together: one for incoming
//! references and one for the state of newly seen readable referrers.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use ows_store::{StoreResult, WorkspaceStore};
use ows_types::Reference;

/// Which workspaces a search may terminate in.
#[derive(Clone, Debug)]
pub enum ReadableWorkspaces {
    /// Every workspace.
    All,
    /// Only the listed workspace IDs.
    Only(HashSet<u64>),
}

impl ReadableWorkspaces {
    pub fn contains(&self, workspace_id: u64) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(&workspace_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Only(ids) if ids.is_empty())
    }
}

/// The outcome of a search.
#[derive(Clone, Debug, Default)]
pub struct SearchOutcome {
    paths: HashMap<Reference, Vec<Reference>>,
    limit_reached: bool,
}

impl SearchOutcome {
    /// The path `[ancestor, ..., target]` found for `target`.
    pub fn path(&self, target: &Reference) -> Option<&[Reference]> {
        self.paths.get(target).map(Vec::as_slice)
    }

    /// Whether the search stopped early at the reference count ceiling.
    /// Targets without a path were not searched exhaustively.
    pub fn limit_reached(&self) -> bool {
        self.limit_reached
    }
}

struct SearchTree {
    target: Reference,
    frontier: Vec<Reference>,
    /// Each discovered referrer mapped to the reference it points at.
    child: HashMap<Reference, Reference>,
}

impl SearchTree {
    fn new(target: Reference) -> Self {
        Self {
            target,
            frontier: vec![target],
            child: HashMap::new(),
        }
    }

    fn path_from(&self, ancestor: Reference) -> Vec<Reference> {
        let mut path = vec![ancestor];
        let mut current = ancestor;
        while let Some(next) = self.child.get(&current) {
            path.push(*next);
            current = *next;
        }
        path
    }
}

/// Searches the incoming reference graph of a store.
pub struct ReferenceGraphSearch<'a, S: WorkspaceStore + ?Sized> {
    store: &'a S,
    readable: ReadableWorkspaces,
    max_search_count: usize,
}

impl<'a, S: WorkspaceStore + ?Sized> ReferenceGraphSearch<'a, S> {
    pub fn new(store: &'a S, readable: ReadableWorkspaces, max_search_count: usize) -> Self {
        Self {
            store,
            readable,
            max_search_count,
        }
    }

    /// Search for a readable, non-deleted referrer of each target.
    ///
    /// A referrer terminates the search when its workspace is readable and
    /// live and its object is not deleted. Other referrers are searched
    /// through. The count of examined references includes the targets
    /// themselves and every incoming edge fetched; exceeding
    /// `max_search_count` stops the search.
    pub fn search(&self, targets: &HashSet<Reference>) -> StoreResult<SearchOutcome> {
        let mut outcome = SearchOutcome::default();
        if targets.is_empty() || self.readable.is_empty() {
            return Ok(outcome);
        }
        let mut count = targets.len();
        if count > self.max_search_count {
            outcome.limit_reached = true;
            return Ok(outcome);
        }

        let mut sorted: Vec<Reference> = targets.iter().copied().collect();
        sorted.sort();
        let mut trees: Vec<SearchTree> = sorted.into_iter().map(SearchTree::new).collect();
        let mut depth = 0usize;

        while !trees.is_empty() {
            depth += 1;
            let query: HashSet<Reference> = trees.iter().flat_map(|t| t.frontier.iter().copied()).collect();
            let incoming = self.store.get_incoming_references(&query)?;
            count += incoming.values().map(HashSet::len).sum::<usize>();
            if count > self.max_search_count {
                debug!(depth, count, "reference search limit reached");
                outcome.limit_reached = true;
                return Ok(outcome);
            }

            let candidates: HashSet<Reference> = incoming
                .values()
                .flatten()
                .copied()
                .filter(|r| self.readable.contains(r.workspace_id()))
                .collect();
            let states = if candidates.is_empty() {
                HashMap::new()
            } else {
                self.store.get_object_states(&candidates)?
            };
            let terminal = |r: &Reference| {
                self.readable.contains(r.workspace_id())
                    && states.get(r).is_some_and(|s| !s.deleted && !s.workspace_deleted)
            };

            trees.retain_mut(|tree| {
                let mut next = Vec::new();
                for current in std::mem::take(&mut tree.frontier) {
                    let mut referrers: Vec<Reference> = incoming
                        .get(&current)
                        .map(|set| set.iter().copied().collect())
                        .unwrap_or_default();
                    referrers.sort();
                    for referrer in referrers {
                        if referrer == tree.target || tree.child.contains_key(&referrer) {
                            continue;
                        }
                        tree.child.insert(referrer, current);
                        if terminal(&referrer) {
                            outcome.paths.insert(tree.target, tree.path_from(referrer));
                            return false;
                        }
                        next.push(referrer);
                    }
                }
                tree.frontier = next;
                !tree.frontier.is_empty()
            });
        }
        debug!(
            targets = targets.len(),
            found = outcome.paths.len(),
            depth,
            count,
            "reference search complete"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ows_store::InMemoryWorkspaceStore;
    use ows_types::User;

    fn user(name: &str) -> User {
        User::new(name).unwrap()
    }

    /// ws 1 (alice, readable): 1/1 -> 2/1 -> 2/2 -> target 2/3 in ws 2.
    fn chain() -> (InMemoryWorkspaceStore, Reference) {
        let store = InMemoryWorkspaceStore::new();
        store.create_workspace(&user("alice"), "top").unwrap();
        store.create_workspace(&user("bob"), "hidden").unwrap();
        let target = store.save_object(2, "target", &[]).unwrap();
        let mid = store.save_object(2, "mid", &[target]).unwrap();
        let low = store.save_object(2, "low", &[mid]).unwrap();
        store.save_object(1, "root", &[low]).unwrap();
        (store, target)
    }

    fn only(ids: &[u64]) -> ReadableWorkspaces {
        ReadableWorkspaces::Only(ids.iter().copied().collect())
    }

    #[test]
    fn finds_path_through_unreadable_objects() {
        let (store, target) = chain();
        let search = ReferenceGraphSearch::new(&store, only(&[1]), 100);
        let outcome = search.search(&HashSet::from([target])).unwrap();
        let path: Vec<String> = outcome.path(&target).unwrap().iter().map(|r| r.to_string()).collect();
        assert_eq!(path, vec!["1/1/1", "2/3/1", "2/2/1", "2/1/1"]);
        assert!(!outcome.limit_reached());
    }

    #[test]
    fn no_readable_ancestor() {
        let (store, target) = chain();
        let search = ReferenceGraphSearch::new(&store, only(&[3]), 100);
        let outcome = search.search(&HashSet::from([target])).unwrap();
        assert!(outcome.path(&target).is_none());
        assert!(!outcome.limit_reached());
    }

    #[test]
    fn deleted_ancestor_does_not_terminate() {
        let (store, target) = chain();
        store.set_object_deleted(1, 1, true).unwrap();
        let search = ReferenceGraphSearch::new(&store, only(&[1]), 100);
        let outcome = search.search(&HashSet::from([target])).unwrap();
        assert!(outcome.path(&target).is_none());
    }

    #[test]
    fn admin_terminates_at_first_live_referrer() {
        let (store, target) = chain();
        let search = ReferenceGraphSearch::new(&store, ReadableWorkspaces::All, 100);
        let outcome = search.search(&HashSet::from([target])).unwrap();
        let path: Vec<String> = outcome.path(&target).unwrap().iter().map(|r| r.to_string()).collect();
        assert_eq!(path, vec!["2/2/1", "2/1/1"]);
    }

    #[test]
    fn admin_does_not_terminate_in_deleted_workspace() {
        let (store, target) = chain();
        store.set_workspace_deleted(2, true).unwrap();
        let search = ReferenceGraphSearch::new(&store, ReadableWorkspaces::All, 100);
        let outcome = search.search(&HashSet::from([target])).unwrap();
        let path: Vec<String> = outcome.path(&target).unwrap().iter().map(|r| r.to_string()).collect();
        assert_eq!(path, vec!["1/1/1", "2/3/1", "2/2/1", "2/1/1"]);
    }

    #[test]
    fn count_ceiling_stops_search() {
        let (store, target) = chain();
        // the target plus one edge for each of three levels
        let search = ReferenceGraphSearch::new(&store, only(&[1]), 3);
        let outcome = search.search(&HashSet::from([target])).unwrap();
        assert!(outcome.limit_reached());
        assert!(outcome.path(&target).is_none());

        let search = ReferenceGraphSearch::new(&store, only(&[1]), 4);
        let outcome = search.search(&HashSet::from([target])).unwrap();
        assert!(outcome.path(&target).is_some());
    }

    #[test]
    fn empty_readable_set_searches_nothing() {
        let (store, target) = chain();
        let search = ReferenceGraphSearch::new(&store, only(&[]), 100);
        let outcome = search.search(&HashSet::from([target])).unwrap();
        assert!(outcome.path(&target).is_none());
    }

    #[test]
    fn unreadable_graph_is_exhausted() {
        let store = InMemoryWorkspaceStore::new();
        store.create_workspace(&user("alice"), "private").unwrap();
        let a1 = store.save_object(1, "a", &[]).unwrap();
        let b1 = store.save_object(1, "b", &[a1]).unwrap();
        store.save_object(1, "c", &[a1, b1]).unwrap();
        let search = ReferenceGraphSearch::new(&store, only(&[2]), 100);
        let outcome = search.search(&HashSet::from([a1])).unwrap();
        assert!(outcome.path(&a1).is_none());
        assert!(!outcome.limit_reached());
    }
}
