use serde::Serialize;

use ows_types::{PermissionSet, RefLimit, Reference};

/// Parameters for an ordered object listing.
///
/// The workspaces listed are the readable, non-deleted workspaces in the
/// permission set. Results are sorted by
/// [`listing_order`](ows_types::listing_order).
#[derive(Clone, Debug)]
pub struct ListObjectsParameters {
    permissions: PermissionSet,
    start_after: RefLimit,
    limit: usize,
    show_deleted: bool,
    show_only_deleted: bool,
    show_all_versions: bool,
    min_object_id: Option<u64>,
    max_object_id: Option<u64>,
}

impl ListObjectsParameters {
    /// Largest page a single listing returns.
    pub const MAX_LIMIT: usize = 10_000;

    pub fn builder(permissions: PermissionSet) -> ListObjectsParametersBuilder {
        ListObjectsParametersBuilder {
            params: Self {
                permissions,
                start_after: RefLimit::empty(),
                limit: Self::MAX_LIMIT,
                show_deleted: false,
                show_only_deleted: false,
                show_all_versions: false,
                min_object_id: None,
                max_object_id: None,
            },
        }
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn start_after(&self) -> &RefLimit {
        &self.start_after
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn show_deleted(&self) -> bool {
        self.show_deleted
    }

    pub fn show_only_deleted(&self) -> bool {
        self.show_only_deleted
    }

    pub fn show_all_versions(&self) -> bool {
        self.show_all_versions
    }

    pub fn min_object_id(&self) -> Option<u64> {
        self.min_object_id
    }

    pub fn max_object_id(&self) -> Option<u64> {
        self.max_object_id
    }

    /// Whether an object with this ID and deletion state should be listed.
    pub fn includes(&self, object_id: u64, deleted: bool) -> bool {
        if self.min_object_id.is_some_and(|min| object_id < min)
            || self.max_object_id.is_some_and(|max| object_id > max)
        {
            return false;
        }
        if self.show_only_deleted {
            deleted
        } else {
            self.show_deleted || !deleted
        }
    }
}

#[derive(Clone, Debug)]
pub struct ListObjectsParametersBuilder {
    params: ListObjectsParameters,
}

impl ListObjectsParametersBuilder {
    /// Resume the listing after this cursor.
    pub fn with_start_after(mut self, limit: RefLimit) -> Self {
        self.params.start_after = limit;
        self
    }

    /// Page size. Zero or values above the maximum select the maximum.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.params.limit = if limit == 0 || limit > ListObjectsParameters::MAX_LIMIT {
            ListObjectsParameters::MAX_LIMIT
        } else {
            limit
        };
        self
    }

    pub fn with_show_deleted(mut self, show: bool) -> Self {
        self.params.show_deleted = show;
        self
    }

    pub fn with_show_only_deleted(mut self, show: bool) -> Self {
        self.params.show_only_deleted = show;
        self
    }

    /// List every version rather than only the latest of each object.
    pub fn with_show_all_versions(mut self, show: bool) -> Self {
        self.params.show_all_versions = show;
        self
    }

    pub fn with_min_object_id(mut self, id: Option<u64>) -> Self {
        self.params.min_object_id = id;
        self
    }

    pub fn with_max_object_id(mut self, id: Option<u64>) -> Self {
        self.params.max_object_id = id;
        self
    }

    pub fn build(self) -> ListObjectsParameters {
        self.params
    }
}

/// One row of an object listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ObjectInformation {
    pub reference: Reference,
    pub name: String,
    pub workspace_name: String,
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ows_types::AllUsers;

    fn params() -> ListObjectsParametersBuilder {
        ListObjectsParameters::builder(PermissionSet::builder(None, AllUsers::default()).build())
    }

    #[test]
    fn defaults() {
        let p = params().build();
        assert_eq!(p.limit(), ListObjectsParameters::MAX_LIMIT);
        assert!(p.start_after().is_empty());
        assert!(!p.show_deleted());
        assert!(!p.show_all_versions());
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(params().with_limit(0).build().limit(), ListObjectsParameters::MAX_LIMIT);
        assert_eq!(params().with_limit(20_000).build().limit(), ListObjectsParameters::MAX_LIMIT);
        assert_eq!(params().with_limit(5).build().limit(), 5);
    }

    #[test]
    fn deletion_and_id_filters() {
        let p = params().build();
        assert!(p.includes(1, false));
        assert!(!p.includes(1, true));

        let p = params().with_show_deleted(true).build();
        assert!(p.includes(1, true) && p.includes(1, false));

        let p = params().with_show_only_deleted(true).build();
        assert!(p.includes(1, true) && !p.includes(1, false));

        let p = params().with_min_object_id(Some(2)).with_max_object_id(Some(4)).build();
        assert!(!p.includes(1, false));
        assert!(p.includes(2, false) && p.includes(4, false));
        assert!(!p.includes(5, false));
    }
}
