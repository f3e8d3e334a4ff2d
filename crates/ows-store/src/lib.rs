//! Workspace store interface for the object workspace store.
//!
//! The resolver and permission checker never talk to a database directly.
//! They consume the [`WorkspaceStore`] trait, whose every method takes a
//! *set* of keys and answers with a map, so that resolving a batch of
//! addresses costs a number of round trips proportional to path depth rather
//! than to batch size.
//!
//! # Modules
//!
//! - [`error`]: Error types for store operations
//! - [`traits`]: The [`WorkspaceStore`] trait
//! - [`listing`]: Parameters and results for ordered object listings
//! - [`memory`]: In-memory [`InMemoryWorkspaceStore`]
//! - [`fixture`]: JSON descriptions of store contents

pub mod error;
pub mod fixture;
pub mod listing;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fixture::StoreFixture;
pub use listing::{ListObjectsParameters, ObjectInformation};
pub use memory::InMemoryWorkspaceStore;
pub use traits::{ObjectState, WorkspaceStore};
