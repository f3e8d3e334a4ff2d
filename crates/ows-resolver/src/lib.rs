//! Batched object resolution for the object workspace store.
//!
//! Clients name objects in several ways: directly by workspace and object
//! name or ID, through a reference path starting at an object they can read,
//! or by asking for a lookup that searches the objects referencing the
//! target. [`ObjectResolver`] resolves a mixed batch of such addresses into
//! concrete, versioned objects with a number of store round trips that
//! depends on path depth, not batch size.
//!
//! An object the caller cannot read directly, because its workspace is not
//! readable or because it has been deleted, is still returned when a chain of
//! stored references leads to it from an object the caller can read.
//!
//! # Modules
//!
//! - [`config`]: [`ResolverConfig`], loadable from TOML
//! - [`error`]: Whole-call errors and per-address failures
//! - [`refsearch`]: Breadth-first search of the incoming reference graph
//! - [`resolver`]: [`ObjectResolver`] and [`ResolutionResult`]
//!
//! # Quick Start
//!
//! ```rust
//! use ows_address::parse_chain;
//! use ows_resolver::{ObjectResolver, ResolutionKind};
//! use ows_store::InMemoryWorkspaceStore;
//! use ows_types::{Permission, User};
//!
//! let store = InMemoryWorkspaceStore::new();
//! let owner = User::new("owner").unwrap();
//! let reader = User::new("reader").unwrap();
//! store.create_workspace(&owner, "data").unwrap();
//! let genome = store.save_object(1, "genome", &[]).unwrap();
//! store.save_object(1, "assembly", &[genome]).unwrap();
//! store.set_object_deleted(1, 1, true).unwrap();
//! store.set_permission(1, &reader, Permission::Read).unwrap();
//!
//! let address = parse_chain("1/assembly;1/1/1").unwrap();
//! let result = ObjectResolver::builder(&store, Some(reader))
//!     .with_object(address.clone())
//!     .resolve()
//!     .unwrap();
//! assert_eq!(result.kind(&address), Some(ResolutionKind::Path));
//! assert!(result.resolved_object(&address).unwrap().is_deleted());
//! ```

pub mod config;
pub mod error;
pub mod refsearch;
pub mod resolver;

pub use config::{ResolverConfig, DEFAULT_MAX_SEARCH_COUNT};
pub use error::{ResolutionFailure, ResolveError, Result};
pub use refsearch::{ReadableWorkspaces, ReferenceGraphSearch, SearchOutcome};
pub use resolver::{ObjectResolver, ObjectResolverBuilder, Resolution, ResolutionKind, ResolutionResult};
