//! Permission checking for the object workspace store.
//!
//! Write-class operations and direct reads must be authorized against the
//! caller's permission on each workspace involved. A checker resolves every
//! workspace in one batched store call, fetches one permission snapshot, and
//! then applies two rules per workspace, in order:
//!
//! 1. **Lock check**: a locked workspace only permits READ or lower.
//! 2. **Permission compare**: the caller's effective permission must be at
//!    least the required permission.
//!
//! Checkers fail fast: the first violation aborts the check.
//!
//! # Quick Start
//!
//! ```rust
//! use ows_perms::PermissionsCheckerFactory;
//! use ows_store::InMemoryWorkspaceStore;
//! use ows_types::{Permission, User, WorkspaceIdentifier};
//!
//! let store = InMemoryWorkspaceStore::new();
//! let alice = User::new("alice").unwrap();
//! store.create_workspace(&alice, "genomes").unwrap();
//!
//! let factory = PermissionsCheckerFactory::new(&store, Some(alice));
//! let resolved = factory
//!     .single_workspace_checker(WorkspaceIdentifier::Id(1), Permission::Write)
//!     .check()
//!     .unwrap();
//! assert_eq!(resolved.name(), "genomes");
//! ```

pub mod checker;
pub mod error;

pub use checker::{
    check_locked, compare_permission, ObjectChecker, PermissionsCheckerFactory,
    SingleObjectChecker, SingleWorkspaceChecker, WorkspaceChecker,
};
pub use error::{AuthorizationError, CheckError, Result};
