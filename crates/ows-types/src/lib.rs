//! Foundation types for the object workspace store (OWS).
//!
//! This crate provides the value types shared by every other OWS crate: the
//! permission lattice, workspace identifiers, users, absolute object
//! references and the listing cursor. Nothing here performs I/O.
//!
//! # Key Types
//!
//! - [`Permission`]: Ordered permission lattice `NONE < READ < WRITE < ADMIN < OWNER`
//! - [`WorkspaceIdentifier`]: A workspace addressed by numeric ID or by name
//! - [`ResolvedWorkspaceId`]: A workspace as it exists in the store
//! - [`Reference`]: Absolute `workspace/object/version` coordinate
//! - [`RefLimit`]: "Start after" cursor for ordered listings
//! - [`PermissionSet`]: Per-user permission snapshot over resolved workspaces

pub mod error;
pub mod limit;
pub mod names;
pub mod permission;
pub mod permset;
pub mod reference;
pub mod user;
pub mod workspace;

pub use error::{Result, TypeError};
pub use limit::{listing_order, RefLimit};
pub use permission::Permission;
pub use permset::{PermissionSet, PermissionSetBuilder};
pub use reference::Reference;
pub use user::{AllUsers, User};
pub use workspace::{ResolvedWorkspaceId, WorkspaceIdentifier};
