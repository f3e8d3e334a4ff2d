//! Object addressing for the object workspace store.
//!
//! Clients name an object by workspace plus object name or ID, optionally
//! pinned to a version, and optionally reached through a chain of references
//! from an object they can read. This crate models those addresses and parses
//! the external string syntaxes:
//!
//! - a single reference, `workspace/object[/version]`, where the workspace
//!   and object parts are either positive integers or names
//! - a reference path, `ref (";" ref)*`, with whitespace around tokens
//!   ignored and an optional trailing `;`
//!
//! Parsing and validation perform no I/O.
//!
//! # Modules
//!
//! - [`error`]: Error types for address construction and parsing
//! - [`address`]: [`Address`], its builder and [`ObjectSelector`]
//! - [`parse`]: Reference and reference path parsing
//! - [`subset`]: [`SubsetSelection`] of an object's data
//! - [`resolved`]: Addresses after workspace and object resolution

pub mod address;
pub mod error;
pub mod parse;
pub mod resolved;
pub mod subset;

pub use address::{Address, AddressBuilder, Locator, ObjectSelector};
pub use error::{AddressError, Result};
pub use parse::{parse_chain, parse_path, parse_reference, validate, validate_path};
pub use resolved::{ResolvedAddress, ResolvedObjectId};
pub use subset::SubsetSelection;
