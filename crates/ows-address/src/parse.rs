//! Parsing and validation of reference strings.
//!
//! A single reference is `workspace/object[/version]`. Each of the workspace
//! and object parts is read as an ID when it is an integer literal and as a
//! name otherwise. A reference path is a `;` separated list of references.

use ows_types::reference::REFERENCE_SEPARATOR;
use ows_types::WorkspaceIdentifier;

use crate::address::Address;
use crate::error::{AddressError, Result};

/// Separator between the references of a reference path.
pub const PATH_SEPARATOR: char = ';';

/// Parse a single reference.
///
/// With `absolute` set, the workspace and object must both be numeric IDs.
///
/// ```
/// use ows_address::parse_reference;
///
/// let a = parse_reference("myws/contigs/3", false).unwrap();
/// assert_eq!(a.name(), Some("contigs"));
/// assert_eq!(a.version(), Some(3));
///
/// assert!(parse_reference("1/1", true).is_ok());
/// let err = parse_reference("foo/1", true).unwrap_err();
/// assert_eq!(err.to_string(), "Reference foo/1 is not absolute");
/// ```
pub fn parse_reference(reference: &str, absolute: bool) -> Result<Address> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(AddressError::Empty { what: "reference" });
    }

    let mut parts: Vec<&str> = trimmed.split(REFERENCE_SEPARATOR).map(str::trim).collect();
    while parts.len() > 1 && parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    if !(2..=3).contains(&parts.len()) {
        return Err(AddressError::Separators {
            reference: reference.to_string(),
        });
    }

    let workspace = match parts[0].parse::<i64>() {
        Ok(id) => WorkspaceIdentifier::from_id(id)?,
        Err(_) => WorkspaceIdentifier::from_name(parts[0])?,
    };
    let builder = Address::builder(workspace);
    let builder = match parts[1].parse::<i64>() {
        Ok(id) => builder.with_id(Some(id))?,
        Err(_) => builder.with_name(Some(parts[1]))?,
    };
    let version = match parts.get(2) {
        None => None,
        Some(v) => Some(v.parse::<i64>().ok().filter(|v| *v <= i64::from(u32::MAX)).ok_or_else(
            || AddressError::UnparseableVersion {
                reference: reference.to_string(),
            },
        )?),
    };
    let address = builder.with_version(version)?.build()?;

    if absolute && !address.is_absolute() {
        return Err(AddressError::NotAbsolute {
            reference: trimmed.to_string(),
        });
    }
    Ok(address)
}

/// Parse a reference path into its addresses, in order.
///
/// Whitespace around each reference is ignored and a trailing `;` is
/// allowed. Errors name the 1-based position of the failing reference.
///
/// ```
/// use ows_address::parse_path;
///
/// let path = parse_path(" 3/27/1 ; 3/24/1 ; ").unwrap();
/// assert_eq!(path.len(), 2);
///
/// let err = parse_path("3/27/1;3/x*y").unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "Reference path position 2: Illegal character in object name x*y: *"
/// );
/// ```
pub fn parse_path(refpath: &str) -> Result<Vec<Address>> {
    parse_path_with(refpath, false)
}

fn parse_path_with(refpath: &str, absolute: bool) -> Result<Vec<Address>> {
    if refpath.trim().is_empty() {
        return Err(AddressError::Empty { what: "refpath" });
    }
    let mut tokens: Vec<&str> = refpath.split(PATH_SEPARATOR).map(str::trim).collect();
    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }
    if tokens.is_empty() {
        return Err(AddressError::Empty { what: "refpath" });
    }
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| parse_reference(token, absolute).map_err(|e| e.at_position(i + 1)))
        .collect()
}

/// Parse a reference path into a single address: the first reference is the
/// address and the rest become its reference path.
pub fn parse_chain(refpath: &str) -> Result<Address> {
    let mut path = parse_path(refpath)?.into_iter();
    let head = path.next().ok_or(AddressError::Empty { what: "refpath" })?;
    head.to_builder().with_reference_path(path.collect()).build()
}

/// Check a single reference without constructing anything for the caller.
pub fn validate(reference: &str, absolute: bool) -> Result<()> {
    parse_reference(reference, absolute).map(|_| ())
}

/// Check a reference path. With `absolute` set every element must use
/// numeric workspace and object IDs.
pub fn validate_path(refpath: &str, absolute: bool) -> Result<()> {
    parse_path_with(refpath, absolute).map(|_| ())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_workspace() -> impl Strategy<Value = String> {
        prop_oneof![
            (1u64..100_000).prop_map(|id| id.to_string()),
            "[a-z][a-z0-9_.-]{0,10}",
            "[a-z]{1,5}:[a-z][a-z0-9]{0,5}",
        ]
    }

    fn arb_object() -> impl Strategy<Value = String> {
        prop_oneof![
            (1u64..100_000).prop_map(|id| id.to_string()),
            "[a-z][a-zA-Z0-9_.|-]{0,10}",
        ]
    }

    fn arb_reference() -> impl Strategy<Value = String> {
        (arb_workspace(), arb_object(), prop::option::of(1u32..1000)).prop_map(|(w, o, v)| match v {
            Some(v) => format!("{w}/{o}/{v}"),
            None => format!("{w}/{o}"),
        })
    }

    fn pad(s: &str, left: usize, right: usize) -> String {
        format!("{}{}{}", " ".repeat(left), s, "\t".repeat(right))
    }

    proptest! {
        #[test]
        fn parse_then_display_normalizes(r in arb_reference(), l in 0usize..3, t in 0usize..3) {
            let parsed = parse_reference(&pad(&r, l, t), false).unwrap();
            prop_assert_eq!(parsed.to_string(), r);
        }

        #[test]
        fn path_hops_reparse_to_same_addresses(
            refs in prop::collection::vec(arb_reference(), 1..6),
            trailing in any::<bool>(),
        ) {
            let mut refpath = refs.join(" ; ");
            if trailing {
                refpath.push(';');
            }
            let path = parse_path(&refpath).unwrap();
            let again: Vec<Address> = path
                .iter()
                .map(|a| parse_reference(&a.reference_string(), false).unwrap())
                .collect();
            prop_assert_eq!(path, again);
        }

        #[test]
        fn built_addresses_are_exclusive(
            r in arb_reference(),
            path in prop::collection::vec(arb_reference(), 0..3),
            lookup in any::<bool>(),
            lookup_first in any::<bool>(),
        ) {
            let base = parse_reference(&r, false).unwrap();
            let hops: Vec<Address> = path.iter().map(|p| parse_reference(p, false).unwrap()).collect();
            let b = base.to_builder();
            let a = if lookup_first {
                b.with_lookup_required(lookup).with_reference_path(hops).build().unwrap()
            } else {
                b.with_reference_path(hops).with_lookup_required(lookup).build().unwrap()
            };
            prop_assert!(a.name().is_some() != a.id().is_some());
            prop_assert!(!(a.has_ref_path() && a.is_lookup_required()));
        }
    }
}
