//! Name validation for workspaces and objects.
//!
//! Valid object names:
//! - Must be 1 to 255 characters long
//! - May only contain ASCII letters, digits, `_`, `|`, `.` and `-`
//! - Must not be an integer literal (those address objects by ID)
//!
//! Valid workspace names:
//! - Must be 1 to 255 characters long
//! - May only contain ASCII letters, digits, `_`, `.` and `-`
//! - May contain one `:` separating a non-empty user prefix from a
//!   non-empty workspace part, e.g. `alice:genomes`

use crate::error::{Result, TypeError};

/// Maximum length of an object or workspace name, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Separates the owner prefix from the rest of a workspace name.
pub const WORKSPACE_NAME_DELIMITER: char = ':';

/// Punctuation allowed in object names in addition to letters and digits.
const OBJECT_NAME_PUNCTUATION: &[char] = &['_', '|', '.', '-'];

/// Punctuation allowed in workspace names in addition to letters and digits.
const WORKSPACE_NAME_PUNCTUATION: &[char] = &['_', '.', '-'];

/// Validate an object name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use ows_types::names::validate_object_name;
///
/// assert!(validate_object_name("contigs.fa").is_ok());
/// assert!(validate_object_name("a|b").is_ok());
/// assert!(validate_object_name("42").is_err());
/// assert!(validate_object_name("bad name").is_err());
/// ```
pub fn validate_object_name(name: &str) -> Result<()> {
    check_length(name, "Object name")?;

    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || OBJECT_NAME_PUNCTUATION.contains(c)))
    {
        return Err(TypeError::IllegalCharacter {
            kind: "object",
            name: name.to_string(),
            ch,
        });
    }

    if is_integer_literal(name) {
        return Err(TypeError::IntegerObjectName(name.to_string()));
    }
    Ok(())
}

/// Validate a workspace name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use ows_types::names::validate_workspace_name;
///
/// assert!(validate_workspace_name("genomes").is_ok());
/// assert!(validate_workspace_name("alice:genomes").is_ok());
/// assert!(validate_workspace_name("alice:").is_err());
/// assert!(validate_workspace_name("a:b:c").is_err());
/// ```
pub fn validate_workspace_name(name: &str) -> Result<()> {
    check_length(name, "Workspace name")?;

    if let Some(ch) = name.chars().find(|c| {
        !(c.is_ascii_alphanumeric()
            || *c == WORKSPACE_NAME_DELIMITER
            || WORKSPACE_NAME_PUNCTUATION.contains(c))
    }) {
        return Err(TypeError::IllegalCharacter {
            kind: "workspace",
            name: name.to_string(),
            ch,
        });
    }

    let parts: Vec<&str> = name.split(WORKSPACE_NAME_DELIMITER).collect();
    match parts.as_slice() {
        [_] => Ok(()),
        [user, workspace] => {
            if user.is_empty() {
                Err(TypeError::MissingUserName(name.to_string()))
            } else if workspace.is_empty() {
                Err(TypeError::MissingWorkspaceName(name.to_string()))
            } else {
                Ok(())
            }
        }
        _ => Err(TypeError::MultipleDelimiters(name.to_string())),
    }
}

/// True for strings of the form `-?[0-9]+`.
pub fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn check_length(name: &str, field: &'static str) -> Result<()> {
    if name.is_empty() {
        return Err(TypeError::Empty { field });
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(TypeError::TooLong {
            field,
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_object_names() {
        for name in ["a", "foo", "foo.bar", "my-obj_2", "a|b", "-", "1a", "-1.5"] {
            assert!(validate_object_name(name).is_ok(), "expected valid: {name}");
        }
        assert!(validate_object_name(&"x".repeat(255)).is_ok());
    }

    #[test]
    fn object_name_empty_and_long() {
        let err = validate_object_name("").unwrap_err();
        assert_eq!(err.to_string(), "Object name cannot be null or the empty string");

        let err = validate_object_name(&"x".repeat(256)).unwrap_err();
        assert!(matches!(err, TypeError::TooLong { max: 255, .. }), "got: {err}");
    }

    #[test]
    fn object_name_illegal_characters() {
        for (name, ch) in [("foo bar", ' '), ("foo*", '*'), ("a/b", '/'), ("a;b", ';'), ("ws:x", ':')] {
            let err = validate_object_name(name).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Illegal character in object name {name}: {ch}")
            );
        }
    }

    #[test]
    fn object_name_integers_rejected() {
        for name in ["1", "42", "-7", "007"] {
            let err = validate_object_name(name).unwrap_err();
            assert_eq!(err.to_string(), format!("Object names cannot be integers: {name}"));
        }
    }

    #[test]
    fn valid_workspace_names() {
        for name in ["ws", "user:ws", "a.b-c_d", "123", "u:1"] {
            assert!(validate_workspace_name(name).is_ok(), "expected valid: {name}");
        }
    }

    #[test]
    fn workspace_name_illegal_characters() {
        for (name, ch) in [("foo|bar", '|'), ("foo*", '*'), ("my ws", ' ')] {
            let err = validate_workspace_name(name).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Illegal character in workspace name {name}: {ch}")
            );
        }
    }

    #[test]
    fn workspace_name_delimiters() {
        assert_eq!(
            validate_workspace_name("a:b:c").unwrap_err().to_string(),
            "Workspace name a:b:c may only contain one : delimiter"
        );
        assert_eq!(
            validate_workspace_name(":ws").unwrap_err().to_string(),
            "User name missing from :ws"
        );
        assert_eq!(
            validate_workspace_name("user:").unwrap_err().to_string(),
            "Workspace name missing from user:"
        );
    }

    #[test]
    fn integer_literals() {
        assert!(is_integer_literal("0"));
        assert!(is_integer_literal("-12"));
        assert!(!is_integer_literal("-"));
        assert!(!is_integer_literal(""));
        assert!(!is_integer_literal("1.0"));
        assert!(!is_integer_literal("+1"));
    }
}
