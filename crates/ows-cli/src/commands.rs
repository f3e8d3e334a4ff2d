use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;

use ows_address::{parse_chain, parse_path, parse_reference, validate_path, Address, ResolvedObjectId};
use ows_resolver::{ObjectResolver, ResolutionKind, ResolutionResult, ResolverConfig};
use ows_store::{ListObjectsParameters, ObjectInformation, StoreFixture, WorkspaceStore};
use ows_types::{Permission, RefLimit, User};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Validate(args) => cmd_validate(args, format),
        Command::ValidatePath(args) => cmd_validate_path(args, format),
        Command::ParseLimit(args) => cmd_parse_limit(args, format),
        Command::Resolve(args) => cmd_resolve(args, format),
        Command::List(args) => cmd_list(args, format),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn user_arg(user: Option<String>) -> anyhow::Result<Option<User>> {
    user.map(User::new).transpose().context("invalid user name")
}

// ----------------------------------------------------------------------
// Offline validation
// ----------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct AddressSummary {
    reference: String,
    workspace: String,
    object: String,
    version: Option<u32>,
    absolute: bool,
}

impl From<&Address> for AddressSummary {
    fn from(address: &Address) -> Self {
        Self {
            reference: address.reference_string(),
            workspace: address.workspace_identifier_string(),
            object: address.identifier_string(),
            version: address.version(),
            absolute: address.is_absolute(),
        }
    }
}

fn cmd_validate(args: ValidateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let address = parse_reference(&args.reference, args.absolute)
        .with_context(|| format!("invalid reference '{}'", args.reference))?;
    match format {
        OutputFormat::Json => print_json(&AddressSummary::from(&address)),
        OutputFormat::Text => {
            println!("{} {}", "✓".green().bold(), address.reference_string().yellow());
            Ok(())
        }
    }
}

fn cmd_validate_path(args: ValidatePathArgs, format: OutputFormat) -> anyhow::Result<()> {
    validate_path(&args.path, args.absolute).with_context(|| format!("invalid reference path '{}'", args.path))?;
    let path = parse_path(&args.path)?;
    match format {
        OutputFormat::Json => print_json(&path.iter().map(AddressSummary::from).collect::<Vec<_>>()),
        OutputFormat::Text => {
            println!("{} {} elements", "✓".green().bold(), path.len());
            for (i, address) in path.iter().enumerate() {
                println!("  {:>3}. {}", i + 1, address.reference_string().yellow());
            }
            Ok(())
        }
    }
}

fn cmd_parse_limit(args: ParseLimitArgs, format: OutputFormat) -> anyhow::Result<()> {
    let limit = RefLimit::from_ref_string(&args.reference)
        .with_context(|| format!("invalid listing cursor '{}'", args.reference))?;
    match format {
        OutputFormat::Json => print_json(&limit),
        OutputFormat::Text => {
            println!("{limit}");
            Ok(())
        }
    }
}

// ----------------------------------------------------------------------
// Fixture-backed commands
// ----------------------------------------------------------------------

/// Parse command line addresses. The first element of each reference path
/// is the address, the rest its path.
fn parse_addresses(inputs: &[String], lookup: bool) -> anyhow::Result<Vec<Address>> {
    inputs
        .iter()
        .map(|input| -> anyhow::Result<Address> {
            let address = parse_chain(input).with_context(|| format!("invalid address '{input}'"))?;
            if !lookup {
                return Ok(address);
            }
            if address.has_ref_path() {
                bail!("address '{input}' has a reference path and cannot also be looked up");
            }
            Ok(address.to_builder().with_lookup_required(true).build()?)
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct ResolveRow {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ResolutionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    object: Option<ResolvedObjectId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn resolve_rows(inputs: &[String], addresses: &[Address], result: &ResolutionResult) -> Vec<ResolveRow> {
    inputs
        .iter()
        .zip(addresses)
        .map(|(input, address)| match result.resolution(address) {
            Some(r) => ResolveRow {
                address: input.clone(),
                kind: Some(r.kind()),
                object: Some(r.object().clone()),
                path: r.path().iter().map(ToString::to_string).collect(),
                error: None,
            },
            None => ResolveRow {
                address: input.clone(),
                kind: None,
                object: None,
                path: Vec::new(),
                error: result.failure(address).map(ToString::to_string),
            },
        })
        .collect()
}

fn cmd_resolve(args: ResolveArgs, format: OutputFormat) -> anyhow::Result<()> {
    let store = StoreFixture::load(&args.fixture)
        .and_then(StoreFixture::into_store)
        .with_context(|| format!("loading fixture {}", args.fixture.display()))?;
    let mut config = match &args.config {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::default(),
    };
    config.as_admin |= args.admin;
    let user = user_arg(args.user)?;
    let addresses = parse_addresses(&args.addresses, args.lookup)?;

    let result = ObjectResolver::builder(&store, user)
        .with_objects(addresses.clone())
        .with_config(&config)
        .resolve()?;
    let rows = resolve_rows(&args.addresses, &addresses, &result);

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Text => {
            for row in &rows {
                match (&row.kind, &row.error) {
                    (Some(kind), _) => println!(
                        "{} {} {} {} [{}]",
                        "✓".green().bold(),
                        row.address,
                        "→".dimmed(),
                        row.path.last().map(String::as_str).unwrap_or_default().yellow(),
                        format!("{kind:?}").to_uppercase().cyan()
                    ),
                    (None, error) => println!(
                        "{} {}: {}",
                        "✗".red().bold(),
                        row.address,
                        error.as_deref().unwrap_or_default().red()
                    ),
                }
                if row.path.len() > 1 {
                    println!("    via {}", row.path.join(" → "));
                }
            }
        }
    }

    let failed = result.failures().count();
    if failed > 0 {
        bail!("{failed} of {} objects could not be resolved", result.objects().len());
    }
    Ok(())
}

fn cmd_list(args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let store = StoreFixture::load(&args.fixture)
        .and_then(StoreFixture::into_store)
        .with_context(|| format!("loading fixture {}", args.fixture.display()))?;
    let user = user_arg(args.user)?;
    let after = match &args.after {
        Some(s) => RefLimit::from_ref_string(s).with_context(|| format!("invalid listing cursor '{s}'"))?,
        None => RefLimit::empty(),
    };
    let permissions = store.get_all_permissions(user.as_ref(), Permission::Read, true)?;
    let params = ListObjectsParameters::builder(permissions)
        .with_start_after(after)
        .with_limit(args.limit)
        .with_show_all_versions(args.all_versions)
        .with_show_deleted(args.deleted)
        .build();
    let objects = store.list_objects(&params)?;

    match format {
        OutputFormat::Json => print_json(&objects),
        OutputFormat::Text => {
            for info in &objects {
                println!("{}", list_line(info));
            }
            if objects.is_empty() {
                println!("No objects.");
            }
            Ok(())
        }
    }
}

fn list_line(info: &ObjectInformation) -> String {
    let line = format!("{:<12} {}/{}", info.reference.to_string(), info.workspace_name, info.name);
    if info.deleted {
        format!("{} {}", line.dimmed(), "(deleted)".red())
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ows_types::Reference;

    const FIXTURE: &str = r#"{
    "workspaces": [
      {
        "name": "shared",
        "owner": "owner",
        "permissions": { "u": "READ" },
        "objects": [
          { "name": "target", "deleted": true, "versions": [ { "references": [] } ] },
          { "name": "holder", "versions": [ { "references": ["1/1/1"] } ] }
        ]
      }
    ]
    }"#;

    fn fixture_store() -> ows_store::InMemoryWorkspaceStore {
        StoreFixture::from_json(FIXTURE).unwrap().into_store().unwrap()
    }

    fn fixture_file() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), FIXTURE).unwrap();
        file
    }

    fn resolve_args(fixture: &tempfile::NamedTempFile, addresses: &[&str]) -> ResolveArgs {
        ResolveArgs {
            fixture: fixture.path().to_path_buf(),
            user: Some("u".to_string()),
            config: None,
            admin: false,
            lookup: false,
            addresses: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn resolve_command_fails_when_any_object_fails() {
        let fixture = fixture_file();
        cmd_resolve(resolve_args(&fixture, &["1/2/1;1/1/1"]), OutputFormat::Json).unwrap();

        let err = cmd_resolve(resolve_args(&fixture, &["1/2", "1/1"]), OutputFormat::Text).unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 objects could not be resolved");
    }

    #[test]
    fn list_command_reads_fixture() {
        let fixture = fixture_file();
        let args = ListArgs {
            fixture: fixture.path().to_path_buf(),
            user: Some("u".to_string()),
            after: Some("1/1".to_string()),
            limit: 0,
            all_versions: false,
            deleted: true,
        };
        cmd_list(args, OutputFormat::Text).unwrap();

        let missing = ListArgs {
            fixture: fixture.path().with_extension("absent"),
            user: None,
            after: None,
            limit: 0,
            all_versions: false,
            deleted: false,
        };
        assert!(cmd_list(missing, OutputFormat::Json).is_err());
    }

    #[test]
    fn parses_resolve_command() {
        let cli = Cli::try_parse_from([
            "ows", "--format", "json", "resolve", "--fixture", "f.json", "-u", "u", "1/2/1;1/1/1",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Command::Resolve(args) => {
                assert_eq!(args.user.as_deref(), Some("u"));
                assert_eq!(args.addresses, vec!["1/2/1;1/1/1"]);
                assert!(!args.lookup);
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn resolve_requires_addresses() {
        assert!(Cli::try_parse_from(["ows", "resolve", "--fixture", "f.json"]).is_err());
    }

    #[test]
    fn lookup_addresses() {
        let parsed = parse_addresses(&["1/1".to_string()], true).unwrap();
        assert!(parsed[0].is_lookup_required());

        let err = parse_addresses(&["1/2;1/1".to_string()], true).unwrap_err();
        assert!(err.to_string().contains("cannot also be looked up"));

        let err = parse_addresses(&["1/2/x".to_string()], false).unwrap_err();
        assert_eq!(err.to_string(), "invalid address '1/2/x'");
    }

    #[test]
    fn rows_report_paths_and_failures() {
        let store = fixture_store();
        let inputs = vec!["1/2/1;1/1/1".to_string(), "1/1/1".to_string()];
        let addresses = parse_addresses(&inputs, false).unwrap();
        let result = ObjectResolver::builder(&store, Some(User::new("u").unwrap()))
            .with_objects(addresses.clone())
            .resolve()
            .unwrap();
        let rows = resolve_rows(&inputs, &addresses, &result);

        assert_eq!(rows[0].kind, Some(ResolutionKind::Path));
        assert_eq!(rows[0].path, vec!["1/2/1", "1/1/1"]);
        assert!(rows[0].error.is_none());
        assert_eq!(
            rows[1].error.as_deref(),
            Some("Object 1 in workspace 1 (name shared) has been deleted")
        );

        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["kind"], "PATH");
        assert!(json[1].get("path").is_none());
    }

    #[test]
    fn list_line_marks_deleted() {
        colored::control::set_override(false);
        let info = ObjectInformation {
            reference: Reference::new(1, 2, 3).unwrap(),
            name: "holder".to_string(),
            workspace_name: "shared".to_string(),
            deleted: false,
        };
        assert_eq!(list_line(&info), "1/2/3        shared/holder");
        let deleted = ObjectInformation { deleted: true, ..info };
        assert!(list_line(&deleted).ends_with("(deleted)"));
    }
}
