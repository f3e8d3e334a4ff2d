use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ows",
    about = "Object workspace store: reference validation and object resolution",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check an object reference string
    Validate(ValidateArgs),
    /// Check a semicolon separated reference path
    ValidatePath(ValidatePathArgs),
    /// Parse a listing cursor ("start after" reference)
    ParseLimit(ParseLimitArgs),
    /// Resolve object addresses against a store fixture
    Resolve(ResolveArgs),
    /// List objects readable by a user in a store fixture
    List(ListArgs),
}

#[derive(Args)]
pub struct ValidateArgs {
    pub reference: String,
    /// Require numeric workspace and object IDs
    #[arg(long)]
    pub absolute: bool,
}

#[derive(Args)]
pub struct ValidatePathArgs {
    pub path: String,
    #[arg(long)]
    pub absolute: bool,
}

#[derive(Args)]
pub struct ParseLimitArgs {
    pub reference: String,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// JSON description of the store contents
    #[arg(long)]
    pub fixture: PathBuf,
    /// Resolve as this user; anonymous if omitted
    #[arg(short, long)]
    pub user: Option<String>,
    /// Resolver configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub admin: bool,
    /// Find each object through the objects that reference it
    #[arg(long)]
    pub lookup: bool,
    /// References or reference paths, e.g. `3/27/1;3/24/1`
    #[arg(required = true)]
    pub addresses: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    pub fixture: PathBuf,
    #[arg(short, long)]
    pub user: Option<String>,
    /// Resume after this reference
    #[arg(long)]
    pub after: Option<String>,
    /// Maximum rows; 0 means the store maximum
    #[arg(short = 'n', long, default_value = "0")]
    pub limit: usize,
    #[arg(long)]
    pub all_versions: bool,
    /// Include deleted objects
    #[arg(long)]
    pub deleted: bool,
}
