//! Command-line interface definition.
//!
//! - `fob-gql-usage collect` - walk a project and write the usage report
//! - `fob-gql-usage report` - merge an existing usage map with a route tree
//! - `fob-gql-usage routes` - turn a route module into exportable JSON source

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Per-route GraphQL operation usage statistics
#[derive(Parser, Debug)]
#[command(
    name = "fob-gql-usage",
    version,
    about = "Per-route GraphQL operation usage statistics",
    long_about = "Finds which GraphQL queries and mutations every page of an application\n\
                  uses, following imports of generated API-client modules back to the\n\
                  route entry that owns them, and nests the result along the route tree."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect usage by walking the project from its route entry files
    ///
    /// Every reachable local module is parsed for imports; references to
    /// generated client modules are attributed to the page that owns them
    /// and expanded into field-level usage from the `.gql` documents.
    Collect(CollectArgs),

    /// Merge a flat usage map with a route tree
    Report(ReportArgs),

    /// Rewrite `loadable(() => import('x'))` route components to `"x"`
    Routes(RoutesArgs),
}

/// Arguments for the collect command
#[derive(Args, Debug, Default)]
pub struct CollectArgs {
    /// Entry files to walk from, usually the route module
    ///
    /// Examples:
    ///   fob-gql-usage collect src/routes.ts
    ///   fob-gql-usage collect src/routes.ts src/admin/routes.ts
    #[arg(value_name = "ENTRY")]
    pub entries: Vec<PathBuf>,

    /// Project root; relative paths are taken from here
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Import alias as PREFIX=DIR (repeatable), e.g. --alias @=src
    #[arg(short, long = "alias", value_name = "PREFIX=DIR", value_parser = parse_alias)]
    pub aliases: Vec<(String, PathBuf)>,

    /// Directory the report is written to
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Report file name inside the output directory
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Route tree JSON file; without it only the flat usage map is written
    #[arg(long, value_name = "FILE")]
    pub route_tree: Option<String>,

    /// Also keep the flat usage map as <output>.raw.json
    #[arg(long)]
    pub emit_intermediate: bool,

    /// Stop walking after this many modules
    #[arg(long, value_name = "N")]
    pub max_modules: Option<usize>,

    /// Config file (TOML or JSON); defaults to graphql-usage.toml in the root
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Flat usage map produced by `collect` or the bundler plugin
    #[arg(short, long, value_name = "FILE")]
    pub usage: PathBuf,

    /// Route tree JSON file
    #[arg(short, long, value_name = "FILE")]
    pub route_tree: PathBuf,

    /// Write the report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the routes command
#[derive(Args, Debug)]
pub struct RoutesArgs {
    /// Route module source
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Write the rewritten source here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Parse a `PREFIX=DIR` alias.
pub fn parse_alias(s: &str) -> Result<(String, PathBuf), String> {
    let (prefix, dir) = s
        .split_once('=')
        .ok_or_else(|| format!("Alias '{s}' must have the form PREFIX=DIR"))?;
    if prefix.is_empty() {
        return Err("Alias prefix cannot be empty".to_string());
    }
    if dir.is_empty() {
        return Err(format!("Alias '{prefix}' has no target directory"));
    }
    Ok((prefix.to_string(), PathBuf::from(dir)))
}
