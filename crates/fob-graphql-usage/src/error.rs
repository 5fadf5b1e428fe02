//! Error types for usage collection and report assembly.
//!
//! Per-reference failures (attribution misses, unresolvable documents,
//! malformed documents) are not errors at this level: they are recorded and
//! logged by the aggregator. `UsageError` is reserved for failures that stop
//! a whole collection pass.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::imports::ImportParseError;
use crate::runtime::RuntimeError;

pub type Result<T> = std::result::Result<T, UsageError>;

/// Errors that abort a usage collection pass
#[derive(Error, Debug, Diagnostic)]
pub enum UsageError {
    /// A configured matcher or operation pattern is not a valid regex
    #[error("Invalid {field} pattern '{pattern}': {source}")]
    #[diagnostic(
        code(fob::graphql_usage::invalid_pattern),
        help("Patterns use Rust regex syntax; operation patterns need one capture group")
    )]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An operation pattern has no capture group for the operation name
    #[error("Operation pattern '{pattern}' has no capture group")]
    #[diagnostic(
        code(fob::graphql_usage::missing_capture),
        help("Wrap the operation name part in parentheses, e.g. ^use(.+)Query$")
    )]
    MissingCapture { pattern: String },

    /// Report assembly was requested without a route tree location
    #[error("Route tree path is not configured")]
    #[diagnostic(
        code(fob::graphql_usage::missing_route_tree_path),
        help("Set `routeTreePath` in graphql-usage.toml or pass --route-tree")
    )]
    MissingRouteTreePath,

    /// The route tree artifact exists but is not a valid route tree
    #[error("Invalid route tree {}: {message}", .path.display())]
    #[diagnostic(
        code(fob::graphql_usage::invalid_route_tree),
        help("The route tree must be a JSON array of route nodes")
    )]
    InvalidRouteTree { path: PathBuf, message: String },

    /// A source module could not be parsed for imports
    #[error(transparent)]
    #[diagnostic(code(fob::graphql_usage::import_parse))]
    ImportParse(#[from] ImportParseError),

    /// Filesystem or resolver failure outside per-reference resolution
    #[error(transparent)]
    #[diagnostic(code(fob::graphql_usage::runtime))]
    Runtime(#[from] RuntimeError),

    /// Artifact serialization failure
    #[error("JSON error: {0}")]
    #[diagnostic(code(fob::graphql_usage::json))]
    Json(#[from] serde_json::Error),
}
