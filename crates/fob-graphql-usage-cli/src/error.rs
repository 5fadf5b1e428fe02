//! Error handling for the usage CLI.
//!
//! `CliError` is returned by every command. Domain errors convert into it
//! via `#[from]`, and `main` turns it into a `miette` report.

use fob_graphql_usage::{RuntimeError, UsageError};
use miette::Report;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Collection error: {0}")]
    Collect(#[from] CollectError),

    /// Errors from the usage engine
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist
    #[error("Config file not found: {}\n\nHint: Create graphql-usage.toml or check the --config path", .0.display())]
    NotFound(PathBuf),

    /// Config file has an extension we cannot parse
    #[error("Unsupported config format: {}\n\nHint: Use a .toml or .json file", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Merged configuration does not fit the expected shape
    #[error("Invalid configuration: {message}\n\nHint: Check graphql-usage.toml and GQL_USAGE_* variables")]
    Invalid { message: String },

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField { field: String, hint: String },
}

/// Errors of the collect command.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Entry file doesn't exist
    #[error("Entry file not found: {}\n\nHint: Entries are resolved from --root", .0.display())]
    EntryNotFound(PathBuf),

    /// Route tree could not be loaded
    #[error("Failed to load route tree {}: {source}", .path.display())]
    RouteTree {
        path: PathBuf,
        #[source]
        source: UsageError,
    },
}

impl From<RuntimeError> for CliError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::FileNotFound(path) => CliError::FileNotFound(path),
            other => CliError::Usage(UsageError::Runtime(other)),
        }
    }
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Usage(e) => Report::new(e),
        CliError::Collect(CollectError::RouteTree { path, source }) => {
            Report::new(source).wrap_err(format!("Failed to load route tree {}", path.display()))
        }
        other => miette::miette!("{}", other),
    }
}
