//! Fob GraphQL usage CLI.
//!
//! Collects per-route GraphQL operation usage from a project without running
//! the bundler, and assembles usage reports from existing artifacts.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - `collect`, `report` and `routes`
//! - [`config`] - layered configuration (`graphql-usage.toml`, `GQL_USAGE_*`, flags)
//! - [`error`] - error types and `miette` conversion
//! - [`logger`] - tracing subscriber setup

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, CollectError, ConfigError, Result};
