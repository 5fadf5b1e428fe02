//! Logging setup for the CLI.
//!
//! Log lines go to stderr so that reports printed to stdout stay clean.

use fob_graphql_usage::logging::{self, EnvFilter, LogLevel};

const CLI_TARGET: &str = "fob_graphql_usage_cli";

/// Directives for the given flags. `None` leaves the choice to `RUST_LOG`.
fn flag_directives(verbose: bool, quiet: bool) -> Option<String> {
    if verbose {
        Some(logging::directives(
            LogLevel::Debug,
            &[(CLI_TARGET, LogLevel::Debug)],
        ))
    } else if quiet {
        Some(logging::directives(
            LogLevel::Error,
            &[(CLI_TARGET, LogLevel::Error)],
        ))
    } else {
        None
    }
}

/// Initialize the tracing subscriber.
///
/// `--verbose` wins over `--quiet`, then `RUST_LOG`, then collector warnings
/// and CLI info.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = match flag_directives(verbose, quiet) {
        Some(directives) => EnvFilter::new(directives),
        None => logging::filter_from_env_or(&logging::directives(
            LogLevel::Warn,
            &[(CLI_TARGET, LogLevel::Info)],
        )),
    };

    // A subscriber may already be installed when running inside tests.
    logging::init_logging(filter, !no_color && crate::ui::should_use_color());
}
