//! Subscriber setup for hosts embedding the collector.
//!
//! Only available with the `logging` feature. The library itself just emits
//! `tracing` events under the `fob_graphql_usage` target: attribution misses
//! and unusable operation documents are `warn`, per-module interception is
//! `debug`. Hosts pick a [`LogLevel`] for the collector, add directives for
//! their own targets and install the result with [`init_logging`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use tracing_subscriber::EnvFilter;

/// Target of every event emitted by this crate.
pub const TARGET: &str = "fob_graphql_usage";

/// Verbosity of usage collection output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    Error,
    /// Attribution misses and resolution failures (default)
    #[default]
    Warn,
    Info,
    /// Every intercepted reference
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive value understood by `EnvFilter`.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "off" | "none" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("Invalid log level: {}", other)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter directives: the collector at `level`, then each host target at
/// its own level.
///
/// ```
/// use fob_graphql_usage::logging::{LogLevel, directives};
///
/// assert_eq!(
///     directives(LogLevel::Warn, &[("my_cli", LogLevel::Info)]),
///     "fob_graphql_usage=warn,my_cli=info"
/// );
/// ```
pub fn directives(level: LogLevel, hosts: &[(&str, LogLevel)]) -> String {
    std::iter::once((TARGET, level))
        .chain(hosts.iter().copied())
        .map(|(target, level)| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build a filter from `RUST_LOG`, falling back to `default` when it is
/// unset or invalid.
pub fn filter_from_env_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install a compact stderr subscriber with `filter`.
///
/// Returns false when a global subscriber was already installed, in which
/// case the call has no effect.
pub fn init_logging(filter: EnvFilter, ansi: bool) -> bool {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_level(true)
                .with_ansi(ansi)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .is_ok()
}
