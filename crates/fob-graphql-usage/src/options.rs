//! Collection options.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UsageError};

pub const DEFAULT_OUTPUT_PATH: &str = "graphql-usage.json";
pub const DEFAULT_ENTRY_SEGMENT: &str = "pages";
pub const DEFAULT_CLIENT_SEGMENT: &str = "graphql/operations";

/// Export-name patterns in priority order. Capture group 1 is the operation name.
pub const DEFAULT_OPERATION_PATTERNS: &[&str] = &[
    "^(.+)Document$",
    "^use(.+)LazyQuery$",
    "^use(.+)Query$",
    "^use(.+)Mutation$",
];

/// Options shared by the bundler plugin and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageOptions {
    /// Where the report (and intermediate usage map) is emitted.
    #[serde(alias = "output_path")]
    pub output_path: String,
    /// Route tree artifact: a bundle asset name or a JSON file path.
    #[serde(alias = "route_tree_path", skip_serializing_if = "Option::is_none")]
    pub route_tree_path: Option<String>,
    /// Selects route entry modules among ancestry request strings.
    #[serde(alias = "entry_matcher")]
    pub entry_matcher: PathMatcher,
    /// Selects generated API-client modules among import sources.
    #[serde(alias = "client_matcher")]
    pub client_matcher: PathMatcher,
    #[serde(alias = "operation_patterns")]
    pub operation_patterns: Vec<String>,
    /// Keep the flat usage map next to the report as `<stem>.raw.json`.
    #[serde(alias = "emit_intermediate")]
    pub emit_intermediate: bool,
}

impl Default for UsageOptions {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            route_tree_path: None,
            entry_matcher: PathMatcher::Contains(DEFAULT_ENTRY_SEGMENT.to_string()),
            client_matcher: PathMatcher::Contains(DEFAULT_CLIENT_SEGMENT.to_string()),
            operation_patterns: DEFAULT_OPERATION_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            emit_intermediate: false,
        }
    }
}

impl UsageOptions {
    pub fn with_route_tree_path(mut self, path: impl Into<String>) -> Self {
        self.route_tree_path = Some(path.into());
        self
    }

    pub fn with_output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Route tree location, required once a report is assembled.
    pub fn require_route_tree_path(&self) -> Result<&str> {
        self.route_tree_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(UsageError::MissingRouteTreePath)
    }

    /// Name of the intermediate usage map when it is kept next to the report.
    pub fn intermediate_output_path(&self) -> String {
        match self.output_path.strip_suffix(".json") {
            Some(stem) => format!("{stem}.raw.json"),
            None => format!("{}.raw.json", self.output_path),
        }
    }
}

/// Path predicate configured as a substring or a regex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathMatcher {
    Contains(String),
    Regex(String),
}

impl PathMatcher {
    pub fn compile(&self, field: &'static str) -> Result<CompiledMatcher> {
        match self {
            PathMatcher::Contains(segment) => Ok(CompiledMatcher::Contains(segment.clone())),
            PathMatcher::Regex(pattern) => Regex::new(pattern)
                .map(CompiledMatcher::Regex)
                .map_err(|source| UsageError::InvalidPattern {
                    field,
                    pattern: pattern.clone(),
                    source,
                }),
        }
    }
}

#[derive(Debug, Clone)]
pub enum CompiledMatcher {
    Contains(String),
    Regex(Regex),
}

impl CompiledMatcher {
    pub fn is_match(&self, path: &str) -> bool {
        match self {
            CompiledMatcher::Contains(segment) => path.contains(segment.as_str()),
            CompiledMatcher::Regex(re) => re.is_match(path),
        }
    }
}
