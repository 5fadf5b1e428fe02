//! Configuration for the collect command, merged from several sources.
//!
//! Priority: CLI > Environment (`GQL_USAGE_*`) > File > Defaults

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use fob_graphql_usage::{DEFAULT_MAX_MODULES, UsageOptions};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::CollectArgs;
use crate::error::{ConfigError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "graphql-usage.toml";
pub const ENV_PREFIX: &str = "GQL_USAGE_";

/// Settings of a collection run.
///
/// Usage options sit at the top level of the file next to the walk settings:
///
/// ```toml
/// entries = ["src/routes.ts"]
/// outDir = "dist"
/// routeTreePath = "dist/routes.json"
///
/// [aliases]
/// "@" = "src"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectConfig {
    pub entries: Vec<PathBuf>,
    pub aliases: IndexMap<String, PathBuf>,
    #[serde(alias = "out_dir")]
    pub out_dir: PathBuf,
    #[serde(alias = "max_modules")]
    pub max_modules: usize,
    #[serde(flatten)]
    pub usage: UsageOptions,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            aliases: IndexMap::new(),
            out_dir: PathBuf::from("dist"),
            max_modules: DEFAULT_MAX_MODULES,
            usage: UsageOptions::default(),
        }
    }
}

/// Values given on the command line. Unset flags leave lower layers alone.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entries: Vec<PathBuf>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    aliases: IndexMap<String, PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_modules: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    route_tree_path: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    emit_intermediate: bool,
}

impl From<&CollectArgs> for CliOverrides {
    fn from(args: &CollectArgs) -> Self {
        Self {
            entries: args.entries.clone(),
            aliases: args.aliases.iter().cloned().collect(),
            out_dir: args.out_dir.clone(),
            max_modules: args.max_modules,
            output_path: args.output.clone(),
            route_tree_path: args.route_tree.clone(),
            emit_intermediate: args.emit_intermediate,
        }
    }
}

impl CollectConfig {
    /// Load the configuration for a run rooted at `root`.
    ///
    /// `graphql-usage.toml` in the root is used when present and no
    /// `--config` is given.
    pub fn load(args: &CollectArgs, root: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match &args.config {
            Some(path) => {
                let path = root.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => {
                let default_path = root.join(DEFAULT_CONFIG_FILE);
                default_path.is_file().then_some(default_path)
            }
        };

        if let Some(path) = config_file {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(&path)),
                Some("json") => figment.merge(Json::file(&path)),
                _ => return Err(ConfigError::UnsupportedFormat(path).into()),
            };
        }

        // GQL_USAGE_OUT_DIR, GQL_USAGE_ROUTE_TREE_PATH, ...
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        figment = figment.merge(Serialized::defaults(CliOverrides::from(args)));

        figment.extract().map_err(|e| {
            ConfigError::Invalid {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Entry files as absolute paths.
    pub fn entry_paths(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if self.entries.is_empty() {
            return Err(ConfigError::MissingField {
                field: "entries".to_string(),
                hint: "Pass entry files, e.g. `fob-gql-usage collect src/routes.ts`".to_string(),
            }
            .into());
        }
        Ok(self.entries.iter().map(|entry| root.join(entry)).collect())
    }
}
