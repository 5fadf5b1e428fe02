//! Collect command: walk a project and write its usage report.

use std::path::{Path, PathBuf};

use fob_graphql_usage::{
    NativeRuntime, ProjectWalker, Runtime, RuntimeError, UsageError, UsageSession,
    build_artifacts, load_route_tree, write_artifacts,
};

use crate::cli::CollectArgs;
use crate::config::CollectConfig;
use crate::error::{CliError, CollectError, Result};
use crate::ui;

/// What a collect run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectSummary {
    pub modules: usize,
    pub entries_with_usage: usize,
    pub failures: usize,
    pub written: Vec<PathBuf>,
}

/// Execute the collect command.
///
/// 1. Load configuration for the project root
/// 2. Walk every module reachable from the entry files
/// 3. Aggregate operation usage per route entry
/// 4. Merge with the route tree when one is configured and present
/// 5. Write the artifacts to the output directory
pub async fn execute(args: CollectArgs) -> Result<CollectSummary> {
    let root = project_root(args.root.as_deref())?;
    let config = CollectConfig::load(&args, &root)?;
    run(&config, &root).await
}

/// Run a collection with an already loaded configuration.
pub async fn run(config: &CollectConfig, root: &Path) -> Result<CollectSummary> {
    let runtime = NativeRuntime::with_aliases(root, config.aliases.clone());

    let entries = config.entry_paths(root)?;
    if let Some(missing) = entries.iter().find(|entry| !runtime.exists(entry)) {
        return Err(CollectError::EntryNotFound(missing.clone()).into());
    }

    let mut session = UsageSession::new(config.usage.clone())?;
    let (_, walk) = ProjectWalker::new(&runtime)
        .with_max_modules(config.max_modules)
        .walk(&entries, &mut session)
        .await;
    if walk.truncated {
        ui::warning(&format!(
            "Stopped after {} modules; raise --max-modules to walk the whole project",
            config.max_modules
        ));
    }
    if !session.misses().is_empty() {
        ui::warning(&format!(
            "{} operation reference(s) are not reachable from any route entry",
            session.misses().len()
        ));
    }

    let outcome = session.aggregate(&runtime).await;
    for failure in &outcome.failures {
        ui::warning(&format!(
            "{}: {} ({})",
            failure.entry, failure.reference.operation_name, failure.reason
        ));
    }

    let artifacts = match config.usage.route_tree_path.as_deref() {
        Some(path) if !outcome.usage.is_empty() => {
            match load_route_tree(&runtime, Path::new(path)).await {
                Ok(routes) => build_artifacts(&config.usage, &outcome.usage, Some(&routes))?,
                Err(UsageError::Runtime(RuntimeError::FileNotFound(missing))) => {
                    ui::warning(&format!(
                        "Route tree {} not found; skipping the usage report",
                        missing.display()
                    ));
                    Vec::new()
                }
                Err(source) => {
                    return Err(CollectError::RouteTree {
                        path: root.join(path),
                        source,
                    }
                    .into());
                }
            }
        }
        _ => build_artifacts(&config.usage, &outcome.usage, None)?,
    };

    let out_dir = root.join(&config.out_dir);
    write_artifacts(&runtime, &out_dir, &artifacts).await?;

    let summary = CollectSummary {
        modules: walk.modules,
        entries_with_usage: outcome.usage.len(),
        failures: outcome.failures.len(),
        written: artifacts
            .iter()
            .map(|artifact| out_dir.join(&artifact.file_name))
            .collect(),
    };

    if outcome.usage.is_empty() {
        ui::warning("No GraphQL operation usage found; nothing written");
    }
    for path in &summary.written {
        ui::success(&format!("Wrote {}", path.display()));
    }
    ui::info(&format!(
        "{} modules walked, {} route entries use GraphQL operations",
        summary.modules, summary.entries_with_usage
    ));

    Ok(summary)
}

fn project_root(root: Option<&Path>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => std::env::current_dir()?,
    };
    root.canonicalize().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CliError::FileNotFound(root),
        _ => CliError::Io(e),
    })
}
