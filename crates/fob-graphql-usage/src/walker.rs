//! Breadth-first project walk for collection without a bundler.
//!
//! Starting from the given entry files, every reachable local module is read,
//! its imports extracted and resolved, and first-importer edges recorded in
//! an [`IssuerGraph`]. Each module is then reported to the [`UsageSession`]
//! exactly as the bundler plugin would.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::attribution::IssuerGraph;
use crate::imports::extract_imports;
use crate::runtime::Runtime;
use crate::session::UsageSession;

pub const DEFAULT_MAX_MODULES: usize = 10_000;

const SCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts"];

/// Walk statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub modules: usize,
    pub unresolved: usize,
    pub parse_failures: usize,
    /// True when the module limit stopped the walk early.
    pub truncated: bool,
}

#[derive(Debug)]
pub struct ProjectWalker<'r> {
    runtime: &'r dyn Runtime,
    max_modules: usize,
}

impl<'r> ProjectWalker<'r> {
    pub fn new(runtime: &'r dyn Runtime) -> Self {
        Self {
            runtime,
            max_modules: DEFAULT_MAX_MODULES,
        }
    }

    pub fn with_max_modules(mut self, max_modules: usize) -> Self {
        self.max_modules = max_modules;
        self
    }

    /// Walk from `entries`, feeding `session`. Returns the issuer graph built.
    pub async fn walk(
        &self,
        entries: &[PathBuf],
        session: &mut UsageSession,
    ) -> (IssuerGraph, WalkSummary) {
        let mut graph = IssuerGraph::new();
        let mut summary = WalkSummary::default();
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::new();

        for entry in entries {
            let id = path_id(entry);
            graph.add_root(id.clone());
            queue.push_back(entry.clone());
        }

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            if visited.len() > self.max_modules {
                warn!(max = self.max_modules, "module limit reached, walk truncated");
                summary.truncated = true;
                break;
            }

            let id = path_id(&current);
            let source = match self.runtime.read_to_string(&current).await {
                Ok(source) => source,
                Err(e) => {
                    warn!(module = %id, "failed to read module: {}", e);
                    continue;
                }
            };
            summary.modules += 1;

            let imports = match extract_imports(&source, &current) {
                Ok(imports) => imports,
                Err(e) => {
                    warn!("{}", e);
                    summary.parse_failures += 1;
                    continue;
                }
            };

            for record in &imports {
                let resolved = match self.runtime.resolve(&record.source, &current).await {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        debug!(module = %id, specifier = %record.source, "skipping import: {}", e);
                        summary.unresolved += 1;
                        continue;
                    }
                };

                if !is_local_script(&resolved) {
                    continue;
                }

                let resolved_id = path_id(&resolved);
                graph.record_import(&id, resolved_id, record.source.as_str());
                if !visited.contains(&resolved) {
                    queue.push_back(resolved);
                }
            }

            session.on_module_parsed(&id, &imports, &graph);
        }

        debug!(
            modules = summary.modules,
            unresolved = summary.unresolved,
            "project walk complete"
        );
        (graph, summary)
    }
}

fn path_id(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// A script module outside `node_modules`.
pub fn is_local_script(path: &Path) -> bool {
    let in_node_modules = path
        .components()
        .any(|component| component.as_os_str() == "node_modules");
    let is_script = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext));
    is_script && !in_node_modules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::UsageOptions;
    use crate::runtime::test_utils::MemoryRuntime;

    #[test]
    fn test_is_local_script() {
        assert!(is_local_script(Path::new("/app/src/pages/home.tsx")));
        assert!(!is_local_script(Path::new("/app/src/graphql/operations/user.gql")));
        assert!(!is_local_script(Path::new("/app/node_modules/react/index.js")));
    }

    #[tokio::test]
    async fn test_walk_respects_module_limit() {
        let runtime = MemoryRuntime::new("/app")
            .with_file("src/a.ts", "import './b';")
            .with_file("src/b.ts", "import './c';")
            .with_file("src/c.ts", "");
        let mut session = UsageSession::new(UsageOptions::default()).unwrap();

        let (graph, summary) = ProjectWalker::new(&runtime)
            .with_max_modules(2)
            .walk(&[PathBuf::from("/app/src/a.ts")], &mut session)
            .await;

        assert!(summary.truncated);
        assert_eq!(summary.modules, 2);
        assert!(graph.contains("/app/src/c.ts"));
    }

    #[tokio::test]
    async fn test_walk_counts_unresolved_imports() {
        let runtime = MemoryRuntime::new("/app")
            .with_file("src/main.ts", "import React from 'react';\nimport './missing';");
        let mut session = UsageSession::new(UsageOptions::default()).unwrap();

        let (_, summary) = ProjectWalker::new(&runtime)
            .walk(&[PathBuf::from("/app/src/main.ts")], &mut session)
            .await;

        assert_eq!(summary.modules, 1);
        assert_eq!(summary.unresolved, 2);
        assert!(!summary.truncated);
    }
}
