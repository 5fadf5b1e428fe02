//! Rolldown plugin that reports GraphQL operation usage per route.
//!
//! The plugin watches the build through two hooks:
//!
//! ```text
//! transform()        ──▶ extract imports, record first-importer edges,
//!   (every module)        feed the UsageSession
//! generate_bundle()  ──▶ aggregate operation documents, merge with the
//!   (once)                route tree, append JSON assets to the bundle
//! ```
//!
//! Modules are never modified. The route tree is taken from a bundle asset
//! named like `routeTreePath` when another plugin emitted one in the same
//! build, and read from disk otherwise.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fob_graphql_usage::UsageOptions;
//! use fob_plugin_graphql_usage::GraphqlUsagePlugin;
//! use std::sync::Arc;
//!
//! # fn example() -> anyhow::Result<()> {
//! let options = UsageOptions::default().with_route_tree_path("routes.json");
//! let plugin = Arc::new(GraphqlUsagePlugin::native(options, "/app", [("@", "src")])?);
//! # let _ = plugin;
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use fob_graphql_usage::{
    Artifact, IssuerGraph, RouteNode, Runtime, RuntimeError, UsageError, UsageOptions, UsageSession,
    build_artifacts, extract_imports, is_local_script, load_route_tree, parse_route_tree,
};
use parking_lot::Mutex;
use rolldown_common::{Output, OutputAsset};
use rolldown_plugin::{
    HookGenerateBundleArgs, HookNoopReturn, HookTransformArgs, HookTransformReturn, HookUsage,
    Plugin, PluginContext, TransformPluginContext,
};
use tracing::{debug, info, warn};

/// Per-build state shared between hook invocations.
#[derive(Debug)]
struct BuildState {
    session: UsageSession,
    graph: IssuerGraph,
}

/// Rolldown plugin collecting per-route GraphQL usage.
///
/// Cloning is cheap and clones share the same build state.
#[derive(Debug, Clone)]
pub struct GraphqlUsagePlugin {
    options: Arc<UsageOptions>,
    runtime: Arc<dyn Runtime>,
    state: Arc<Mutex<BuildState>>,
}

impl GraphqlUsagePlugin {
    /// Create the plugin over an explicit runtime.
    ///
    /// Fails when a matcher or operation pattern in `options` is invalid.
    pub fn new(options: UsageOptions, runtime: Arc<dyn Runtime>) -> Result<Self, UsageError> {
        let session = UsageSession::new(options.clone())?;
        Ok(Self {
            options: Arc::new(options),
            runtime,
            state: Arc::new(Mutex::new(BuildState {
                session,
                graph: IssuerGraph::new(),
            })),
        })
    }

    /// Create the plugin over the native filesystem, resolving imports from
    /// `cwd` with the given path aliases (e.g. `@` → `src`).
    #[cfg(not(target_family = "wasm"))]
    pub fn native<I, K, V>(
        options: UsageOptions,
        cwd: impl Into<std::path::PathBuf>,
        aliases: I,
    ) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<std::path::PathBuf>,
    {
        let runtime = fob_graphql_usage::NativeRuntime::with_aliases(cwd, aliases);
        Self::new(options, Arc::new(runtime))
    }

    pub fn options(&self) -> &UsageOptions {
        &self.options
    }

    /// Record one transformed module.
    ///
    /// Returns the number of operation references attributed to an entry.
    pub async fn record_module(&self, id: &str, code: &str) -> usize {
        let path = Path::new(id);
        if !is_local_script(path) {
            return 0;
        }

        let imports = match extract_imports(code, path) {
            Ok(imports) => imports,
            Err(e) => {
                debug!("{}", e);
                return 0;
            }
        };

        let mut edges = Vec::new();
        for record in &imports {
            match self.runtime.resolve(&record.source, path).await {
                Ok(resolved) if is_local_script(&resolved) => {
                    edges.push((resolved.to_string_lossy().into_owned(), record.source.clone()));
                }
                Ok(_) => {}
                Err(e) => debug!(module = id, specifier = %record.source, "skipping import: {}", e),
            }
        }

        let mut state = self.state.lock();
        let BuildState { session, graph } = &mut *state;
        // Not imported by anything transformed so far: an entry of the build.
        if !graph.contains(id) {
            graph.add_root(id);
        }
        for (resolved, request) in edges {
            graph.record_import(id, resolved, request);
        }
        session.on_module_parsed(id, &imports, graph)
    }

    /// Close the current build: aggregate, merge with the route tree and
    /// return the artifacts to emit.
    ///
    /// `bundled_route_tree` is the source of a route tree asset found in the
    /// bundle, if any. A configured route tree that exists neither in the
    /// bundle nor on disk yields no artifacts. The plugin is ready for the
    /// next build afterwards.
    pub async fn finish_build(
        &self,
        bundled_route_tree: Option<&str>,
    ) -> Result<Vec<Artifact>, UsageError> {
        let mut build = {
            let mut state = self.state.lock();
            state.graph = IssuerGraph::new();
            state.session.take_build()
        };

        let outcome = build.aggregate(self.runtime.as_ref()).await;
        if !build.misses().is_empty() {
            debug!(
                misses = build.misses().len(),
                "operation references without a route entry"
            );
        }
        if outcome.usage.is_empty() {
            debug!("no GraphQL operation usage recorded");
            return Ok(Vec::new());
        }

        let routes = match self.route_tree(bundled_route_tree).await {
            Ok(routes) => routes,
            // Nothing to report against yet: the merge is skipped, not failed.
            Err(UsageError::Runtime(RuntimeError::FileNotFound(path))) => {
                warn!(path = %path.display(), "route tree not found; skipping the usage report");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        build_artifacts(&self.options, &outcome.usage, routes.as_deref())
    }

    async fn route_tree(
        &self,
        bundled: Option<&str>,
    ) -> Result<Option<Vec<RouteNode>>, UsageError> {
        let path = match self.options.require_route_tree_path() {
            Ok(path) => path,
            Err(e) => {
                warn!("{}; emitting the usage map only", e);
                return Ok(None);
            }
        };

        if let Some(source) = bundled {
            return parse_route_tree(source)
                .map(Some)
                .map_err(|e| UsageError::InvalidRouteTree {
                    path: path.into(),
                    message: e.to_string(),
                });
        }
        load_route_tree(self.runtime.as_ref(), Path::new(path))
            .await
            .map(Some)
    }
}

impl Plugin for GraphqlUsagePlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("fob:graphql-usage")
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::Transform | HookUsage::GenerateBundle
    }

    fn transform(
        &self,
        _ctx: Arc<TransformPluginContext>,
        args: &HookTransformArgs<'_>,
    ) -> impl std::future::Future<Output = HookTransformReturn> + Send {
        let plugin = self.clone();
        let code = args.code.to_string();
        let id = args.id.to_string();

        async move {
            plugin.record_module(&id, &code).await;
            // Don't modify the code
            Ok(None)
        }
    }

    fn generate_bundle(
        &self,
        _ctx: &PluginContext,
        args: &mut HookGenerateBundleArgs<'_>,
    ) -> impl std::future::Future<Output = HookNoopReturn> + Send {
        let plugin = self.clone();

        async move {
            let route_tree = plugin
                .options
                .route_tree_path
                .as_deref()
                .and_then(|name| find_asset_source(args.bundle.as_slice(), name));

            let artifacts = plugin
                .finish_build(route_tree.as_deref())
                .await
                .map_err(anyhow::Error::from)?;
            if artifacts.is_empty() {
                return Ok(());
            }

            // The report replaces any earlier asset of the same name.
            args.bundle.retain(|output| {
                !artifacts
                    .iter()
                    .any(|artifact| output_filename(output) == artifact.file_name)
            });
            for artifact in &artifacts {
                info!(
                    file = %artifact.file_name,
                    bytes = artifact.contents.len(),
                    "emitting GraphQL usage asset"
                );
            }
            args.bundle.extend(artifacts.into_iter().map(make_asset));

            Ok(())
        }
    }
}

fn find_asset_source(bundle: &[Output], name: &str) -> Option<String> {
    bundle.iter().find_map(|output| match output {
        Output::Asset(asset) if asset.filename.as_str() == name => {
            match std::str::from_utf8(asset.source.as_bytes()) {
                Ok(source) => Some(source.to_string()),
                Err(e) => {
                    warn!(asset = name, "route tree asset is not UTF-8: {}", e);
                    None
                }
            }
        }
        _ => None,
    })
}

fn output_filename(output: &Output) -> &str {
    match output {
        Output::Chunk(chunk) => chunk.filename.as_str(),
        Output::Asset(asset) => asset.filename.as_str(),
    }
}

fn make_asset(artifact: Artifact) -> Output {
    let asset = OutputAsset {
        names: vec![],
        original_file_names: vec![],
        filename: artifact.file_name.into(),
        source: artifact.contents.into(),
    };
    Output::Asset(Arc::new(asset))
}
