//! # fob-graphql-usage
//!
//! Per-route GraphQL operation usage statistics, collected from a module graph.
//!
//! For every page of an application this answers "which queries and mutations
//! does it use, and which of them sit behind an access key?".
//!
//! ## Pipeline
//!
//! ```text
//!  module parsed ──▶ ReferenceInterceptor ──▶ EntryResolver ──▶ EntryDependencyTable
//!   (imports)        (useXQuery, XDocument)    (issuer chain)          │
//!                                                                      ▼
//!  route tree ─────────────────────────────▶ merge_routes ◀── aggregate (resolve .gql,
//!                                                 │            parse once, dedup)
//!                                                 ▼
//!                                           Vec<ReportNode>
//! ```
//!
//! Hosts drive a [`UsageSession`]: the Rolldown plugin from its `transform`
//! and `generate_bundle` hooks, the CLI from a [`ProjectWalker`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fob_graphql_usage::{
//!     IssuerGraph, NativeRuntime, UsageOptions, UsageSession, extract_imports, merge_routes,
//!     parse_route_tree,
//! };
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = NativeRuntime::with_aliases("/app", [("@", "src")]);
//! let mut session = UsageSession::new(UsageOptions::default())?;
//!
//! let mut graph = IssuerGraph::new();
//! graph.add_root("@/pages/user/index");
//! let code = "import { useUserQuery } from '@/graphql/operations/__generated__/user';";
//! let imports = extract_imports(code, Path::new("/app/src/pages/user/index.tsx"))?;
//! session.on_module_parsed("@/pages/user/index", &imports, &graph);
//!
//! let outcome = session.aggregate(&runtime).await;
//! let routes = parse_route_tree(r#"[{ "component": "@/pages/user/index" }]"#)?;
//! let report = merge_routes(&routes, &outcome.usage);
//! # let _ = report;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod artifact;
pub mod attribution;
pub mod error;
pub mod imports;
pub mod interceptor;
pub mod options;
pub mod report;
pub mod route;
pub mod runtime;
pub mod schema;
pub mod session;
pub mod table;
pub mod usage;
pub mod walker;

#[cfg(feature = "logging")]
pub mod logging;

#[cfg(test)]
mod tests;

pub use aggregator::{AggregationOutcome, FailureReason, ResolutionFailure, aggregate};
pub use artifact::{Artifact, build_artifacts, report_artifact, usage_artifact, write_artifacts};
pub use attribution::{AncestryLookup, EntryResolver, IssuerGraph, ancestry_paths};
pub use error::{Result, UsageError};
pub use imports::{
    ImportKind, ImportParseError, ImportRecord, extract_imports, rewrite_loadable_components,
};
pub use interceptor::{
    InterceptedReference, OperationPattern, PatternTable, ReferenceInterceptor,
    schema_document_path,
};
pub use options::{CompiledMatcher, PathMatcher, UsageOptions};
pub use report::{ReportNode, merge_route, merge_routes};
pub use route::{
    BreadcrumbItem, BreadcrumbMeta, MenuMeta, RouteComponent, RouteMeta, RouteNode,
    load_route_tree, parse_route_tree,
};
pub use runtime::{Runtime, RuntimeError, RuntimeResult};
pub use schema::{OperationDefinition, SchemaDocument, SchemaDocumentCache, SchemaError};
pub use session::{AttributionMiss, UsageSession};
pub use table::{EntryDependencyTable, OperationReference};
pub use usage::{OperationType, UsageByEntryMap, UsageItem};
pub use walker::{DEFAULT_MAX_MODULES, ProjectWalker, WalkSummary, is_local_script};

#[cfg(not(target_family = "wasm"))]
pub use runtime::native::NativeRuntime;
