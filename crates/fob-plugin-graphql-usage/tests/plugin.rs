//! Drives the plugin the way the bundler does: modules are reported in
//! discovery order, then the build is closed.

use std::sync::Arc;

use fob_graphql_usage::runtime::test_utils::MemoryRuntime;
use fob_graphql_usage::{UsageError, UsageOptions};
use fob_plugin_graphql_usage::GraphqlUsagePlugin;
use rolldown_plugin::{HookUsage, Plugin};
use serde_json::{Value, json};

const ROUTES: &str = r#"
const routes = [
  { component: () => import('@/pages/user/index') },
  { component: () => import('@/pages/user/detail') },
];
export default routes;
"#;

const USER_PAGE: &str = r#"
import { UserDocument } from '@/graphql/operations/__generated__/user';
import './user.css';
export default () => UserDocument;
"#;

const DETAIL_PAGE: &str = r#"
import { useUserDetailQuery } from '@/graphql/operations/__generated__/user';
export default () => useUserDetailQuery;
"#;

const ROUTE_TREE: &str = r#"[{
  "component": "@/pages/user/index",
  "meta": { "menu": { "title": "Users" } },
  "routes": [{
    "component": "@/pages/user/detail",
    "authKey": "user:detail",
    "meta": { "menu": { "title": "Detail" } }
  }]
}]"#;

fn runtime() -> MemoryRuntime {
    MemoryRuntime::new("/app")
        .with_alias("@", "src")
        .with_file("src/routes.ts", ROUTES)
        .with_file("src/pages/user/index.tsx", USER_PAGE)
        .with_file("src/pages/user/user.css", "")
        .with_file("src/pages/user/detail.tsx", DETAIL_PAGE)
        .with_file(
            "src/graphql/operations/__generated__/user.ts",
            "export const UserDocument = {};\nexport const useUserDetailQuery = () => {};",
        )
        .with_file(
            "src/graphql/operations/user.gql",
            "query User { id name }\nquery UserDetail { detail }",
        )
}

fn plugin(options: UsageOptions, runtime: MemoryRuntime) -> GraphqlUsagePlugin {
    GraphqlUsagePlugin::new(options, Arc::new(runtime)).unwrap()
}

async fn transform_all(plugin: &GraphqlUsagePlugin) -> usize {
    let mut attributed = 0;
    for (id, code) in [
        ("/app/src/routes.ts", ROUTES),
        ("/app/src/pages/user/index.tsx", USER_PAGE),
        ("/app/src/pages/user/user.css", ""),
        ("/app/src/pages/user/detail.tsx", DETAIL_PAGE),
        (
            "/app/src/graphql/operations/__generated__/user.ts",
            "export const UserDocument = {};",
        ),
    ] {
        attributed += plugin.record_module(id, code).await;
    }
    attributed
}

#[test]
fn test_plugin_hooks() {
    let plugin = plugin(UsageOptions::default(), runtime());
    assert_eq!(plugin.name(), "fob:graphql-usage");
    let hooks = plugin.register_hook_usage();
    assert!(hooks.contains(HookUsage::Transform));
    assert!(hooks.contains(HookUsage::GenerateBundle));
    assert!(!hooks.contains(HookUsage::Load));
}

#[test]
fn test_invalid_options_are_rejected() {
    let options = UsageOptions {
        operation_patterns: vec!["^use.+Query$".into()],
        ..Default::default()
    };
    let err = GraphqlUsagePlugin::new(options, Arc::new(runtime())).unwrap_err();
    assert!(matches!(err, UsageError::MissingCapture { .. }));
}

#[tokio::test]
async fn test_report_from_route_tree_on_disk() {
    let runtime = runtime().with_file("dist/routes.json", ROUTE_TREE);
    let options = UsageOptions::default().with_route_tree_path("dist/routes.json");
    let plugin = plugin(options, runtime);

    assert_eq!(transform_all(&plugin).await, 2);
    let artifacts = plugin.finish_build(None).await.unwrap();

    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].file_name, "graphql-usage.json");
    let report: Value = serde_json::from_str(&artifacts[0].contents).unwrap();
    assert_eq!(
        report,
        json!([{
            "title": "Users",
            "operations": [
                { "operation": "query", "name": "id" },
                { "operation": "query", "name": "name" }
            ],
            "children": [{
                "title": "Detail",
                "authKey": "user:detail",
                "operations": [{ "operation": "query", "name": "detail" }]
            }]
        }])
    );
}

#[tokio::test]
async fn test_bundled_route_tree_takes_precedence() {
    let options = UsageOptions::default().with_route_tree_path("routes.json");
    let plugin = plugin(options, runtime());
    transform_all(&plugin).await;

    // no routes.json on disk: only the bundled source can satisfy this
    let flat_tree = r#"[
        { "component": "@/pages/user/index", "meta": { "menu": { "title": "Users" } } },
        { "component": "@/pages/user/detail", "meta": { "menu": { "title": "Detail" } } }
    ]"#;
    let artifacts = plugin.finish_build(Some(flat_tree)).await.unwrap();

    let report: Value = serde_json::from_str(&artifacts[0].contents).unwrap();
    assert_eq!(report.as_array().map(Vec::len), Some(2));
    assert_eq!(report[1]["title"], "Detail");
}

#[tokio::test]
async fn test_missing_route_tree_skips_the_report() {
    let options = UsageOptions::default().with_route_tree_path("dist/routes.json");
    let plugin = plugin(options, runtime());
    assert_eq!(transform_all(&plugin).await, 2);

    // configured, but neither bundled nor on disk
    let artifacts = plugin.finish_build(None).await.unwrap();
    assert!(artifacts.is_empty());
}

#[tokio::test]
async fn test_usage_map_without_route_tree_path() {
    let plugin = plugin(UsageOptions::default(), runtime());
    transform_all(&plugin).await;

    let artifacts = plugin.finish_build(None).await.unwrap();
    assert_eq!(artifacts.len(), 1);
    let usage: Value = serde_json::from_str(&artifacts[0].contents).unwrap();
    assert_eq!(
        usage,
        json!({
            "@/pages/user/index": [
                { "operation": "query", "name": "id" },
                { "operation": "query", "name": "name" }
            ],
            "@/pages/user/detail": [{ "operation": "query", "name": "detail" }]
        })
    );
}

#[tokio::test]
async fn test_intermediate_map_kept_next_to_report() {
    let options = UsageOptions {
        emit_intermediate: true,
        output_path: "stats/usage.json".into(),
        ..UsageOptions::default().with_route_tree_path("routes.json")
    };
    let plugin = plugin(options, runtime());
    transform_all(&plugin).await;

    let artifacts = plugin.finish_build(Some(ROUTE_TREE)).await.unwrap();
    let names: Vec<_> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
    assert_eq!(names, vec!["stats/usage.raw.json", "stats/usage.json"]);
}

#[tokio::test]
async fn test_invalid_route_tree_fails_the_build() {
    let options = UsageOptions::default().with_route_tree_path("routes.json");
    let plugin = plugin(options, runtime());
    transform_all(&plugin).await;

    let err = plugin
        .finish_build(Some(r#"{ "routes": [] }"#))
        .await
        .unwrap_err();
    assert!(matches!(err, UsageError::InvalidRouteTree { .. }));
}

#[tokio::test]
async fn test_each_build_starts_clean() {
    let plugin = plugin(UsageOptions::default(), runtime());
    transform_all(&plugin).await;
    assert_eq!(plugin.finish_build(None).await.unwrap().len(), 1);

    // nothing transformed since the last build
    assert!(plugin.finish_build(None).await.unwrap().is_empty());

    transform_all(&plugin).await;
    assert_eq!(plugin.finish_build(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_script_and_dependency_modules_are_ignored() {
    let plugin = plugin(UsageOptions::default(), runtime());

    let code = "import { UserDocument } from '@/graphql/operations/__generated__/user';";
    assert_eq!(plugin.record_module("/app/src/pages/user/user.css", code).await, 0);
    assert_eq!(
        plugin
            .record_module("/app/node_modules/pages/index.js", code)
            .await,
        0
    );
    assert_eq!(plugin.record_module("\0virtual:pages", code).await, 0);
    assert!(plugin.finish_build(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reference_outside_any_page_is_not_reported() {
    let plugin = plugin(UsageOptions::default(), runtime());
    let code = "import { UserDocument } from '@/graphql/operations/__generated__/user';";

    assert_eq!(plugin.record_module("/app/src/main.ts", code).await, 0);
    assert!(plugin.finish_build(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_native_runtime_reads_project_files() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();
    for (rel, contents) in [
        ("src/pages/user/index.tsx", USER_PAGE),
        (
            "src/graphql/operations/__generated__/user.ts",
            "export const UserDocument = {};",
        ),
        ("src/graphql/operations/user.gql", "query User { id }"),
    ] {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    let plugin =
        GraphqlUsagePlugin::native(UsageOptions::default(), &root, [("@", "src")]).unwrap();
    let page = root.join("src/pages/user/index.tsx");
    assert_eq!(plugin.record_module(page.to_str().unwrap(), USER_PAGE).await, 1);

    let artifacts = plugin.finish_build(None).await.unwrap();
    let usage: Value = serde_json::from_str(&artifacts[0].contents).unwrap();
    assert_eq!(
        usage[page.to_str().unwrap()],
        json!([{ "operation": "query", "name": "id" }])
    );
}
