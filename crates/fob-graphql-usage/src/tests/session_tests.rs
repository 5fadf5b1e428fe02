use std::path::Path;

use crate::attribution::IssuerGraph;
use crate::imports::extract_imports;
use crate::options::{PathMatcher, UsageOptions};
use crate::runtime::test_utils::MemoryRuntime;
use crate::session::{AttributionMiss, UsageSession};
use crate::usage::{OperationType, UsageItem};

const USER_PAGE: &str = r#"
import { UserDocument } from '@/graphql/operations/__generated__/user';
import { useQuery } from '@apollo/client';

export default function UserPage() {
  const { data } = useQuery(UserDocument);
  return data;
}
"#;

const USER_TABLE: &str = r#"
import { UserDocument, useSaveUserMutation } from '@/graphql/operations/__generated__/user';
export const UserTable = () => [UserDocument, useSaveUserMutation];
"#;

fn runtime() -> MemoryRuntime {
    MemoryRuntime::new("/app").with_alias("@", "src").with_file(
        "src/graphql/operations/user.gql",
        "query User { id name }\nmutation SaveUser { saveUser }",
    )
}

fn graph() -> IssuerGraph {
    let mut graph = IssuerGraph::new();
    graph.add_root("/app/src/routes.ts");
    graph.record_import(
        "/app/src/routes.ts",
        "/app/src/pages/user/index.tsx",
        "@/pages/user/index",
    );
    graph.record_import(
        "/app/src/pages/user/index.tsx",
        "/app/src/components/UserTable.tsx",
        "@/components/UserTable",
    );
    graph
}

fn parsed(code: &str, path: &str) -> Vec<crate::imports::ImportRecord> {
    extract_imports(code, Path::new(path)).unwrap()
}

#[tokio::test]
async fn test_duplicate_imports_within_entry_dedup() {
    let graph = graph();
    let mut session = UsageSession::new(UsageOptions::default()).unwrap();

    let page = "/app/src/pages/user/index.tsx";
    let table = "/app/src/components/UserTable.tsx";
    assert_eq!(session.on_module_parsed(page, &parsed(USER_PAGE, page), &graph), 1);
    assert_eq!(session.on_module_parsed(table, &parsed(USER_TABLE, table), &graph), 2);
    assert_eq!(session.table().len(), 3);

    let outcome = session.aggregate(&runtime()).await;
    assert_eq!(
        outcome.usage.get("@/pages/user/index").unwrap(),
        &[
            UsageItem::new(OperationType::Query, "id"),
            UsageItem::new(OperationType::Query, "name"),
            UsageItem::new(OperationType::Mutation, "saveUser"),
        ]
    );
    assert_eq!(session.parsed_documents(), 1);
}

#[tokio::test]
async fn test_attribution_miss_is_recorded_not_fatal() {
    let mut graph = graph();
    graph.record_import(
        "/app/src/routes.ts",
        "/app/src/layout/Header.tsx",
        "@/layout/Header",
    );
    let mut session = UsageSession::new(UsageOptions::default()).unwrap();

    let header = "/app/src/layout/Header.tsx";
    let attributed = session.on_module_parsed(header, &parsed(USER_TABLE, header), &graph);

    assert_eq!(attributed, 0);
    assert_eq!(
        session.misses(),
        &[
            AttributionMiss {
                module: header.to_string(),
                export_name: "UserDocument".to_string(),
            },
            AttributionMiss {
                module: header.to_string(),
                export_name: "useSaveUserMutation".to_string(),
            },
        ]
    );

    let outcome = session.aggregate(&runtime()).await;
    assert!(outcome.usage.is_empty());
}

#[tokio::test]
async fn test_custom_entry_matcher() {
    let options = UsageOptions {
        entry_matcher: PathMatcher::Regex(r"^@/components/".into()),
        ..Default::default()
    };
    let graph = graph();
    let mut session = UsageSession::new(options).unwrap();

    let table = "/app/src/components/UserTable.tsx";
    session.on_module_parsed(table, &parsed(USER_TABLE, table), &graph);

    let entries: Vec<_> = session.table().entries().collect();
    assert_eq!(entries, vec!["@/components/UserTable"]);
}

#[tokio::test]
async fn test_reset_starts_a_clean_build() {
    let graph = graph();
    let mut session = UsageSession::new(UsageOptions::default()).unwrap();
    let page = "/app/src/pages/user/index.tsx";

    session.on_module_parsed(page, &parsed(USER_PAGE, page), &graph);
    session.aggregate(&runtime()).await;
    assert_eq!(session.parsed_documents(), 1);

    session.reset();
    assert!(session.table().is_empty());
    assert!(session.misses().is_empty());
    assert_eq!(session.parsed_documents(), 0);

    let outcome = session.aggregate(&runtime()).await;
    assert!(outcome.usage.is_empty());
}

#[tokio::test]
async fn test_take_build_detaches_recorded_state() {
    let graph = graph();
    let mut session = UsageSession::new(UsageOptions::default()).unwrap();
    let page = "/app/src/pages/user/index.tsx";
    session.on_module_parsed(page, &parsed(USER_PAGE, page), &graph);

    let mut build = session.take_build();
    assert!(session.table().is_empty());
    assert_eq!(build.table().len(), 1);

    let outcome = build.aggregate(&runtime()).await;
    assert_eq!(outcome.usage.len(), 1);
    assert_eq!(session.parsed_documents(), 0);

    // the live session keeps its compiled options
    session.on_module_parsed(page, &parsed(USER_PAGE, page), &graph);
    assert_eq!(session.table().len(), 1);
}

#[test]
fn test_invalid_pattern_is_rejected_up_front() {
    let options = UsageOptions {
        operation_patterns: vec!["^use(.+Query$".into()],
        ..Default::default()
    };
    assert!(UsageSession::new(options).is_err());
}
