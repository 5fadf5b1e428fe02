//! Route tree merge: per-entry usage folded into the route hierarchy.
//!
//! Post-order. A merged child without an access key is promoted (its
//! operations join the parent's, its own kept children move up to the
//! parent); a child with an access key stays a separate node. Nodes left
//! with no operations and no children are pruned.

use serde::{Deserialize, Serialize};

use crate::route::RouteNode;
use crate::usage::{UsageByEntryMap, UsageItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportNode {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,
    pub operations: Vec<UsageItem>,
    /// `None` rather than an empty list when nothing is kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ReportNode>>,
}

/// Merge one route. `None` means the branch is pruned.
///
/// Protected routes below an unprotected child are not lost when that child
/// is promoted: they are intentionally lifted into this node's children, so
/// every access boundary in the tree survives in the report. A merge that
/// discards the promoted child's whole subtree would drop them instead.
pub fn merge_route(node: &RouteNode, usage: &UsageByEntryMap) -> Option<ReportNode> {
    let mut operations: Vec<UsageItem> = node
        .component_request()
        .and_then(|request| usage.get(request))
        .map(<[UsageItem]>::to_vec)
        .unwrap_or_default();
    let mut children = Vec::new();

    for merged in node.routes.iter().filter_map(|child| merge_route(child, usage)) {
        if merged.auth_key.is_some() {
            children.push(merged);
        } else {
            operations.extend(merged.operations);
            // lifted, not dropped
            children.extend(merged.children.unwrap_or_default());
        }
    }

    if operations.is_empty() && children.is_empty() {
        return None;
    }

    Some(ReportNode {
        title: node.title(),
        auth_key: node.auth_key().map(str::to_string),
        operations,
        children: (!children.is_empty()).then_some(children),
    })
}

/// Merge a route forest, dropping pruned roots.
pub fn merge_routes(routes: &[RouteNode], usage: &UsageByEntryMap) -> Vec<ReportNode> {
    routes
        .iter()
        .filter_map(|route| merge_route(route, usage))
        .collect()
}
