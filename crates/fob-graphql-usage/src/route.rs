//! Route tree input, as produced by the convention route generator.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, UsageError};
use crate::runtime::Runtime;

/// One route. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNode {
    #[serde(default)]
    pub component: RouteComponent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,
    #[serde(default)]
    pub meta: RouteMeta,
    #[serde(default)]
    pub routes: Vec<RouteNode>,
}

/// A component request string, or anything else the generator left in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteComponent {
    Request(String),
    Other(Value),
}

impl Default for RouteComponent {
    fn default() -> Self {
        RouteComponent::Other(Value::Null)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<MenuMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadcrumb: Option<BreadcrumbMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuMeta {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreadcrumbMeta {
    #[serde(default)]
    pub items: Vec<BreadcrumbItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreadcrumbItem {
    #[serde(default)]
    pub name: String,
}

impl RouteNode {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: RouteComponent::Request(component.into()),
            ..Default::default()
        }
    }

    pub fn with_auth_key(mut self, auth_key: impl Into<String>) -> Self {
        self.auth_key = Some(auth_key.into());
        self
    }

    pub fn with_menu_title(mut self, title: impl Into<String>) -> Self {
        self.meta.menu = Some(MenuMeta {
            title: Some(title.into()),
        });
        self
    }

    pub fn with_breadcrumb<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.breadcrumb = Some(BreadcrumbMeta {
            items: names
                .into_iter()
                .map(|name| BreadcrumbItem { name: name.into() })
                .collect(),
        });
        self
    }

    pub fn with_routes(mut self, routes: Vec<RouteNode>) -> Self {
        self.routes = routes;
        self
    }

    /// Usage map key, when the component is a request string.
    pub fn component_request(&self) -> Option<&str> {
        match &self.component {
            RouteComponent::Request(request) => Some(request),
            RouteComponent::Other(_) => None,
        }
    }

    /// Access key, if set and non-empty.
    pub fn auth_key(&self) -> Option<&str> {
        self.auth_key.as_deref().filter(|key| !key.is_empty())
    }

    /// Breadcrumb names joined with `/`, else the menu title, else empty.
    pub fn title(&self) -> String {
        let breadcrumb = self
            .meta
            .breadcrumb
            .as_ref()
            .map(|b| {
                b.items
                    .iter()
                    .map(|item| item.name.as_str())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default();
        if !breadcrumb.is_empty() {
            return breadcrumb;
        }
        self.meta
            .menu
            .as_ref()
            .and_then(|menu| menu.title.clone())
            .unwrap_or_default()
    }
}

/// Parse a route tree: a JSON array of route nodes.
pub fn parse_route_tree(json: &str) -> std::result::Result<Vec<RouteNode>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Read and parse the route tree at `path`. Relative paths are taken from
/// the runtime's working directory.
pub async fn load_route_tree(runtime: &dyn Runtime, path: &Path) -> Result<Vec<RouteNode>> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        runtime.get_cwd()?.join(path)
    };
    let json = runtime.read_to_string(&path).await?;
    parse_route_tree(&json).map_err(|e| UsageError::InvalidRouteTree {
        path,
        message: e.to_string(),
    })
}
