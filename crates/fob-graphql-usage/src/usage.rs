//! Usage items and the per-entry usage map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// GraphQL operation type, serialized lowercase like the GraphQL keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        };
        f.write_str(name)
    }
}

/// One top-level field used by an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageItem {
    pub operation: OperationType,
    pub name: String,
}

impl UsageItem {
    pub fn new(operation: OperationType, name: impl Into<String>) -> Self {
        Self {
            operation,
            name: name.into(),
        }
    }
}

/// Entry request → usage items. No entry holds the same item twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageByEntryMap {
    entries: IndexMap<String, Vec<UsageItem>>,
}

impl UsageByEntryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` to `entry` unless it is already present.
    pub fn push_unique(&mut self, entry: &str, item: UsageItem) -> bool {
        let items = match self.entries.get_mut(entry) {
            Some(items) => items,
            None => self.entries.entry(entry.to_string()).or_default(),
        };
        if items.contains(&item) {
            return false;
        }
        items.push(item);
        true
    }

    pub fn get(&self, entry: &str) -> Option<&[UsageItem]> {
        self.entries.get(entry).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[UsageItem])> {
        self.entries
            .iter()
            .map(|(entry, items)| (entry.as_str(), items.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Vec<UsageItem>)> for UsageByEntryMap {
    fn from_iter<T: IntoIterator<Item = (String, Vec<UsageItem>)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (entry, items) in iter {
            for item in items {
                map.push_unique(&entry, item);
            }
        }
        map
    }
}
