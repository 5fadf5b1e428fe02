//! Per-build table of operation references grouped by owning entry.

use indexmap::IndexMap;

/// An operation reference attributed to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationReference {
    pub operation_name: String,
    /// Module that holds the import; document requests resolve from here.
    pub owner_module: String,
    /// Operation document request, e.g. `@/graphql/operations/user.gql`.
    pub schema_document: String,
}

/// Entry request → references, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct EntryDependencyTable {
    entries: IndexMap<String, Vec<OperationReference>>,
}

impl EntryDependencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: impl Into<String>, reference: OperationReference) {
        self.entries.entry(entry.into()).or_default().push(reference);
    }

    pub fn get(&self, entry: &str) -> Option<&[OperationReference]> {
        self.entries.get(entry).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OperationReference)> {
        self.entries
            .iter()
            .flat_map(|(entry, refs)| refs.iter().map(move |r| (entry.as_str(), r)))
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Total number of references across all entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str) -> OperationReference {
        OperationReference {
            operation_name: name.into(),
            owner_module: "/app/src/pages/user/index.tsx".into(),
            schema_document: "@/graphql/operations/user.gql".into(),
        }
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut table = EntryDependencyTable::new();
        table.insert("@/pages/user/index", reference("User"));
        table.insert("@/pages/order/index", reference("Orders"));
        table.insert("@/pages/user/index", reference("SaveUser"));

        let flat: Vec<_> = table
            .iter()
            .map(|(entry, r)| (entry, r.operation_name.as_str()))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("@/pages/user/index", "User"),
                ("@/pages/user/index", "SaveUser"),
                ("@/pages/order/index", "Orders"),
            ]
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("@/pages/user/index").map(<[_]>::len), Some(2));
    }
}
