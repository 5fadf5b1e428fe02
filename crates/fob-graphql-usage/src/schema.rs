//! Operation documents (`.gql` files) and their per-build parse cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use apollo_parser::Parser;
use apollo_parser::cst;
use indexmap::IndexSet;
use rustc_hash::FxHashMap;

use crate::runtime::{Runtime, RuntimeError};
use crate::usage::OperationType;

/// A named operation and the top-level fields it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDefinition {
    pub name: String,
    pub operation_type: OperationType,
    /// Document order, no duplicates.
    pub selected_fields: IndexSet<String>,
}

/// Failure to load or parse an operation document.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    #[error("syntax errors in {}: {}", .path.display(), .errors.join("; "))]
    Syntax { path: PathBuf, errors: Vec<String> },
}

/// Parsed operation document, keyed by lower-cased operation name.
#[derive(Debug, Clone, Default)]
pub struct SchemaDocument {
    operations: FxHashMap<String, OperationDefinition>,
}

impl SchemaDocument {
    /// Parse a document. Anonymous operations and fragments are ignored; on a
    /// duplicate name the first definition is kept.
    pub fn parse(source: &str, path: &Path) -> Result<Self, SchemaError> {
        let tree = Parser::new(source).parse();

        let errors: Vec<String> = tree.errors().map(|e| e.message().to_string()).collect();
        if !errors.is_empty() {
            return Err(SchemaError::Syntax {
                path: path.to_path_buf(),
                errors,
            });
        }

        let mut operations = FxHashMap::default();
        for definition in tree.document().definitions() {
            let cst::Definition::OperationDefinition(op) = definition else {
                continue;
            };
            let Some(name) = op.name().map(|n| n.text().to_string()) else {
                continue;
            };

            let operation_type = op
                .operation_type()
                .map(|ty| {
                    if ty.mutation_token().is_some() {
                        OperationType::Mutation
                    } else if ty.subscription_token().is_some() {
                        OperationType::Subscription
                    } else {
                        OperationType::Query
                    }
                })
                .unwrap_or(OperationType::Query);

            let selected_fields = op
                .selection_set()
                .map(|set| {
                    set.selections()
                        .filter_map(|selection| match selection {
                            cst::Selection::Field(field) => {
                                field.name().map(|n| n.text().to_string())
                            }
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default();

            operations
                .entry(name.to_lowercase())
                .or_insert(OperationDefinition {
                    name,
                    operation_type,
                    selected_fields,
                });
        }

        Ok(Self { operations })
    }

    /// Case-insensitive operation lookup.
    pub fn operation(&self, name: &str) -> Option<&OperationDefinition> {
        self.operations.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Parse-once cache keyed by absolute path. Failures are cached too.
#[derive(Debug, Default)]
pub struct SchemaDocumentCache {
    documents: FxHashMap<PathBuf, Result<Arc<SchemaDocument>, SchemaError>>,
    parse_count: usize,
}

impl SchemaDocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached document for `path`, loading it through `runtime` on first use.
    pub async fn load(
        &mut self,
        runtime: &dyn Runtime,
        path: &Path,
    ) -> Result<Arc<SchemaDocument>, SchemaError> {
        if let Some(cached) = self.documents.get(path) {
            return cached.clone();
        }

        let result = match runtime.read_to_string(path).await {
            Ok(source) => {
                self.parse_count += 1;
                SchemaDocument::parse(&source, path).map(Arc::new)
            }
            Err(source) => Err(SchemaError::Read {
                path: path.to_path_buf(),
                source,
            }),
        };
        self.documents.insert(path.to_path_buf(), result.clone());
        result
    }

    /// Number of documents actually parsed.
    pub fn parse_count(&self) -> usize {
        self.parse_count
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::test_utils::MemoryRuntime;

    const USER_GQL: &str = r#"
        query User($id: ID!) {
          id
          name
          ...UserExtra
          ... on Query { ignored }
          id
        }

        mutation SaveUser($input: UserInput!) {
          saveUser(input: $input) { ok }
        }

        subscription UserChanged { userChanged { id } }

        query { anonymous }

        fragment UserExtra on Query { extra }
    "#;

    #[test]
    fn test_parse_operations() {
        let doc = SchemaDocument::parse(USER_GQL, Path::new("user.gql")).unwrap();
        assert_eq!(doc.len(), 3);

        let user = doc.operation("user").unwrap();
        assert_eq!(user.operation_type, OperationType::Query);
        assert_eq!(
            user.selected_fields.iter().collect::<Vec<_>>(),
            vec!["id", "name"]
        );

        let save = doc.operation("SAVEUSER").unwrap();
        assert_eq!(save.operation_type, OperationType::Mutation);
        assert_eq!(save.selected_fields.iter().collect::<Vec<_>>(), vec!["saveUser"]);

        assert_eq!(
            doc.operation("UserChanged").unwrap().operation_type,
            OperationType::Subscription
        );
        assert!(doc.operation("UserExtra").is_none());
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let doc = SchemaDocument::parse(
            "query Dup { first } query dup { second }",
            Path::new("dup.gql"),
        )
        .unwrap();
        assert_eq!(
            doc.operation("DUP").unwrap().selected_fields.iter().collect::<Vec<_>>(),
            vec!["first"]
        );
    }

    #[test]
    fn test_syntax_error() {
        let err = SchemaDocument::parse("query User { id", Path::new("broken.gql")).unwrap_err();
        assert!(matches!(err, SchemaError::Syntax { .. }));
    }

    #[tokio::test]
    async fn test_cache_parses_once() {
        let runtime = MemoryRuntime::new("/app").with_file("user.gql", USER_GQL);
        let mut cache = SchemaDocumentCache::new();
        let path = Path::new("/app/user.gql");

        let first = cache.load(&runtime, path).await.unwrap();
        let second = cache.load(&runtime, path).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.parse_count(), 1);
        assert_eq!(runtime.read_count(path), 1);
    }

    #[tokio::test]
    async fn test_cache_remembers_failures() {
        let runtime = MemoryRuntime::new("/app").with_file("broken.gql", "query {");
        let mut cache = SchemaDocumentCache::new();

        let missing = Path::new("/app/missing.gql");
        assert!(matches!(
            cache.load(&runtime, missing).await,
            Err(SchemaError::Read { .. })
        ));
        assert!(cache.load(&runtime, missing).await.is_err());
        assert_eq!(runtime.read_count(missing), 1);

        let broken = Path::new("/app/broken.gql");
        assert!(matches!(
            cache.load(&runtime, broken).await,
            Err(SchemaError::Syntax { .. })
        ));
        assert_eq!(cache.parse_count(), 1);
    }
}
