//! Recognises operation references among imports of generated API clients.
//!
//! An import like `import { useUserQuery } from '@/graphql/operations/__generated__/user'`
//! names the operation `User`, defined in `@/graphql/operations/user.gql`.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Result, UsageError};
use crate::imports::{ImportKind, ImportRecord};
use crate::options::{CompiledMatcher, UsageOptions};

/// One export-name convention with a capture group for the operation name.
#[derive(Debug, Clone)]
pub struct OperationPattern {
    regex: Regex,
}

impl OperationPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| UsageError::InvalidPattern {
            field: "operationPatterns",
            pattern: pattern.to_string(),
            source,
        })?;
        if regex.captures_len() < 2 {
            return Err(UsageError::MissingCapture {
                pattern: pattern.to_string(),
            });
        }
        Ok(Self { regex })
    }

    /// Operation name captured from `export_name`. An empty capture is no match.
    pub fn extract<'n>(&self, export_name: &'n str) -> Option<&'n str> {
        self.regex
            .captures(export_name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Ordered pattern list, first match wins.
#[derive(Debug, Clone)]
pub struct PatternTable {
    patterns: Vec<OperationPattern>,
}

impl PatternTable {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| OperationPattern::new(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn classify<'n>(&self, export_name: &'n str) -> Option<&'n str> {
        self.patterns.iter().find_map(|p| p.extract(export_name))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// A matched import, before attribution to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedReference {
    pub export_name: String,
    pub operation_name: String,
    /// Import source of the generated client module.
    pub client_source: String,
    /// Request for the operation document, derived from `client_source`.
    pub schema_document: String,
}

#[derive(Debug, Clone)]
pub struct ReferenceInterceptor {
    client: CompiledMatcher,
    patterns: PatternTable,
}

impl ReferenceInterceptor {
    pub fn new(client: CompiledMatcher, patterns: PatternTable) -> Self {
        Self { client, patterns }
    }

    pub fn from_options(options: &UsageOptions) -> Result<Self> {
        Ok(Self::new(
            options.client_matcher.compile("clientMatcher")?,
            PatternTable::new(&options.operation_patterns)?,
        ))
    }

    /// Classify a single named import.
    pub fn intercept_import(&self, source: &str, export_name: &str) -> Option<InterceptedReference> {
        if !self.client.is_match(source) {
            return None;
        }
        let operation_name = self.patterns.classify(export_name)?;
        Some(InterceptedReference {
            export_name: export_name.to_string(),
            operation_name: operation_name.to_string(),
            client_source: source.to_string(),
            schema_document: schema_document_path(source),
        })
    }

    /// Classify every named static import of a module, in source order.
    pub fn intercept(&self, imports: &[ImportRecord]) -> Vec<InterceptedReference> {
        imports
            .iter()
            .filter(|record| record.kind == ImportKind::Static)
            .flat_map(|record| {
                record
                    .names
                    .iter()
                    .filter_map(|name| self.intercept_import(&record.source, name))
            })
            .collect()
    }
}

static GENERATED_SEGMENT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"__generated__/(.+?)(?:\.(?:ts|tsx|js|jsx|mjs))?$").ok()
});

/// Map a generated client request to its operation document request.
///
/// `__generated__/<name>` becomes `<name>.gql`; requests without a generated
/// segment are returned unchanged.
pub fn schema_document_path(source: &str) -> String {
    match GENERATED_SEGMENT.as_ref() {
        Some(re) => re.replace(source, "${1}.gql").into_owned(),
        None => source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PathMatcher;

    fn interceptor() -> ReferenceInterceptor {
        ReferenceInterceptor::from_options(&UsageOptions::default()).unwrap()
    }

    #[test]
    fn test_default_patterns() {
        let table = PatternTable::new(crate::options::DEFAULT_OPERATION_PATTERNS).unwrap();

        assert_eq!(table.classify("UserDocument"), Some("User"));
        assert_eq!(table.classify("useUserLazyQuery"), Some("User"));
        assert_eq!(table.classify("useUserListQuery"), Some("UserList"));
        assert_eq!(table.classify("useSaveUserMutation"), Some("SaveUser"));
        assert_eq!(table.classify("UserFragmentDoc"), None);
        assert_eq!(table.classify("useState"), None);
    }

    #[test]
    fn test_first_match_wins() {
        // LazyQuery is listed before Query, so the Lazy suffix is not captured
        let table = PatternTable::new(crate::options::DEFAULT_OPERATION_PATTERNS).unwrap();
        assert_eq!(table.classify("useUserLazyQuery"), Some("User"));

        let custom = PatternTable::new(["^use(.+)Query$", "^use(.+)LazyQuery$"]).unwrap();
        assert_eq!(custom.classify("useUserLazyQuery"), Some("UserLazy"));
    }

    #[test]
    fn test_empty_capture_is_not_a_match() {
        let table = PatternTable::new(crate::options::DEFAULT_OPERATION_PATTERNS).unwrap();
        assert_eq!(table.classify("Document"), None);
        assert_eq!(table.classify("useQuery"), None);

        let lenient = PatternTable::new(["^(.*)Document$"]).unwrap();
        assert_eq!(lenient.classify("Document"), None);
    }

    #[test]
    fn test_pattern_without_capture_is_rejected() {
        let err = PatternTable::new(["^use.+Query$"]).unwrap_err();
        assert!(matches!(err, UsageError::MissingCapture { .. }));
    }

    #[test]
    fn test_intercept_filters_client_modules() {
        let imports = vec![
            ImportRecord {
                source: "@/graphql/operations/__generated__/user".into(),
                kind: ImportKind::Static,
                names: vec!["UserDocument".into(), "UserFragmentDoc".into()],
            },
            ImportRecord {
                source: "@/hooks/useUserQuery".into(),
                kind: ImportKind::Static,
                names: vec!["useUserQuery".into()],
            },
            ImportRecord {
                source: "@/graphql/operations/__generated__/order".into(),
                kind: ImportKind::Dynamic,
                names: vec![],
            },
        ];

        let refs = interceptor().intercept(&imports);
        assert_eq!(
            refs,
            vec![InterceptedReference {
                export_name: "UserDocument".into(),
                operation_name: "User".into(),
                client_source: "@/graphql/operations/__generated__/user".into(),
                schema_document: "@/graphql/operations/user.gql".into(),
            }]
        );
    }

    #[test]
    fn test_custom_client_matcher() {
        let options = UsageOptions {
            client_matcher: PathMatcher::Regex(r"^~api/".into()),
            ..Default::default()
        };
        let interceptor = ReferenceInterceptor::from_options(&options).unwrap();

        assert!(interceptor.intercept_import("~api/__generated__/user", "useUserQuery").is_some());
        assert!(
            interceptor
                .intercept_import("@/graphql/operations/__generated__/user", "useUserQuery")
                .is_none()
        );
    }

    #[test]
    fn test_schema_document_path() {
        assert_eq!(
            schema_document_path("@/graphql/operations/__generated__/user"),
            "@/graphql/operations/user.gql"
        );
        assert_eq!(
            schema_document_path("../operations/__generated__/order-list.ts"),
            "../operations/order-list.gql"
        );
        assert_eq!(
            schema_document_path("@/graphql/operations/user"),
            "@/graphql/operations/user"
        );
    }
}
