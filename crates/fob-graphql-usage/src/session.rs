//! Per-build collection state.
//!
//! A `UsageSession` is created when a build starts and dropped when it ends.
//! Hosts feed it "module parsed" events during the build, then ask it to
//! aggregate once every module has been seen.

use crate::aggregator::{self, AggregationOutcome};
use crate::attribution::{AncestryLookup, EntryResolver};
use crate::error::Result;
use crate::imports::ImportRecord;
use crate::interceptor::{InterceptedReference, ReferenceInterceptor};
use crate::options::UsageOptions;
use crate::runtime::Runtime;
use crate::schema::SchemaDocumentCache;
use crate::table::{EntryDependencyTable, OperationReference};

/// An intercepted reference with no route entry in its ancestry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionMiss {
    pub module: String,
    pub export_name: String,
}

#[derive(Debug)]
pub struct UsageSession {
    options: UsageOptions,
    interceptor: ReferenceInterceptor,
    entries: EntryResolver,
    table: EntryDependencyTable,
    cache: SchemaDocumentCache,
    misses: Vec<AttributionMiss>,
}

impl UsageSession {
    /// Compile the options' matchers and patterns into a fresh session.
    pub fn new(options: UsageOptions) -> Result<Self> {
        let interceptor = ReferenceInterceptor::from_options(&options)?;
        let entries = EntryResolver::new(options.entry_matcher.compile("entryMatcher")?);
        Ok(Self {
            options,
            interceptor,
            entries,
            table: EntryDependencyTable::new(),
            cache: SchemaDocumentCache::new(),
            misses: Vec::new(),
        })
    }

    pub fn options(&self) -> &UsageOptions {
        &self.options
    }

    /// Record the operation references among `imports` of `module`.
    ///
    /// Returns the number of references attributed to an entry.
    pub fn on_module_parsed<L: AncestryLookup + ?Sized>(
        &mut self,
        module: &str,
        imports: &[ImportRecord],
        lookup: &L,
    ) -> usize {
        self.interceptor
            .intercept(imports)
            .into_iter()
            .filter(|reference| self.attribute(module, reference, lookup))
            .count()
    }

    fn attribute<L: AncestryLookup + ?Sized>(
        &mut self,
        module: &str,
        reference: &InterceptedReference,
        lookup: &L,
    ) -> bool {
        match self.entries.resolve(lookup, module) {
            Some(entry) => {
                tracing::debug!(
                    module,
                    entry = %entry,
                    operation = %reference.operation_name,
                    "operation reference attributed"
                );
                self.table.insert(
                    entry,
                    OperationReference {
                        operation_name: reference.operation_name.clone(),
                        owner_module: module.to_string(),
                        schema_document: reference.schema_document.clone(),
                    },
                );
                true
            }
            None => {
                tracing::warn!(
                    module,
                    "entry path for {} has not been found",
                    reference.export_name
                );
                self.misses.push(AttributionMiss {
                    module: module.to_string(),
                    export_name: reference.export_name.clone(),
                });
                false
            }
        }
    }

    pub fn table(&self) -> &EntryDependencyTable {
        &self.table
    }

    pub fn misses(&self) -> &[AttributionMiss] {
        &self.misses
    }

    /// Documents parsed so far in this build.
    pub fn parsed_documents(&self) -> usize {
        self.cache.parse_count()
    }

    /// Resolve, parse and fold every recorded reference.
    pub async fn aggregate(&mut self, runtime: &dyn Runtime) -> AggregationOutcome {
        aggregator::aggregate(&self.table, runtime, &mut self.cache).await
    }

    /// Hand the recorded build over to a detached session and start a new
    /// build here. Lets a host aggregate without holding its own lock.
    pub fn take_build(&mut self) -> UsageSession {
        UsageSession {
            options: self.options.clone(),
            interceptor: self.interceptor.clone(),
            entries: self.entries.clone(),
            table: std::mem::take(&mut self.table),
            cache: std::mem::take(&mut self.cache),
            misses: std::mem::take(&mut self.misses),
        }
    }

    /// Start a new build: all per-build state is replaced.
    pub fn reset(&mut self) {
        self.table = EntryDependencyTable::new();
        self.cache = SchemaDocumentCache::new();
        self.misses = Vec::new();
    }
}
