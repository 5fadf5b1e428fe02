//! Usage aggregation.
//!
//! ```text
//! EntryDependencyTable ──▶ resolve every document request (concurrently, all settle)
//!                                   │
//!                                   ▼
//!                      fold in table order ──▶ SchemaDocumentCache ──▶ UsageByEntryMap
//! ```
//!
//! Folding only starts once every resolution has produced an outcome, so the
//! per-entry dedup never races and the resulting order is deterministic.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::runtime::{Runtime, RuntimeError};
use crate::schema::{SchemaDocumentCache, SchemaError};
use crate::table::{EntryDependencyTable, OperationReference};
use crate::usage::{UsageByEntryMap, UsageItem};

/// Why a reference contributed no usage.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FailureReason {
    #[error(transparent)]
    Resolution(#[from] RuntimeError),

    #[error(transparent)]
    Document(#[from] SchemaError),
}

/// A reference whose operation document could not be used.
#[derive(Debug, Clone)]
pub struct ResolutionFailure {
    pub entry: String,
    pub reference: OperationReference,
    pub reason: FailureReason,
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct AggregationOutcome {
    pub usage: UsageByEntryMap,
    pub failures: Vec<ResolutionFailure>,
    /// References whose operation name is absent from its document.
    pub unmatched: usize,
}

/// Fold every reference of `table` into per-entry usage.
pub async fn aggregate(
    table: &EntryDependencyTable,
    runtime: &dyn Runtime,
    cache: &mut SchemaDocumentCache,
) -> AggregationOutcome {
    let references: Vec<(&str, &OperationReference)> = table.iter().collect();

    let resolutions: Vec<Result<PathBuf, RuntimeError>> =
        join_all(references.iter().map(|(_, reference)| {
            runtime.resolve(&reference.schema_document, Path::new(&reference.owner_module))
        }))
        .await;

    let mut outcome = AggregationOutcome::default();

    for ((entry, reference), resolved) in references.into_iter().zip(resolutions) {
        let document = match resolved {
            Ok(path) => cache.load(runtime, &path).await.map_err(FailureReason::from),
            Err(e) => Err(FailureReason::from(e)),
        };

        let document = match document {
            Ok(document) => document,
            Err(reason) => {
                warn!(
                    entry,
                    operation = %reference.operation_name,
                    document = %reference.schema_document,
                    "operation document unavailable: {}",
                    reason
                );
                outcome.failures.push(ResolutionFailure {
                    entry: entry.to_string(),
                    reference: reference.clone(),
                    reason,
                });
                continue;
            }
        };

        let Some(definition) = document.operation(&reference.operation_name) else {
            debug!(
                entry,
                operation = %reference.operation_name,
                document = %reference.schema_document,
                "operation not defined in document"
            );
            outcome.unmatched += 1;
            continue;
        };

        for field in &definition.selected_fields {
            outcome
                .usage
                .push_unique(entry, UsageItem::new(definition.operation_type, field.as_str()));
        }
    }

    debug!(
        references = table.len(),
        entries = outcome.usage.len(),
        failures = outcome.failures.len(),
        documents = cache.parse_count(),
        "usage aggregation complete"
    );

    outcome
}
