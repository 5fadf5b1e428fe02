//! JSON artifacts produced by a collection pass.

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::options::UsageOptions;
use crate::report::{ReportNode, merge_routes};
use crate::route::RouteNode;
use crate::runtime::Runtime;
use crate::usage::UsageByEntryMap;

/// A named output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
}

/// The flat usage map, or `None` when there is nothing to report.
pub fn usage_artifact(file_name: &str, usage: &UsageByEntryMap) -> Result<Option<Artifact>> {
    if usage.is_empty() {
        return Ok(None);
    }
    Ok(Some(Artifact {
        file_name: file_name.to_string(),
        contents: serde_json::to_string(usage)?,
    }))
}

pub fn report_artifact(file_name: &str, report: &[ReportNode]) -> Result<Artifact> {
    Ok(Artifact {
        file_name: file_name.to_string(),
        contents: serde_json::to_string(report)?,
    })
}

/// Final outputs of a build.
///
/// Without usage nothing is emitted. Without a route tree the flat usage map
/// is emitted under the configured output name. With one, the report takes
/// that name and the flat map is only kept (renamed) when `emitIntermediate`
/// is set.
pub fn build_artifacts(
    options: &UsageOptions,
    usage: &UsageByEntryMap,
    routes: Option<&[RouteNode]>,
) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();
    if usage.is_empty() {
        return Ok(artifacts);
    }

    let Some(routes) = routes else {
        artifacts.extend(usage_artifact(&options.output_path, usage)?);
        return Ok(artifacts);
    };

    if options.emit_intermediate {
        artifacts.extend(usage_artifact(&options.intermediate_output_path(), usage)?);
    }
    let report = merge_routes(routes, usage);
    artifacts.push(report_artifact(&options.output_path, &report)?);

    Ok(artifacts)
}

/// Write artifacts under `out_dir`.
pub async fn write_artifacts(
    runtime: &dyn Runtime,
    out_dir: &Path,
    artifacts: &[Artifact],
) -> Result<()> {
    for artifact in artifacts {
        let path = out_dir.join(&artifact.file_name);
        runtime.write_file(&path, artifact.contents.as_bytes()).await?;
        info!(path = %path.display(), bytes = artifact.contents.len(), "wrote usage artifact");
    }
    Ok(())
}
