//! Report command: merge a flat usage map with a route tree.

use fob_graphql_usage::{
    NativeRuntime, Runtime, UsageByEntryMap, load_route_tree, merge_routes, report_artifact,
};

use crate::cli::ReportArgs;
use crate::error::{CollectError, Result};
use crate::ui;

/// Execute the report command. Returns the report JSON.
pub async fn execute(args: ReportArgs) -> Result<String> {
    let runtime = NativeRuntime::new(std::env::current_dir()?);

    let usage_json = runtime.read_to_string(&args.usage).await?;
    let usage: UsageByEntryMap = serde_json::from_str(&usage_json)?;

    let routes = load_route_tree(&runtime, &args.route_tree)
        .await
        .map_err(|source| CollectError::RouteTree {
            path: args.route_tree.clone(),
            source,
        })?;

    let report = merge_routes(&routes, &usage);
    let artifact = report_artifact("report.json", &report)?;

    match &args.output {
        Some(path) => {
            runtime.write_file(path, artifact.contents.as_bytes()).await?;
            ui::success(&format!(
                "Wrote {} ({} top-level routes)",
                path.display(),
                report.len()
            ));
        }
        None => println!("{}", artifact.contents),
    }

    Ok(artifact.contents)
}
