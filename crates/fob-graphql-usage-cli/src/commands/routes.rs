//! Routes command: make a route module exportable as JSON.

use fob_graphql_usage::{NativeRuntime, Runtime, rewrite_loadable_components};

use crate::cli::RoutesArgs;
use crate::error::Result;

/// Execute the routes command. Returns the rewritten source.
pub async fn execute(args: RoutesArgs) -> Result<String> {
    let runtime = NativeRuntime::new(std::env::current_dir()?);

    let source = runtime.read_to_string(&args.input).await?;
    let rewritten = rewrite_loadable_components(&source);

    match &args.output {
        Some(path) => runtime.write_file(path, rewritten.as_bytes()).await?,
        None => print!("{rewritten}"),
    }

    Ok(rewritten)
}
