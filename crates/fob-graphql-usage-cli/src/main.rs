//! `fob-gql-usage` entry point.

use clap::Parser;
use fob_graphql_usage_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    ui::init_colors(args.no_color);
    logger::init_logger(args.verbose, args.quiet, args.no_color);

    let result = match args.command {
        cli::Command::Collect(collect_args) => {
            commands::collect_execute(collect_args).await.map(|_| ())
        }
        cli::Command::Report(report_args) => commands::report_execute(report_args).await.map(|_| ()),
        cli::Command::Routes(routes_args) => commands::routes_execute(routes_args).await.map(|_| ()),
    };

    result.map_err(error::cli_error_to_miette)
}
