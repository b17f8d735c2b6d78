//! PathQL Command-Line Planner
//!
//! Loads a schema bundle, validates filter and sort expressions against it and
//! prints the resulting join plan.

mod config;
mod formatter;

use clap::Parser;
use config::Args;
use pathql_core::{Catalog, PlannerConfig, QueryPlanner};
use pathql_proto::QueryRequest;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Errors surfaced to the user.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Plan(#[from] pathql_core::Error),

    #[error(transparent)]
    Request(#[from] pathql_proto::Error),

    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() {
    // Logs go to stderr so plan output stays machine readable.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pathql=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let catalog = Catalog::load(&args.schema)?;
    debug!(schema = %args.schema.display(), version = catalog.version(), "schema loaded");
    let request = QueryRequest::from_query_params(args.root.as_str(), args.query_params())?;

    let planner = QueryPlanner::with_config(&catalog, PlannerConfig::from(args));
    let plan = planner.plan(&request)?;

    println!("{}", formatter::format_plan(&plan, args.format)?);
    Ok(())
}
