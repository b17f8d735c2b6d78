//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;
use pathql_core::PlannerConfig;

use crate::formatter::OutputFormat;

/// Compile filter and sort expressions into a join plan.
#[derive(Debug, Parser)]
#[command(name = "pathql")]
#[command(version, about = "Compile filter and sort expressions into a join plan")]
pub struct Args {
    /// JSON schema bundle describing entities and relations.
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Alias of the entity type being loaded (e.g. `book`).
    #[arg(short, long)]
    pub root: String,

    /// Filter parameter in query-string form: `filter[book.title][prefix]=Du`.
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,

    /// Sort expression: `-published,authors.name`.
    #[arg(long, allow_hyphen_values = true)]
    pub sort: Option<String>,

    /// Output format.
    #[arg(long, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// Maximum number of segments in a path.
    #[arg(long, default_value_t = 8)]
    pub max_depth: usize,

    /// Only accept exact enum member names.
    #[arg(long)]
    pub strict_enums: bool,
}

impl Args {
    /// Query-string pairs for the filters and sort expression.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|raw| match raw.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (raw.clone(), String::new()),
            })
            .collect();
        if let Some(sort) = &self.sort {
            params.push((pathql_proto::SORT_PARAM.to_string(), sort.clone()));
        }
        params
    }
}

impl From<&Args> for PlannerConfig {
    fn from(args: &Args) -> Self {
        PlannerConfig::new()
            .with_max_path_depth(args.max_depth)
            .with_case_insensitive_enums(!args.strict_enums)
            .with_enum_ordinals(!args.strict_enums)
    }
}
