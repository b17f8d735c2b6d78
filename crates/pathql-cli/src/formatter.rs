//! Output formatters for compiled join plans.

use clap::ValueEnum;
use pathql_core::query::{JoinPlan, SqlFilterOperation, SqlFragment};
use pathql_proto::Value;
use serde_json::json;

/// Output format for plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Rendered statement per root
    Text,
    /// Structured JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Format a plan in the requested format.
pub fn format_plan(plan: &JoinPlan, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(format_text(plan)),
        OutputFormat::Json => serde_json::to_string_pretty(&plan_to_json(plan)),
    }
}

fn format_text(plan: &JoinPlan) -> String {
    let op = SqlFilterOperation;
    let mut blocks = Vec::with_capacity(plan.roots().len());
    for (index, root) in plan.roots().iter().enumerate() {
        let rendered = plan.render_root(index, &op);
        let mut block = String::new();
        if !root.is_query_root {
            block.push_str(&format!("-- filter root '{}'\n", root.alias));
        }
        block.push_str(&rendered.sql);
        if !rendered.params.is_empty() {
            block.push_str(&format!("\n-- params: {}", format_params(&rendered)));
        }
        blocks.push(block);
    }
    blocks.join("\n\n")
}

fn format_params(fragment: &SqlFragment) -> String {
    fragment
        .params
        .iter()
        .map(format_param)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_param(value: &Value) -> String {
    match value {
        Value::String(s) | Value::Enum(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Null => "NULL".to_string(),
        other if other.is_temporal() || other.as_uuid().is_some() => format!("'{other}'"),
        other => other.to_string(),
    }
}

fn plan_to_json(plan: &JoinPlan) -> serde_json::Value {
    let op = SqlFilterOperation;

    let roots: Vec<serde_json::Value> = plan
        .roots()
        .iter()
        .enumerate()
        .map(|(index, root)| {
            let rendered = plan.render_root(index, &op);
            json!({
                "entity": root.entity,
                "alias": root.alias,
                "query_root": root.is_query_root,
                "sql": rendered.sql,
                "params": rendered.params.iter().map(ToString::to_string).collect::<Vec<_>>(),
            })
        })
        .collect();

    let joins: Vec<serde_json::Value> = plan
        .joins()
        .iter()
        .map(|join| {
            json!({
                "id": join.id,
                "root": plan.roots()[join.root].alias,
                "parent": join.parent,
                "alias": join.alias,
                "relationship": join.relationship,
                "type": join.relationship_type.to_string(),
                "target": join.target,
                "lineage": plan.lineage(join.id),
                "origin": join.origin,
                "filtered": join.condition.is_some(),
            })
        })
        .collect();

    json!({
        "roots": roots,
        "joins": joins,
        "order_by": plan.order_by(),
    })
}
