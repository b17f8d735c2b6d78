//! PathQL Core - schema catalog, value coercion and join planning.
//!
//! This crate turns textual filter and sort expressions over a typed entity
//! graph into a single, deduplicated join plan.

pub mod catalog;
pub mod config;
pub mod error;
pub mod query;

#[cfg(test)]
mod testing;

pub use catalog::{
    AttributeDef, AttributeType, Catalog, EntityDef, RelationDef, RelationshipKind,
    RelationshipType, SchemaBundle, SchemaProvider, StructField, TemporalKind,
};
pub use config::PlannerConfig;
pub use error::{Error, Result};
pub use query::{
    Coercer, Condition, EntityObject, EvaluationContext, FilterOperation, FilterSet,
    InMemoryFilterOperation, JoinNode, JoinOrigin, JoinPlan, JoinPlanBuilder, OrderTerm, Path,
    PathResolver, PlanRoot, Predicate, QueryPlanner, SortOrder, SortRule, Sorting,
    SqlFilterOperation, SqlFragment,
};
