//! Query compilation: from raw filter and sort expressions to a join plan.
//!
//! Paths are resolved and operands coerced eagerly; the join plan builder only
//! ever sees validated input.

mod coerce;
mod operation;
mod path;
mod plan;
mod planner;
mod predicate;
mod sort;

pub use coerce::Coercer;
pub use operation::{
    like_match, EntityObject, EvaluationContext, FilterOperation, InMemoryFilterOperation,
    SqlFilterOperation, SqlFragment,
};
pub use path::{Hop, Path, PathResolver, PATH_SEPARATOR};
pub use plan::{
    JoinId, JoinNode, JoinOrigin, JoinPlan, JoinPlanBuilder, OrderTerm, PlanRoot, QUERY_ROOT,
};
pub use planner::QueryPlanner;
pub use predicate::{Condition, FilterGroup, FilterSet, Predicate};
pub use sort::{SortOrder, SortRule, Sorting};
