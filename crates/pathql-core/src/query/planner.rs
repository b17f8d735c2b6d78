//! Request-level planning facade.
//!
//! The planner validates a whole [`QueryRequest`] up front (every filter path,
//! every operand, every sort path) and only then builds the join plan, so a
//! single bad path rejects the request before any join exists.

use pathql_proto::{FilterParam, QueryRequest};
use tracing::{debug, info};

use super::coerce::Coercer;
use super::path::PathResolver;
use super::plan::{JoinPlan, JoinPlanBuilder};
use super::predicate::{FilterSet, Predicate};
use super::sort::{SortRule, Sorting};
use crate::catalog::SchemaProvider;
use crate::config::PlannerConfig;
use crate::error::{Error, Result};

/// Compiles query requests into join plans.
pub struct QueryPlanner<'a, P: SchemaProvider + ?Sized> {
    provider: &'a P,
    config: PlannerConfig,
    coercer: Coercer,
}

impl<'a, P: SchemaProvider + ?Sized> QueryPlanner<'a, P> {
    /// Create a planner with default configuration.
    pub fn new(provider: &'a P) -> Self {
        Self::with_config(provider, PlannerConfig::default())
    }

    /// Create a planner with the given configuration.
    pub fn with_config(provider: &'a P, config: PlannerConfig) -> Self {
        Self {
            provider,
            coercer: Coercer::new(&config),
            config,
        }
    }

    /// Planner configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Path resolver sharing the planner's schema and limits.
    pub fn resolver(&self) -> PathResolver<'a, P> {
        PathResolver::new(self.provider, &self.config)
    }

    /// Resolve and coerce raw filters, grouping them by alias and prefix.
    pub fn filter_set(&self, filters: &[FilterParam]) -> Result<FilterSet> {
        let resolver = self.resolver();
        let mut set = FilterSet::new();
        for filter in filters {
            let (alias, path) = resolver.resolve_aliased(&filter.path)?;
            let predicate = Predicate::from_raw(path, filter.op, &filter.values, &self.coercer)?;
            set.add(&alias, predicate);
        }
        Ok(set)
    }

    /// Resolve sort rules relative to the entity type `root`.
    pub fn sort_rules(&self, root: &str, sorting: &Sorting) -> Result<Vec<SortRule>> {
        sorting.validate(&self.resolver(), root)
    }

    /// Validate `request` and compile its join plan.
    pub fn plan(&self, request: &QueryRequest) -> Result<JoinPlan> {
        let entity = self
            .provider
            .entity_type_for_alias(&request.root)
            .ok_or_else(|| Error::UnknownEntity(request.root.clone()))?;

        let filters = self.filter_set(&request.filters)?;
        let sorting = request
            .sort
            .as_deref()
            .map(Sorting::parse)
            .unwrap_or(Sorting::DEFAULT);
        let rules = self.sort_rules(entity, &sorting)?;
        debug!(
            root = %request.root,
            groups = filters.groups().len(),
            sort_rules = rules.len(),
            "request validated"
        );

        let plan = JoinPlanBuilder::plan(entity, request.root.as_str(), &filters, &rules)?;
        info!(root = %request.root, joins = plan.joins().len(), "planned query");
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::library_catalog;
    use pathql_proto::FilterOp;

    #[test]
    fn test_plan_request() {
        let catalog = library_catalog();
        let planner = QueryPlanner::new(&catalog);
        let request = QueryRequest::new("book")
            .with_filter(FilterParam::new("book.authors.name", FilterOp::Prefix, ["Fr"]))
            .with_sort("-authors.born,title");

        let plan = planner.plan(&request).unwrap();
        assert_eq!(plan.query_root().entity, "Book");
        assert_eq!(plan.joins().len(), 1);
        assert_eq!(plan.order_by().len(), 2);
    }

    #[test]
    fn test_unknown_root() {
        let catalog = library_catalog();
        let planner = QueryPlanner::new(&catalog);
        assert!(matches!(
            planner.plan(&QueryRequest::new("magazine")),
            Err(Error::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_invalid_sort_rejects_before_building() {
        let catalog = library_catalog();
        let planner = QueryPlanner::new(&catalog);
        let request = QueryRequest::new("book")
            .with_filter(FilterParam::new("book.title", FilterOp::Eq, ["Dune"]))
            .with_sort("title,dimensions.width");
        assert!(matches!(
            planner.plan(&request),
            Err(Error::UnsupportedRelationshipKind { .. })
        ));
    }

    #[test]
    fn test_operand_coercion_errors_surface() {
        let catalog = library_catalog();
        let planner = QueryPlanner::new(&catalog);
        let request = QueryRequest::new("book").with_filter(FilterParam::new(
            "book.reviews.rating",
            FilterOp::Ge,
            ["four"],
        ));
        assert!(matches!(
            planner.plan(&request),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_config_limits_depth() {
        let catalog = library_catalog();
        let planner =
            QueryPlanner::with_config(&catalog, PlannerConfig::new().with_max_path_depth(2));
        let request = QueryRequest::new("book").with_sort("authors.publisher.name");
        assert!(matches!(
            planner.plan(&request),
            Err(Error::InvalidPath { .. })
        ));
        assert_eq!(planner.config().max_path_depth, 2);
    }
}
