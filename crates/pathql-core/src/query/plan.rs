//! Join plan construction.
//!
//! Filtering and sorting each need joins along their paths. The builder merges
//! both sets of requirements into one tree of joins per root, so that no
//! relationship hop is joined twice and every sort path lines up with the
//! joins filtering already created.
//!
//! Joins live in an arena; each node points at its parent by index and its
//! alias is the relationship name. The lineage of a node (the relationship
//! names from its root down to it) decides whether a sort path may reuse it.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use super::operation::{FilterOperation, SqlFilterOperation, SqlFragment};
use super::path::Hop;
use super::predicate::{prefix_of, Condition, FilterSet};
use super::sort::{SortOrder, SortRule};
use crate::catalog::RelationshipType;
use crate::error::{Error, Result};

/// Index of a join in its plan.
pub type JoinId = usize;

/// Index of the query root in [`JoinPlan::roots`].
pub const QUERY_ROOT: usize = 0;

/// Why a join was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinOrigin {
    /// Needed by a filter path.
    Filter,
    /// Needed only by a sort path.
    Sort,
}

impl fmt::Display for JoinOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinOrigin::Filter => "filter",
            JoinOrigin::Sort => "sort",
        })
    }
}

/// An entity a join tree hangs from.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRoot {
    /// Entity type.
    pub entity: String,
    /// Alias the root is referenced by.
    pub alias: String,
    /// Conditions on the root's own attributes.
    pub condition: Option<Condition>,
    /// Whether this is the entity being loaded. Other roots come from filters
    /// addressed to a different entity type and are planned on their own.
    pub is_query_root: bool,
}

/// One join in the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinNode {
    /// Position in the plan's join list.
    pub id: JoinId,
    /// Index of the root this join hangs from.
    pub root: usize,
    /// Parent join, or `None` when joined directly to the root.
    pub parent: Option<JoinId>,
    /// Relationship followed.
    pub relationship: String,
    /// Declared type of the relationship.
    pub relationship_type: RelationshipType,
    /// Alias of the joined entity; equal to the relationship name.
    pub alias: String,
    /// Entity type reached.
    pub target: String,
    /// Conditions on the joined entity's attributes.
    pub condition: Option<Condition>,
    /// Whether filtering or sorting asked for the join first.
    pub origin: JoinOrigin,
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTerm {
    /// Alias of the root or join owning the attribute.
    pub alias: String,
    /// Attribute sorted on.
    pub attribute: String,
    /// Direction.
    pub order: SortOrder,
}

/// The compiled join plan for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinPlan {
    roots: Vec<PlanRoot>,
    joins: Vec<JoinNode>,
    order_by: Vec<OrderTerm>,
}

impl JoinPlan {
    /// Roots, query root first.
    pub fn roots(&self) -> &[PlanRoot] {
        &self.roots
    }

    /// The entity being loaded.
    pub fn query_root(&self) -> &PlanRoot {
        &self.roots[QUERY_ROOT]
    }

    /// All joins in creation order. Parents always precede their children.
    pub fn joins(&self) -> &[JoinNode] {
        &self.joins
    }

    /// Joins hanging from one root, in creation order.
    pub fn joins_of(&self, root: usize) -> impl Iterator<Item = &JoinNode> {
        self.joins.iter().filter(move |j| j.root == root)
    }

    /// Look up a join of the query root by alias.
    pub fn join(&self, alias: &str) -> Option<&JoinNode> {
        self.joins
            .iter()
            .find(|j| j.root == QUERY_ROOT && j.alias == alias)
    }

    /// Relationship names from the root down to `id`.
    pub fn lineage(&self, id: JoinId) -> Vec<&str> {
        lineage(&self.joins, id)
    }

    /// Sort terms in precedence order.
    pub fn order_by(&self) -> &[OrderTerm] {
        &self.order_by
    }

    /// Alias a join's parent is referenced by.
    fn parent_alias(&self, join: &JoinNode) -> &str {
        match join.parent {
            Some(parent) => &self.joins[parent].alias,
            None => &self.roots[join.root].alias,
        }
    }

    /// Render the query root as an SQL-style statement.
    pub fn render(&self, op: &SqlFilterOperation) -> SqlFragment {
        self.render_root(QUERY_ROOT, op)
    }

    /// Render one root as an SQL-style statement.
    ///
    /// `ORDER BY` is only emitted for the query root.
    pub fn render_root(&self, root: usize, op: &SqlFilterOperation) -> SqlFragment {
        let Some(plan_root) = self.roots.get(root) else {
            return SqlFragment {
                sql: String::new(),
                params: Vec::new(),
            };
        };

        let mut lines = vec![format!(
            "SELECT {alias} FROM {entity} {alias}",
            alias = plan_root.alias,
            entity = plan_root.entity
        )];
        let mut conditions = Vec::new();
        if let Some(condition) = &plan_root.condition {
            conditions.push(op.apply_condition(condition, plan_root.alias.as_str()));
        }
        for join in self.joins_of(root) {
            lines.push(format!(
                "JOIN {}.{} {}",
                self.parent_alias(join),
                join.relationship,
                join.alias
            ));
            if let Some(condition) = &join.condition {
                conditions.push(op.apply_condition(condition, join.alias.as_str()));
            }
        }

        let mut params = Vec::new();
        if !conditions.is_empty() {
            let clause = op.all_of(conditions);
            lines.push(format!("WHERE {}", clause.sql));
            params = clause.params;
        }

        if root == QUERY_ROOT && !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|t| format!("{}.{} {}", t.alias, t.attribute, t.order.as_sql()))
                .collect();
            lines.push(format!("ORDER BY {}", terms.join(", ")));
        }

        SqlFragment {
            sql: lines.join("\n"),
            params,
        }
    }
}

fn lineage(joins: &[JoinNode], id: JoinId) -> Vec<&str> {
    let mut names = Vec::new();
    let mut current = joins.get(id);
    while let Some(join) = current {
        names.push(join.relationship.as_str());
        current = join.parent.and_then(|p| joins.get(p));
    }
    names.reverse();
    names
}

/// Builds a [`JoinPlan`] from filter groups and sort rules.
///
/// Filters must be added before sort rules: sort paths are reconciled against
/// the joins filtering created.
#[derive(Debug)]
pub struct JoinPlanBuilder {
    roots: Vec<PlanRoot>,
    joins: Vec<JoinNode>,
    aliases: HashMap<(usize, String), JoinId>,
    order_by: Vec<OrderTerm>,
}

impl JoinPlanBuilder {
    /// Start a plan for the entity being loaded.
    pub fn new(entity: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            roots: vec![PlanRoot {
                entity: entity.into(),
                alias: alias.into(),
                condition: None,
                is_query_root: true,
            }],
            joins: Vec::new(),
            aliases: HashMap::new(),
            order_by: Vec::new(),
        }
    }

    /// Seed the query root with a pre-existing condition. Root-level filters
    /// are ANDed onto it.
    pub fn with_root_condition(mut self, condition: Condition) -> Self {
        let root = &mut self.roots[QUERY_ROOT];
        root.condition = Condition::and_optional(root.condition.take(), Some(condition));
        self
    }

    /// Compile filters and sort rules in one go.
    pub fn plan(
        entity: impl Into<String>,
        alias: impl Into<String>,
        filters: &FilterSet,
        sort_rules: &[SortRule],
    ) -> Result<JoinPlan> {
        let mut builder = Self::new(entity, alias);
        builder.add_filters(filters)?;
        builder.add_sort_rules(sort_rules)?;
        Ok(builder.build())
    }

    /// Create the joins every filter group needs and attach its condition to
    /// the deepest one (or to its root when the group has no hops).
    pub fn add_filters(&mut self, filters: &FilterSet) -> Result<()> {
        for group in filters.groups() {
            let root = self.root_for(group.alias(), group.entity());
            let mut parent = None;
            for hop in group.hops() {
                parent = Some(self.join_for_filter(root, parent, hop, group.hops())?);
            }

            let condition = Some(group.condition().clone());
            match parent {
                Some(id) => {
                    let join = &mut self.joins[id];
                    join.condition = Condition::and_optional(join.condition.take(), condition);
                }
                None => {
                    let root = &mut self.roots[root];
                    root.condition = Condition::and_optional(root.condition.take(), condition);
                }
            }
        }
        Ok(())
    }

    /// Reconcile sort rules with the joins already created, in rule order.
    ///
    /// For each rule the hops are searched from the deepest up for an alias
    /// that already exists. A match must sit at exactly the same position in
    /// the tree as in the sort path; otherwise the request is rejected. Hops
    /// below the match (or all hops, without a match) get new joins.
    pub fn add_sort_rules(&mut self, rules: &[SortRule]) -> Result<()> {
        for rule in rules {
            let hops = rule.path.hops();
            let matched = self.find_aligned(rule)?;

            let (start, mut parent) = match matched {
                Some((index, id)) => (index + 1, Some(id)),
                None => (0, None),
            };
            for hop in &hops[start..] {
                parent = Some(self.create_join(QUERY_ROOT, parent, hop, JoinOrigin::Sort, hops)?);
            }

            let alias = match parent {
                Some(id) => self.joins[id].alias.clone(),
                None => self.roots[QUERY_ROOT].alias.clone(),
            };
            self.order_by.push(OrderTerm {
                alias,
                attribute: rule.path.attribute().to_string(),
                order: rule.order,
            });
        }
        Ok(())
    }

    /// Finish the plan.
    pub fn build(self) -> JoinPlan {
        debug!(
            roots = self.roots.len(),
            joins = self.joins.len(),
            order_terms = self.order_by.len(),
            "join plan built"
        );
        JoinPlan {
            roots: self.roots,
            joins: self.joins,
            order_by: self.order_by,
        }
    }

    fn root_for(&mut self, alias: &str, entity: &str) -> usize {
        if let Some(index) = self.roots.iter().position(|r| r.alias == alias) {
            return index;
        }
        debug!(alias, entity, "adding filter root");
        self.roots.push(PlanRoot {
            entity: entity.to_string(),
            alias: alias.to_string(),
            condition: None,
            is_query_root: false,
        });
        self.roots.len() - 1
    }

    fn join_for_filter(
        &mut self,
        root: usize,
        parent: Option<JoinId>,
        hop: &Hop,
        hops: &[Hop],
    ) -> Result<JoinId> {
        let existing = self
            .joins
            .iter()
            .find(|j| j.root == root && j.parent == parent && j.relationship == hop.relationship);
        match existing {
            Some(join) => {
                debug!(alias = %join.alias, "reusing join");
                Ok(join.id)
            }
            None => self.create_join(root, parent, hop, JoinOrigin::Filter, hops),
        }
    }

    fn create_join(
        &mut self,
        root: usize,
        parent: Option<JoinId>,
        hop: &Hop,
        origin: JoinOrigin,
        hops: &[Hop],
    ) -> Result<JoinId> {
        let alias = hop.relationship.clone();
        if self.roots[root].alias == alias {
            let reason = format!("alias '{alias}' is already bound to the root entity");
            warn!(path = %prefix_of(hops), %reason, "rejected join");
            return Err(Error::InconsistentJoinPath {
                path: prefix_of(hops),
                reason,
            });
        }
        if let Some(&other) = self.aliases.get(&(root, alias.clone())) {
            let reason = format!(
                "alias '{alias}' is already joined through '{}'",
                lineage(&self.joins, other).join(".")
            );
            warn!(path = %prefix_of(hops), %reason, "rejected join");
            return Err(Error::InconsistentJoinPath {
                path: prefix_of(hops),
                reason,
            });
        }

        let id = self.joins.len();
        self.joins.push(JoinNode {
            id,
            root,
            parent,
            relationship: hop.relationship.clone(),
            relationship_type: hop.relationship_type,
            alias: alias.clone(),
            target: hop.target.clone(),
            condition: None,
            origin,
        });
        self.aliases.insert((root, alias), id);
        debug!(
            alias = %hop.relationship,
            target = %hop.target,
            %origin,
            lineage = %lineage(&self.joins, id).join("."),
            "created join"
        );
        Ok(id)
    }

    /// Deepest hop of `rule` whose alias already exists, checked for
    /// alignment. Returns the hop index and the join it maps to.
    fn find_aligned(&self, rule: &SortRule) -> Result<Option<(usize, JoinId)>> {
        let hops = rule.path.hops();
        for (index, hop) in hops.iter().enumerate().rev() {
            let Some((root, id)) = self.lookup_alias(&hop.relationship) else {
                continue;
            };

            let wanted: Vec<&str> = hops[..=index]
                .iter()
                .map(|h| h.relationship.as_str())
                .collect();
            let found = lineage(&self.joins, id);
            if root != QUERY_ROOT || found != wanted {
                let reason = if root != QUERY_ROOT {
                    format!(
                        "alias '{}' belongs to filter root '{}'",
                        hop.relationship, self.roots[root].alias
                    )
                } else {
                    format!(
                        "alias '{}' is joined through '{}', not '{}'",
                        hop.relationship,
                        found.join("."),
                        wanted.join(".")
                    )
                };
                warn!(sort = %rule.path, %reason, "sort path does not line up with filter joins");
                return Err(Error::InconsistentJoinPath {
                    path: rule.path.raw().to_string(),
                    reason,
                });
            }

            debug!(alias = %hop.relationship, sort = %rule.path, "reusing join for sort");
            return Ok(Some((index, id)));
        }
        Ok(None)
    }

    /// Join bound to `alias`, preferring the query root's.
    fn lookup_alias(&self, alias: &str) -> Option<(usize, JoinId)> {
        if let Some(&id) = self.aliases.get(&(QUERY_ROOT, alias.to_string())) {
            return Some((QUERY_ROOT, id));
        }
        self.joins
            .iter()
            .find(|j| j.alias == alias)
            .map(|j| (j.root, j.id))
    }
}
