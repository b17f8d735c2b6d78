//! Predicates, boolean conditions and caller-grouped filter sets.

use pathql_proto::{Arity, FilterOp, Value};
use tracing::trace;

use super::coerce::Coercer;
use super::path::{Hop, Path};
use crate::error::{Error, Result};

/// A filter condition bound to a resolved path.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    path: Path,
    op: FilterOp,
    values: Vec<Value>,
}

impl Predicate {
    /// Create a predicate from already coerced operands.
    ///
    /// Fails when the operand count does not fit the operator, or when a text
    /// match is requested on a non-text attribute.
    pub fn new(path: Path, op: FilterOp, values: Vec<Value>) -> Result<Self> {
        let arity_ok = match op.arity() {
            Arity::Nullary => values.is_empty(),
            Arity::Unary => values.len() == 1,
            Arity::Variadic => !values.is_empty(),
        };
        if !arity_ok {
            return Err(Error::InvalidPredicate(format!(
                "operator '{op}' on {path} does not take {} operand(s)",
                values.len()
            )));
        }
        if op.is_text_match() && !path.attribute_type().is_text() {
            return Err(Error::InvalidPredicate(format!(
                "operator '{op}' needs a text attribute, {path} is {}",
                path.attribute_type()
            )));
        }
        Ok(Self { path, op, values })
    }

    /// Create a predicate from raw textual operands, coercing each into the
    /// attribute's type.
    ///
    /// Text matches keep their operand as plain text: a prefix of an enum
    /// member is not itself a member.
    pub fn from_raw(path: Path, op: FilterOp, raw: &[String], coercer: &Coercer) -> Result<Self> {
        let values = if op.is_text_match() {
            raw.iter().map(|r| Value::String(r.clone())).collect()
        } else {
            raw.iter()
                .map(|r| coercer.coerce_str(r, path.attribute_type()))
                .collect::<Result<Vec<_>>>()?
        };
        trace!(path = %path, op = %op, operands = values.len(), "built predicate");
        Self::new(path, op, values)
    }

    /// Resolved path the predicate tests.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Operator.
    pub fn op(&self) -> FilterOp {
        self.op
    }

    /// Coerced operands.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Boolean composition of predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A single predicate.
    Predicate(Predicate),
    /// All children must hold.
    And(Vec<Condition>),
    /// At least one child must hold.
    Or(Vec<Condition>),
}

impl Condition {
    /// AND `other` onto this condition, flattening nested conjunctions.
    ///
    /// `None` leaves the condition unchanged; an existing condition is never
    /// replaced.
    pub fn and_with(self, other: Option<Condition>) -> Condition {
        let Some(other) = other else {
            return self;
        };
        let mut parts = match self {
            Condition::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Condition::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Condition::And(parts)
    }

    /// AND two optional conditions.
    pub fn and_optional(existing: Option<Condition>, extra: Option<Condition>) -> Option<Condition> {
        match existing {
            Some(existing) => Some(existing.and_with(extra)),
            None => extra,
        }
    }

    /// All predicates in the condition, depth first.
    pub fn predicates(&self) -> Vec<&Predicate> {
        let mut out = Vec::new();
        self.collect_predicates(&mut out);
        out
    }

    fn collect_predicates<'a>(&'a self, out: &mut Vec<&'a Predicate>) {
        match self {
            Condition::Predicate(p) => out.push(p),
            Condition::And(parts) | Condition::Or(parts) => {
                for part in parts {
                    part.collect_predicates(out);
                }
            }
        }
    }
}

impl From<Predicate> for Condition {
    fn from(predicate: Predicate) -> Self {
        Condition::Predicate(predicate)
    }
}

/// Predicates sharing one root alias and one relationship prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGroup {
    alias: String,
    entity: String,
    hops: Vec<Hop>,
    condition: Condition,
}

impl FilterGroup {
    /// Entity alias the group's paths start from.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Entity type behind the alias.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Relationship hops shared by every predicate in the group.
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Relationship prefix (`authors.publisher`), empty for root attributes.
    pub fn prefix(&self) -> String {
        prefix_of(&self.hops)
    }

    /// Combined condition of the group.
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    fn matches(&self, alias: &str, path: &Path) -> bool {
        self.alias == alias && self.entity == path.root() && self.hops == path.hops()
    }
}

/// Filter input, grouped by root alias and relationship prefix.
///
/// Groups keep the order in which they were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    groups: Vec<FilterGroup>,
}

impl FilterSet {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate reached from `alias`, ANDed with its group.
    pub fn add(&mut self, alias: &str, predicate: Predicate) {
        self.add_condition(alias, predicate.path().clone(), predicate.into());
    }

    /// Add a disjunction of predicates reached from `alias`.
    ///
    /// All predicates must share one relationship prefix; the disjunction is
    /// ANDed with the rest of the group.
    pub fn add_any(&mut self, alias: &str, predicates: Vec<Predicate>) -> Result<()> {
        let first = predicates
            .first()
            .ok_or_else(|| Error::InvalidPredicate("empty disjunction".into()))?
            .path()
            .clone();
        if let Some(other) = predicates.iter().find(|p| p.path().hops() != first.hops()) {
            return Err(Error::InvalidPredicate(format!(
                "disjunction mixes relationship prefixes '{}' and '{}'",
                first.prefix(),
                other.path().prefix()
            )));
        }
        let condition = Condition::Or(predicates.into_iter().map(Condition::from).collect());
        self.add_condition(alias, first, condition);
        Ok(())
    }

    fn add_condition(&mut self, alias: &str, path: Path, condition: Condition) {
        match self.groups.iter_mut().find(|g| g.matches(alias, &path)) {
            Some(group) => {
                let existing = std::mem::replace(&mut group.condition, Condition::And(Vec::new()));
                group.condition = existing.and_with(Some(condition));
            }
            None => self.groups.push(FilterGroup {
                alias: alias.to_string(),
                entity: path.root().to_string(),
                hops: path.hops().to_vec(),
                condition,
            }),
        }
    }

    /// Groups in discovery order.
    pub fn groups(&self) -> &[FilterGroup] {
        &self.groups
    }

    /// Distinct root aliases in discovery order.
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = Vec::new();
        for group in &self.groups {
            if !aliases.contains(&group.alias.as_str()) {
                aliases.push(&group.alias);
            }
        }
        aliases
    }

    /// Check if no predicate was added.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

pub(crate) fn prefix_of(hops: &[Hop]) -> String {
    hops.iter()
        .map(|h| h.relationship.as_str())
        .collect::<Vec<_>>()
        .join(".")
}
