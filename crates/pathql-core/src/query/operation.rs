//! Filter operations: evaluating or translating predicates.
//!
//! A [`FilterOperation`] turns a [`Predicate`] into something a backing store
//! understands. [`InMemoryFilterOperation`] evaluates against loaded records;
//! [`SqlFilterOperation`] renders a parameterised condition on a join alias.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::Timelike;
use pathql_proto::{FilterOp, Value};

use super::predicate::{Condition, Predicate};

/// Stands in for attributes missing from a record.
static NULL: Value = Value::Null;

/// Store-specific translation of predicates.
///
/// `T` is what a predicate is applied to: a record for in-memory evaluation,
/// a join alias for query generation.
pub trait FilterOperation<T: ?Sized> {
    /// Result of applying a predicate.
    type Output;

    /// Apply a single predicate.
    fn apply(&self, predicate: &Predicate, target: &T) -> Self::Output;

    /// Conjunction of partial results.
    fn all_of(&self, parts: Vec<Self::Output>) -> Self::Output;

    /// Disjunction of partial results.
    fn any_of(&self, parts: Vec<Self::Output>) -> Self::Output;

    /// Apply a whole condition tree.
    fn apply_condition(&self, condition: &Condition, target: &T) -> Self::Output {
        match condition {
            Condition::Predicate(predicate) => self.apply(predicate, target),
            Condition::And(parts) => {
                let parts = parts
                    .iter()
                    .map(|c| self.apply_condition(c, target))
                    .collect();
                self.all_of(parts)
            }
            Condition::Or(parts) => {
                let parts = parts
                    .iter()
                    .map(|c| self.apply_condition(c, target))
                    .collect();
                self.any_of(parts)
            }
        }
    }

    /// Apply predicates combined with AND.
    fn apply_all(&self, predicates: &[Predicate], target: &T) -> Self::Output {
        let parts = predicates.iter().map(|p| self.apply(p, target)).collect();
        self.all_of(parts)
    }
}

/// Source of attribute values for in-memory evaluation.
pub trait EvaluationContext {
    /// Values reached by following `relationships` from this record and
    /// reading `attribute` on every entity reached.
    ///
    /// A missing attribute reads as null; a missing relationship reaches
    /// nothing.
    fn values_at(&self, relationships: &[&str], attribute: &str) -> Vec<&Value>;
}

/// A loaded entity with its related entities attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityObject {
    /// Attribute values by name.
    pub attributes: BTreeMap<String, Value>,
    /// Related entities by relationship name.
    pub relations: BTreeMap<String, Vec<EntityObject>>,
}

impl EntityObject {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute value.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Attach one related entity.
    pub fn with_related(mut self, relationship: impl Into<String>, related: EntityObject) -> Self {
        self.relations
            .entry(relationship.into())
            .or_default()
            .push(related);
        self
    }
}

impl EvaluationContext for EntityObject {
    fn values_at(&self, relationships: &[&str], attribute: &str) -> Vec<&Value> {
        match relationships.split_first() {
            None => vec![self.attributes.get(attribute).unwrap_or(&NULL)],
            Some((first, rest)) => self
                .relations
                .get(*first)
                .map(|related| {
                    related
                        .iter()
                        .flat_map(|r| r.values_at(rest, attribute))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Evaluates predicates against records.
///
/// Paths through relationships behave like inner joins: a to-many path
/// matches when any entity reached matches, and a path that reaches nothing
/// never matches. Null only satisfies `isnull`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryFilterOperation;

impl InMemoryFilterOperation {
    /// Test one attribute value against a predicate.
    pub fn test(predicate: &Predicate, value: &Value) -> bool {
        let operands = predicate.values();
        match predicate.op() {
            FilterOp::IsNull => return value.is_null(),
            FilterOp::NotNull => return !value.is_null(),
            _ if value.is_null() => return false,
            _ => {}
        }
        let Some(operand) = operands.first() else {
            return false;
        };
        match predicate.op() {
            FilterOp::Eq => values_equal(value, operand),
            FilterOp::Ne => !values_equal(value, operand),
            FilterOp::Lt => compare(value, operand, Ordering::is_lt),
            FilterOp::Le => compare(value, operand, Ordering::is_le),
            FilterOp::Gt => compare(value, operand, Ordering::is_gt),
            FilterOp::Ge => compare(value, operand, Ordering::is_ge),
            FilterOp::In => operands.iter().any(|o| values_equal(value, o)),
            FilterOp::NotIn => !operands.iter().any(|o| values_equal(value, o)),
            op @ (FilterOp::Prefix | FilterOp::Postfix | FilterOp::Infix) => {
                match (value.as_str(), operand.as_str()) {
                    (Some(text), Some(needle)) => like_match(text, &like_pattern(op, needle)),
                    _ => false,
                }
            }
            FilterOp::IsNull | FilterOp::NotNull => false,
        }
    }
}

impl<C: EvaluationContext + ?Sized> FilterOperation<C> for InMemoryFilterOperation {
    type Output = bool;

    fn apply(&self, predicate: &Predicate, record: &C) -> bool {
        let path = predicate.path();
        record
            .values_at(&path.relationships(), path.attribute())
            .into_iter()
            .any(|value| Self::test(predicate, value))
    }

    fn all_of(&self, parts: Vec<bool>) -> bool {
        parts.into_iter().all(|p| p)
    }

    fn any_of(&self, parts: Vec<bool>) -> bool {
        parts.into_iter().any(|p| p)
    }
}

/// A rendered condition with positional `?` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    /// Condition text.
    pub sql: String,
    /// Parameters, in placeholder order.
    pub params: Vec<Value>,
}

impl SqlFragment {
    fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    fn join(parts: Vec<SqlFragment>, separator: &str, empty: &str, wrap: bool) -> Self {
        match parts.len() {
            0 => Self::new(empty, Vec::new()),
            1 => parts.into_iter().next().unwrap_or_else(|| Self::new(empty, Vec::new())),
            _ => {
                let mut params = Vec::new();
                let mut texts = Vec::with_capacity(parts.len());
                for part in parts {
                    texts.push(part.sql);
                    params.extend(part.params);
                }
                let sql = texts.join(separator);
                Self::new(if wrap { format!("({sql})") } else { sql }, params)
            }
        }
    }
}

/// Renders predicates as SQL-style conditions on a join alias.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlFilterOperation;

impl FilterOperation<str> for SqlFilterOperation {
    type Output = SqlFragment;

    fn apply(&self, predicate: &Predicate, alias: &str) -> SqlFragment {
        let column = format!("{alias}.{}", predicate.path().attribute());
        let values = predicate.values().to_vec();
        let placeholders = || vec!["?"; values.len()].join(", ");

        match predicate.op() {
            FilterOp::Eq => SqlFragment::new(format!("{column} = ?"), values),
            FilterOp::Ne => SqlFragment::new(format!("{column} <> ?"), values),
            FilterOp::Lt => SqlFragment::new(format!("{column} < ?"), values),
            FilterOp::Le => SqlFragment::new(format!("{column} <= ?"), values),
            FilterOp::Gt => SqlFragment::new(format!("{column} > ?"), values),
            FilterOp::Ge => SqlFragment::new(format!("{column} >= ?"), values),
            FilterOp::In => SqlFragment::new(format!("{column} IN ({})", placeholders()), values),
            FilterOp::NotIn => {
                SqlFragment::new(format!("{column} NOT IN ({})", placeholders()), values)
            }
            op @ (FilterOp::Prefix | FilterOp::Postfix | FilterOp::Infix) => {
                let pattern = values
                    .iter()
                    .map(|v| Value::String(like_pattern(op, &v.to_string())))
                    .collect();
                SqlFragment::new(format!("{column} LIKE ? ESCAPE '\\'"), pattern)
            }
            FilterOp::IsNull => SqlFragment::new(format!("{column} IS NULL"), Vec::new()),
            FilterOp::NotNull => SqlFragment::new(format!("{column} IS NOT NULL"), Vec::new()),
        }
    }

    fn all_of(&self, parts: Vec<SqlFragment>) -> SqlFragment {
        SqlFragment::join(parts, " AND ", "1 = 1", false)
    }

    fn any_of(&self, parts: Vec<SqlFragment>) -> SqlFragment {
        SqlFragment::join(parts, " OR ", "1 = 0", true)
    }
}

/// Check if two values are equal, widening numerics.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int32(_) | Value::Int64(_), Value::Int32(_) | Value::Int64(_)) => {
            a.as_i64() == b.as_i64()
        }
        (Value::Float32(_) | Value::Float64(_), _) | (_, Value::Float32(_) | Value::Float64(_)) => {
            matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y)
        }
        (Value::String(_) | Value::Enum(_), Value::String(_) | Value::Enum(_)) => {
            a.as_str() == b.as_str()
        }
        (
            Value::ZonedDateTime { datetime: x, .. },
            Value::ZonedDateTime { datetime: y, .. },
        ) => x == y,
        _ => compare_values(a, b) == Some(Ordering::Equal) || a == b,
    }
}

/// Compare two values, returning their ordering if comparable.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int32(_) | Value::Int64(_), Value::Int32(_) | Value::Int64(_)) => {
            Some(a.as_i64()?.cmp(&b.as_i64()?))
        }
        (
            Value::Int32(_) | Value::Int64(_) | Value::Float32(_) | Value::Float64(_),
            Value::Int32(_) | Value::Int64(_) | Value::Float32(_) | Value::Float64(_),
        ) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Uuid(x), Value::Uuid(y)) => Some(x.cmp(y)),
        (Value::Instant(x), Value::Instant(y)) => Some(x.cmp(y)),
        (Value::OffsetDateTime(x), Value::OffsetDateTime(y)) => Some(x.cmp(y)),
        (
            Value::ZonedDateTime { datetime: x, .. },
            Value::ZonedDateTime { datetime: y, .. },
        ) => Some(x.cmp(y)),
        (Value::LocalDate(x), Value::LocalDate(y)) => Some(x.cmp(y)),
        (Value::LocalDateTime(x), Value::LocalDateTime(y)) => Some(x.cmp(y)),
        (Value::LocalTime(x), Value::LocalTime(y)) => Some(x.cmp(y)),
        (
            Value::OffsetTime {
                time: x,
                offset_seconds: xo,
            },
            Value::OffsetTime {
                time: y,
                offset_seconds: yo,
            },
        ) => {
            let utc = |t: &chrono::NaiveTime, offset: i32| {
                (i64::from(t.num_seconds_from_midnight()) - i64::from(offset), t.nanosecond())
            };
            Some(utc(x, *xo).cmp(&utc(y, *yo)))
        }
        (Value::Year(x), Value::Year(y)) => Some(x.cmp(y)),
        (
            Value::YearMonth { year: xy, month: xm },
            Value::YearMonth { year: yy, month: ym },
        ) => Some((xy, xm).cmp(&(yy, ym))),
        _ => None,
    }
}

fn compare(a: &Value, b: &Value, accept: fn(Ordering) -> bool) -> bool {
    compare_values(a, b).map(accept).unwrap_or(false)
}

/// Build the LIKE pattern for a text match, escaping wildcards in `needle`.
fn like_pattern(op: FilterOp, needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    match op {
        FilterOp::Prefix => format!("{escaped}%"),
        FilterOp::Postfix => format!("%{escaped}"),
        _ => format!("%{escaped}%"),
    }
}

/// Match a string against a SQL LIKE pattern.
///
/// `%` matches any run of characters, `_` exactly one; a backslash makes the
/// next pattern character literal.
pub fn like_match(value: &str, pattern: &str) -> bool {
    like_match_from(&mut value.chars().peekable(), &mut pattern.chars().peekable())
}

fn like_match_from(
    chars: &mut std::iter::Peekable<std::str::Chars>,
    pattern: &mut std::iter::Peekable<std::str::Chars>,
) -> bool {
    loop {
        match (pattern.peek().copied(), chars.peek().copied()) {
            (None, rest) => return rest.is_none(),
            (Some('%'), _) => {
                pattern.next();
                if pattern.peek().is_none() {
                    return true;
                }
                loop {
                    if like_match_from(&mut chars.clone(), &mut pattern.clone()) {
                        return true;
                    }
                    if chars.next().is_none() {
                        return false;
                    }
                }
            }
            (Some('_'), Some(_)) => {
                pattern.next();
                chars.next();
            }
            (Some('\\'), _) => {
                pattern.next();
                match (pattern.next(), chars.next()) {
                    (Some(p), Some(c)) if p == c => {}
                    _ => return false,
                }
            }
            (Some(p), Some(c)) if p == c => {
                pattern.next();
                chars.next();
            }
            _ => return false,
        }
    }
}
