//! Raw filter and sort surface as received from the request layer.
//!
//! Nothing here is validated against a schema; the core resolves paths and
//! coerces values before any of it reaches a join plan.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Filter operators understood by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    /// Attribute equals the single operand.
    Eq,
    /// Attribute differs from the single operand.
    Ne,
    /// Attribute is strictly less than the operand.
    Lt,
    /// Attribute is less than or equal to the operand.
    Le,
    /// Attribute is strictly greater than the operand.
    Gt,
    /// Attribute is greater than or equal to the operand.
    Ge,
    /// Attribute equals one of the operands.
    In,
    /// Attribute equals none of the operands.
    #[serde(rename = "not")]
    NotIn,
    /// Text attribute starts with the operand.
    Prefix,
    /// Text attribute ends with the operand.
    Postfix,
    /// Text attribute contains the operand.
    Infix,
    /// Attribute is null.
    IsNull,
    /// Attribute is not null.
    NotNull,
}

/// Number of operands an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No operands (null tests).
    Nullary,
    /// Exactly one operand.
    Unary,
    /// One or more operands.
    Variadic,
}

impl FilterOp {
    /// All operators, in declaration order.
    pub const ALL: [FilterOp; 13] = [
        FilterOp::Eq,
        FilterOp::Ne,
        FilterOp::Lt,
        FilterOp::Le,
        FilterOp::Gt,
        FilterOp::Ge,
        FilterOp::In,
        FilterOp::NotIn,
        FilterOp::Prefix,
        FilterOp::Postfix,
        FilterOp::Infix,
        FilterOp::IsNull,
        FilterOp::NotNull,
    ];

    /// Textual name used in query parameters.
    pub fn name(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Lt => "lt",
            FilterOp::Le => "le",
            FilterOp::Gt => "gt",
            FilterOp::Ge => "ge",
            FilterOp::In => "in",
            FilterOp::NotIn => "not",
            FilterOp::Prefix => "prefix",
            FilterOp::Postfix => "postfix",
            FilterOp::Infix => "infix",
            FilterOp::IsNull => "isnull",
            FilterOp::NotNull => "notnull",
        }
    }

    /// How many operands the operator accepts.
    pub fn arity(&self) -> Arity {
        match self {
            FilterOp::IsNull | FilterOp::NotNull => Arity::Nullary,
            FilterOp::In | FilterOp::NotIn => Arity::Variadic,
            _ => Arity::Unary,
        }
    }

    /// Whether the operator only makes sense on text attributes.
    pub fn is_text_match(&self) -> bool {
        matches!(self, FilterOp::Prefix | FilterOp::Postfix | FilterOp::Infix)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        FilterOp::ALL
            .iter()
            .copied()
            .find(|op| op.name() == lowered)
            .or(match lowered.as_str() {
                "notin" | "not_in" => Some(FilterOp::NotIn),
                "is_null" => Some(FilterOp::IsNull),
                "not_null" | "isnotnull" => Some(FilterOp::NotNull),
                _ => None,
            })
            .ok_or_else(|| Error::UnknownOperator(s.to_string()))
    }
}

/// One raw filter condition: a dotted path, an operator and textual operands.
///
/// The first path segment names the entity type the rest of the path is
/// relative to (`book.authors.name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParam {
    /// Dotted path, entity alias first, attribute last.
    pub path: String,
    /// Operator to apply.
    pub op: FilterOp,
    /// Raw operands, not yet coerced.
    #[serde(default)]
    pub values: Vec<String>,
}

impl FilterParam {
    /// Create a filter parameter.
    pub fn new(
        path: impl Into<String>,
        op: FilterOp,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            path: path.into(),
            op,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a legacy `filter[<path>][<op>]=<v1>,<v2>` query parameter.
    ///
    /// The operator bracket is optional and defaults to `in`. Null tests ignore
    /// the value side.
    pub fn from_query_param(key: &str, value: &str) -> Result<Self, Error> {
        let rest = key
            .strip_prefix(crate::FILTER_PARAM_PREFIX)
            .ok_or_else(|| Error::InvalidParameter(format!("'{key}' is not a filter parameter")))?;

        let (path, rest) = rest
            .split_once(']')
            .ok_or_else(|| Error::InvalidParameter(format!("unterminated path in '{key}'")))?;
        if path.is_empty() {
            return Err(Error::InvalidParameter(format!("empty path in '{key}'")));
        }

        let op = if rest.is_empty() {
            FilterOp::In
        } else {
            let op_name = rest
                .strip_prefix('[')
                .and_then(|r| r.strip_suffix(']'))
                .ok_or_else(|| {
                    Error::InvalidParameter(format!("malformed operator in '{key}'"))
                })?;
            op_name.parse()?
        };

        let values = match op.arity() {
            Arity::Nullary => Vec::new(),
            _ => value.split(',').map(str::to_string).collect(),
        };

        Ok(Self {
            path: path.to_string(),
            op,
            values,
        })
    }
}

/// A complete, unvalidated query request against one root entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Alias of the root entity type being loaded.
    pub root: String,
    /// Filter conditions, in the order they were received.
    #[serde(default)]
    pub filters: Vec<FilterParam>,
    /// Raw sort expression (`-title,author.name`).
    #[serde(default)]
    pub sort: Option<String>,
}

impl QueryRequest {
    /// Create a request for a root entity.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            filters: Vec::new(),
            sort: None,
        }
    }

    /// Add a filter condition.
    pub fn with_filter(mut self, filter: FilterParam) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the sort expression.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Build a request from decoded query-string parameters.
    ///
    /// `filter[...]` keys become filters in order; the first `sort` value is
    /// the sort expression. Other keys are ignored.
    pub fn from_query_params<I, K, V>(root: impl Into<String>, params: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = Self::new(root);
        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            if key.starts_with(crate::FILTER_PARAM_PREFIX) {
                request.filters.push(FilterParam::from_query_param(key, value)?);
            } else if key == crate::SORT_PARAM && request.sort.is_none() {
                request.sort = Some(value.to_string());
            }
        }
        Ok(request)
    }

    /// Decode a request from JSON.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}
