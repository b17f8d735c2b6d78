//! Sort expression parsing and validation.
//!
//! A sort expression is a comma separated list of paths relative to the query
//! root, each optionally prefixed with `-` (descending) or `+` (ascending):
//! `-published,authors.name`.

use std::fmt;

use pathql_proto::SORT_PARAM;
use serde::{Deserialize, Serialize};

use super::path::{Path, PathResolver};
use crate::catalog::SchemaProvider;
use crate::error::Result;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl SortOrder {
    /// SQL keyword for the direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

/// Requested sort rules, in precedence order.
///
/// [`Sorting::DEFAULT`] means "no sorting requested" and is told apart from an
/// explicitly built empty `Sorting` by [`Sorting::is_default`], not by its
/// (identical) rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sorting {
    rules: Vec<(String, SortOrder)>,
    is_default: bool,
}

impl Default for Sorting {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Sorting {
    /// The shared "no sorting" value.
    pub const DEFAULT: Sorting = Sorting {
        rules: Vec::new(),
        is_default: true,
    };

    /// Create an explicit, empty sorting.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            is_default: false,
        }
    }

    /// Parse a raw sort expression.
    ///
    /// Blank input yields [`Sorting::DEFAULT`]. Empty tokens are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut sorting = Self::new();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (path, order) = match token.as_bytes()[0] {
                b'-' => (&token[1..], SortOrder::Desc),
                b'+' => (&token[1..], SortOrder::Asc),
                _ => (token, SortOrder::Asc),
            };
            sorting.insert(path.trim(), order);
        }
        if sorting.is_empty() {
            Self::DEFAULT
        } else {
            sorting
        }
    }

    /// Parse the first `sort` parameter of a query string's parameters.
    pub fn parse_query_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        params
            .into_iter()
            .find(|(key, _)| key.as_ref() == SORT_PARAM)
            .map(|(_, value)| Self::parse(value.as_ref()))
            .unwrap_or(Self::DEFAULT)
    }

    /// Add a rule. A path already present keeps its position and takes the
    /// new direction.
    pub fn insert(&mut self, path: impl Into<String>, order: SortOrder) {
        let path = path.into();
        match self.rules.iter_mut().find(|(p, _)| *p == path) {
            Some(rule) => rule.1 = order,
            None => self.rules.push((path, order)),
        }
        self.is_default = false;
    }

    /// Builder form of [`Sorting::insert`].
    pub fn with_rule(mut self, path: impl Into<String>, order: SortOrder) -> Self {
        self.insert(path, order);
        self
    }

    /// Direction requested for `path`.
    pub fn get(&self, path: &str) -> Option<SortOrder> {
        self.rules.iter().find(|(p, _)| p == path).map(|(_, o)| *o)
    }

    /// Rules in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SortOrder)> {
        self.rules.iter().map(|(p, o)| (p.as_str(), *o))
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check if this is the "no sorting requested" value.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Resolve every rule against `root`, failing on the first invalid path.
    pub fn validate<P: SchemaProvider + ?Sized>(
        &self,
        resolver: &PathResolver<'_, P>,
        root: &str,
    ) -> Result<Vec<SortRule>> {
        self.iter()
            .map(|(path, order)| {
                Ok(SortRule {
                    path: resolver.resolve(root, path)?,
                    order,
                })
            })
            .collect()
    }
}

impl fmt::Display for Sorting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, order)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if order == SortOrder::Desc {
                f.write_str("-")?;
            }
            f.write_str(path)?;
        }
        Ok(())
    }
}

/// A validated sort rule.
#[derive(Debug, Clone, PartialEq)]
pub struct SortRule {
    /// Resolved path, relative to the query root.
    pub path: Path,
    /// Requested direction.
    pub order: SortOrder,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlannerConfig;
    use crate::error::Error;
    use crate::testing::library_catalog;

    #[test]
    fn test_parse_signs() {
        let sorting = Sorting::parse("-a,b,+c");
        let rules: Vec<_> = sorting.iter().collect();
        assert_eq!(
            rules,
            vec![
                ("a", SortOrder::Desc),
                ("b", SortOrder::Asc),
                ("c", SortOrder::Asc)
            ]
        );
        assert!(!sorting.is_default());
        assert_eq!(sorting.to_string(), "-a,b,c");
    }

    #[test]
    fn test_empty_is_default() {
        for raw in ["", "   ", ",", " , "] {
            let sorting = Sorting::parse(raw);
            assert!(sorting.is_empty());
            assert!(sorting.is_default());
            assert_eq!(sorting, Sorting::DEFAULT);
        }
        assert_eq!(Sorting::default(), Sorting::DEFAULT);
    }

    #[test]
    fn test_explicit_empty_differs_from_default() {
        let explicit = Sorting::new();
        assert!(explicit.is_empty());
        assert!(!explicit.is_default());
        assert_ne!(explicit, Sorting::DEFAULT);
    }

    #[test]
    fn test_duplicate_last_wins() {
        let sorting = Sorting::parse("title,-price,-title");
        assert_eq!(sorting.len(), 2);
        assert_eq!(sorting.get("title"), Some(SortOrder::Desc));
        assert_eq!(sorting.iter().next(), Some(("title", SortOrder::Desc)));
    }

    #[test]
    fn test_skips_empty_tokens() {
        let sorting = Sorting::parse("title,, -price ,");
        assert_eq!(sorting.to_string(), "title,-price");
    }

    #[test]
    fn test_space_after_sign_trimmed() {
        let sorting = Sorting::parse("- title, + price");
        assert_eq!(sorting.get("title"), Some(SortOrder::Desc));
        assert_eq!(sorting.get("price"), Some(SortOrder::Asc));
        assert_eq!(sorting.to_string(), "-title,price");
    }

    #[test]
    fn test_query_params() {
        let params = [("filter[book.title]", "x"), ("sort", "-title"), ("sort", "price")];
        assert_eq!(Sorting::parse_query_params(params).to_string(), "-title");

        let none: [(&str, &str); 0] = [];
        assert!(Sorting::parse_query_params(none).is_default());
    }

    #[test]
    fn test_validate() {
        let catalog = library_catalog();
        let resolver = PathResolver::new(&catalog, &PlannerConfig::default());

        let rules = Sorting::parse("-published,authors.name")
            .validate(&resolver, "Book")
            .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].order, SortOrder::Desc);
        assert_eq!(rules[1].path.relationships(), vec!["authors"]);

        let err = Sorting::parse("title,authors.nonexistent")
            .validate(&resolver, "Book")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownAttribute { .. }));

        assert!(matches!(
            Sorting::parse("-").validate(&resolver, "Book"),
            Err(Error::InvalidPath { .. })
        ));
    }
}
