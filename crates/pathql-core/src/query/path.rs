//! Dotted path resolution and validation.
//!
//! A path such as `authors.publisher.name` is a chain of relationship hops
//! ending in an attribute. Resolution walks the chain against a
//! [`SchemaProvider`], rejecting the whole path at the first segment that does
//! not fit.

use std::fmt;

use tracing::trace;

use crate::catalog::{AttributeType, RelationshipType, SchemaProvider};
use crate::config::PlannerConfig;
use crate::error::{Error, Result};

/// Segment separator in path strings.
pub const PATH_SEPARATOR: char = '.';

/// One relationship traversal within a resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    /// Relationship name, also used as the join alias.
    pub relationship: String,
    /// Declared relationship type (always joinable).
    pub relationship_type: RelationshipType,
    /// Entity the relationship starts from.
    pub source: String,
    /// Entity the relationship leads to.
    pub target: String,
}

/// A validated path: zero or more hops followed by an attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    raw: String,
    root: String,
    hops: Vec<Hop>,
    attribute: String,
    attribute_type: AttributeType,
}

impl Path {
    /// The path as written, relative to the root.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Entity type the path is resolved from.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Relationship hops, root first.
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Relationship names of the hops, root first.
    pub fn relationships(&self) -> Vec<&str> {
        self.hops.iter().map(|h| h.relationship.as_str()).collect()
    }

    /// Terminal attribute name.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Declared type of the terminal attribute.
    pub fn attribute_type(&self) -> &AttributeType {
        &self.attribute_type
    }

    /// Entity that owns the terminal attribute.
    pub fn entity(&self) -> &str {
        self.hops.last().map_or(&self.root, |h| &h.target)
    }

    /// The relationship part of the path (`authors.publisher`), empty for
    /// root attributes.
    pub fn prefix(&self) -> String {
        self.relationships().join(".")
    }

    /// Check if the path has no relationship hops.
    pub fn is_root_attribute(&self) -> bool {
        self.hops.is_empty()
    }

    /// Check if any hop can reach more than one entity.
    pub fn crosses_to_many(&self) -> bool {
        self.hops.iter().any(|h| h.relationship_type.is_to_many())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Resolves path strings against a schema provider.
pub struct PathResolver<'a, P: SchemaProvider + ?Sized> {
    provider: &'a P,
    max_depth: usize,
}

impl<'a, P: SchemaProvider + ?Sized> PathResolver<'a, P> {
    /// Create a resolver bounded by `config.max_path_depth`.
    pub fn new(provider: &'a P, config: &PlannerConfig) -> Self {
        Self {
            provider,
            max_depth: config.max_path_depth,
        }
    }

    /// Resolve `path` relative to the entity type `root`.
    pub fn resolve(&self, root: &str, path: &str) -> Result<Path> {
        if self.provider.alias_for(root).is_none() {
            return Err(Error::UnknownEntity(root.to_string()));
        }
        let segments = self.split(path)?;
        let (attribute, relationships) = segments
            .split_last()
            .ok_or_else(|| invalid_path(path, "path is empty"))?;

        let mut current = root.to_string();
        let mut hops = Vec::with_capacity(relationships.len());
        for segment in relationships {
            let hop = self.resolve_hop(&current, segment)?;
            trace!(path, entity = %current, relationship = %segment, target = %hop.target, "resolved hop");
            current = hop.target.clone();
            hops.push(hop);
        }

        let attribute_type = self
            .provider
            .attribute_type(&current, attribute)
            .ok_or_else(|| Error::UnknownAttribute {
                entity: current.clone(),
                attribute: attribute.to_string(),
            })?
            .clone();
        trace!(path, entity = %current, attribute = %attribute, "resolved attribute");

        Ok(Path {
            raw: path.to_string(),
            root: root.to_string(),
            hops,
            attribute: attribute.to_string(),
            attribute_type,
        })
    }

    /// Resolve a filter path whose first segment is an entity alias
    /// (`book.authors.name`).
    ///
    /// Returns the alias and the path resolved relative to its entity.
    pub fn resolve_aliased(&self, path: &str) -> Result<(String, Path)> {
        let (alias, rest) = path
            .split_once(PATH_SEPARATOR)
            .ok_or_else(|| invalid_path(path, "expected '<entity>.<attribute>'"))?;
        let entity = self
            .provider
            .entity_type_for_alias(alias)
            .ok_or_else(|| Error::UnknownEntity(alias.to_string()))?;
        Ok((alias.to_string(), self.resolve(entity, rest)?))
    }

    fn split<'p>(&self, path: &'p str) -> Result<Vec<&'p str>> {
        if path.trim().is_empty() {
            return Err(invalid_path(path, "path is empty"));
        }
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid_path(path, "empty segment"));
        }
        if segments.len() > self.max_depth {
            return Err(invalid_path(
                path,
                format!("{} segments exceed the limit of {}", segments.len(), self.max_depth),
            ));
        }
        Ok(segments)
    }

    fn resolve_hop(&self, entity: &str, segment: &str) -> Result<Hop> {
        let relationship_type = match self.provider.relationship_type(entity, segment) {
            Some(t) => t,
            None if self.provider.has_attribute(entity, segment) => {
                return Err(unsupported(entity, segment, "none"));
            }
            None => {
                return Err(Error::UnknownRelationship {
                    entity: entity.to_string(),
                    relationship: segment.to_string(),
                })
            }
        };
        if !relationship_type.is_joinable() {
            return Err(unsupported(entity, segment, relationship_type));
        }

        let target = self
            .provider
            .related_type(entity, segment)
            .ok_or_else(|| Error::Schema(format!("{entity}.{segment} has no target entity")))?;

        Ok(Hop {
            relationship: segment.to_string(),
            relationship_type,
            source: entity.to_string(),
            target: target.to_string(),
        })
    }
}

fn invalid_path(path: &str, reason: impl Into<String>) -> Error {
    Error::InvalidPath {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn unsupported(entity: &str, relationship: &str, kind: impl ToString) -> Error {
    Error::UnsupportedRelationshipKind {
        entity: entity.to_string(),
        relationship: relationship.to_string(),
        kind: kind.to_string(),
    }
}
