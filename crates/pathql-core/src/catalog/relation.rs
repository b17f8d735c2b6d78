//! Relationship definitions between entities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relationship type as declared in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// One-to-one relation (unique foreign key).
    OneToOne,
    /// Many-to-one relation (foreign key on this side).
    ManyToOne,
    /// One-to-many relation (foreign key on the other side).
    OneToMany,
    /// Many-to-many relation (requires a link table).
    ManyToMany,
    /// Embedded component stored inline; there is nothing to join.
    Embedded,
}

/// Cardinality of a joinable relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// At most one related entity.
    ToOne,
    /// Any number of related entities.
    ToMany,
}

impl RelationshipType {
    /// Collapse into a cardinality, or `None` when the type cannot be joined.
    pub fn kind(&self) -> Option<RelationshipKind> {
        match self {
            RelationshipType::OneToOne | RelationshipType::ManyToOne => {
                Some(RelationshipKind::ToOne)
            }
            RelationshipType::OneToMany | RelationshipType::ManyToMany => {
                Some(RelationshipKind::ToMany)
            }
            RelationshipType::Embedded => None,
        }
    }

    /// Check if a join can be planned through this relationship.
    pub fn is_joinable(&self) -> bool {
        self.kind().is_some()
    }

    /// Check if this relationship reaches more than one entity.
    pub fn is_to_many(&self) -> bool {
        self.kind() == Some(RelationshipKind::ToMany)
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelationshipType::OneToOne => "OneToOne",
            RelationshipType::ManyToOne => "ManyToOne",
            RelationshipType::OneToMany => "OneToMany",
            RelationshipType::ManyToMany => "ManyToMany",
            RelationshipType::Embedded => "Embedded",
        })
    }
}

/// A named relationship from one entity to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relationship name, unique within the source entity.
    pub name: String,
    /// Source entity name.
    pub from_entity: String,
    /// Target entity name.
    pub to_entity: String,
    /// Relationship type.
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    /// Name of the inverse relationship on the target, if any.
    #[serde(default)]
    pub inverse: Option<String>,
}

impl RelationDef {
    fn with_type(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            relationship_type,
            inverse: None,
        }
    }

    /// Create a one-to-one relation.
    pub fn one_to_one(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
    ) -> Self {
        Self::with_type(name, from_entity, to_entity, RelationshipType::OneToOne)
    }

    /// Create a many-to-one relation.
    pub fn many_to_one(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
    ) -> Self {
        Self::with_type(name, from_entity, to_entity, RelationshipType::ManyToOne)
    }

    /// Create a one-to-many relation.
    pub fn one_to_many(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
    ) -> Self {
        Self::with_type(name, from_entity, to_entity, RelationshipType::OneToMany)
    }

    /// Create a many-to-many relation.
    pub fn many_to_many(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
    ) -> Self {
        Self::with_type(name, from_entity, to_entity, RelationshipType::ManyToMany)
    }

    /// Create an embedded component relation.
    pub fn embedded(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
    ) -> Self {
        Self::with_type(name, from_entity, to_entity, RelationshipType::Embedded)
    }

    /// Name the inverse relationship.
    pub fn with_inverse(mut self, inverse: impl Into<String>) -> Self {
        self.inverse = Some(inverse.into());
        self
    }

    /// Get the inverse relation (swapping from/to).
    ///
    /// One-to-many and many-to-one swap; the other types are symmetric.
    pub fn inverse(&self, name: impl Into<String>) -> Self {
        let relationship_type = match self.relationship_type {
            RelationshipType::OneToMany => RelationshipType::ManyToOne,
            RelationshipType::ManyToOne => RelationshipType::OneToMany,
            other => other,
        };
        Self {
            name: name.into(),
            from_entity: self.to_entity.clone(),
            to_entity: self.from_entity.clone(),
            relationship_type,
            inverse: Some(self.name.clone()),
        }
    }
}
