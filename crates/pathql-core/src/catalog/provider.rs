//! Read-only schema lookup consumed by the planner.

use super::relation::{RelationshipKind, RelationshipType};
use super::types::AttributeType;

/// Schema metadata lookup.
///
/// Implementations are populated once before any request is planned and are
/// never mutated afterwards, so they can be shared between threads without
/// locking.
pub trait SchemaProvider: Send + Sync {
    /// Attribute names of an entity type, in declaration order.
    fn attributes_of(&self, entity: &str) -> Vec<&str>;

    /// Semantic type of an attribute.
    fn attribute_type(&self, entity: &str, attribute: &str) -> Option<&AttributeType>;

    /// Declared type of a relationship, `None` when the entity has no such relationship.
    fn relationship_type(&self, entity: &str, relationship: &str) -> Option<RelationshipType>;

    /// Entity type reached through a relationship.
    fn related_type(&self, entity: &str, relationship: &str) -> Option<&str>;

    /// Entity type registered under a request alias.
    fn entity_type_for_alias(&self, alias: &str) -> Option<&str>;

    /// Request alias of an entity type.
    fn alias_for(&self, entity: &str) -> Option<&str>;

    /// Collapsed cardinality of a relationship.
    fn relationship_kind(&self, entity: &str, relationship: &str) -> Option<RelationshipKind> {
        self.relationship_type(entity, relationship)
            .and_then(|t| t.kind())
    }

    /// Check if `attribute` is an attribute of `entity`.
    fn has_attribute(&self, entity: &str, attribute: &str) -> bool {
        self.attribute_type(entity, attribute).is_some()
    }
}
