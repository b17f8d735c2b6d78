//! Attribute definitions for entities.

use serde::{Deserialize, Serialize};

use super::types::AttributeType;

/// An attribute (non-relationship field) of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Attribute name.
    pub name: String,
    /// Semantic type of the attribute.
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    /// Whether the attribute may be null.
    #[serde(default)]
    pub nullable: bool,
}

impl AttributeDef {
    /// Create a new non-nullable attribute.
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
            nullable: false,
        }
    }

    /// Create a nullable attribute.
    pub fn optional(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
            nullable: true,
        }
    }
}
