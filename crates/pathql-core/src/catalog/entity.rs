//! Entity definitions.

use serde::{Deserialize, Serialize};

use super::field::AttributeDef;

/// An entity definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Entity type name (unique within schema).
    pub name: String,
    /// Alias used in request paths; derived from `name` when absent.
    #[serde(default)]
    pub alias: Option<String>,
    /// Name of the identity attribute.
    pub identity_field: String,
    /// Attribute definitions.
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

impl EntityDef {
    /// Create a new entity definition.
    pub fn new(name: impl Into<String>, identity_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            identity_field: identity_field.into(),
            attributes: Vec::new(),
        }
    }

    /// Set an explicit request alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Add an attribute to the entity.
    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add multiple attributes.
    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = AttributeDef>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Get an attribute by name.
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Alias used in request paths: the explicit alias, or the type name with
    /// its first letter lower-cased (`HeadOfGovernment` -> `headOfGovernment`).
    pub fn json_alias(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
