//! In-memory catalog built once from a schema bundle.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::provider::SchemaProvider;
use super::relation::RelationshipType;
use super::types::AttributeType;
use super::{EntityDef, RelationDef, SchemaBundle};
use crate::error::{Error, Result};

/// Per-entity lookup tables.
#[derive(Debug, Clone)]
struct EntityEntry {
    def: EntityDef,
    alias: String,
    relations: HashMap<String, RelationDef>,
}

/// The catalog of entity metadata.
///
/// Built and validated once at registration time; read-only afterwards.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: u64,
    entities: HashMap<String, EntityEntry>,
    aliases: HashMap<String, String>,
}

impl Catalog {
    /// Build a catalog from a schema bundle, validating cross references.
    pub fn new(bundle: SchemaBundle) -> Result<Self> {
        let mut entities: HashMap<String, EntityEntry> = HashMap::new();
        let mut aliases: HashMap<String, String> = HashMap::new();

        for def in bundle.entities {
            let alias = def.json_alias();
            if alias.is_empty() {
                return Err(Error::Schema("entity with empty name".into()));
            }
            if entities.contains_key(&def.name) {
                return Err(Error::Schema(format!("duplicate entity '{}'", def.name)));
            }
            if let Some(existing) = aliases.get(&alias) {
                return Err(Error::Schema(format!(
                    "alias '{}' is used by both '{}' and '{}'",
                    alias, existing, def.name
                )));
            }
            let mut seen = std::collections::HashSet::new();
            for attribute in &def.attributes {
                if !seen.insert(attribute.name.as_str()) {
                    return Err(Error::Schema(format!(
                        "duplicate attribute '{}' on entity '{}'",
                        attribute.name, def.name
                    )));
                }
            }

            aliases.insert(alias.clone(), def.name.clone());
            entities.insert(
                def.name.clone(),
                EntityEntry {
                    def,
                    alias,
                    relations: HashMap::new(),
                },
            );
        }

        for relation in bundle.relations {
            if !entities.contains_key(&relation.to_entity) {
                return Err(Error::Schema(format!(
                    "relation '{}' targets unknown entity '{}'",
                    relation.name, relation.to_entity
                )));
            }
            let source = entities.get_mut(&relation.from_entity).ok_or_else(|| {
                Error::Schema(format!(
                    "relation '{}' starts at unknown entity '{}'",
                    relation.name, relation.from_entity
                ))
            })?;
            if source.def.get_attribute(&relation.name).is_some() {
                return Err(Error::Schema(format!(
                    "relation '{}' on entity '{}' shadows an attribute",
                    relation.name, relation.from_entity
                )));
            }
            if source.relations.contains_key(&relation.name) {
                return Err(Error::Schema(format!(
                    "duplicate relation '{}' on entity '{}'",
                    relation.name, relation.from_entity
                )));
            }
            source.relations.insert(relation.name.clone(), relation);
        }

        debug!(
            version = bundle.version,
            entities = entities.len(),
            relations = entities.values().map(|e| e.relations.len()).sum::<usize>(),
            "catalog built"
        );

        Ok(Self {
            version: bundle.version,
            entities,
            aliases,
        })
    }

    /// Load and build a catalog from a JSON schema file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(SchemaBundle::load(path)?)
    }

    /// Schema version the catalog was built from.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Get an entity definition by type name.
    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name).map(|e| &e.def)
    }

    /// List all entity type names, sorted.
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get a relation by source entity and name.
    pub fn get_relation(&self, entity: &str, name: &str) -> Option<&RelationDef> {
        self.entities.get(entity)?.relations.get(name)
    }

    /// Get all relations where the given entity is the source, sorted by name.
    pub fn relations_from(&self, entity: &str) -> Vec<&RelationDef> {
        let mut relations: Vec<&RelationDef> = self
            .entities
            .get(entity)
            .map(|e| e.relations.values().collect())
            .unwrap_or_default();
        relations.sort_by(|a, b| a.name.cmp(&b.name));
        relations
    }
}

impl SchemaProvider for Catalog {
    fn attributes_of(&self, entity: &str) -> Vec<&str> {
        self.entities
            .get(entity)
            .map(|e| e.def.attributes.iter().map(|a| a.name.as_str()).collect())
            .unwrap_or_default()
    }

    fn attribute_type(&self, entity: &str, attribute: &str) -> Option<&AttributeType> {
        self.entities
            .get(entity)?
            .def
            .get_attribute(attribute)
            .map(|a| &a.attribute_type)
    }

    fn relationship_type(&self, entity: &str, relationship: &str) -> Option<RelationshipType> {
        self.get_relation(entity, relationship)
            .map(|r| r.relationship_type)
    }

    fn related_type(&self, entity: &str, relationship: &str) -> Option<&str> {
        self.get_relation(entity, relationship)
            .map(|r| r.to_entity.as_str())
    }

    fn entity_type_for_alias(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    fn alias_for(&self, entity: &str) -> Option<&str> {
        self.entities.get(entity).map(|e| e.alias.as_str())
    }
}
