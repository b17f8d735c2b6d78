//! Entity schema catalog.
//!
//! The catalog answers the planner's schema questions: which names are
//! attributes, which are relationships, what they point at and what type a
//! filter literal must be coerced into.

mod catalog;
mod entity;
mod field;
mod provider;
mod relation;
mod schema;
mod types;

pub use catalog::Catalog;
pub use entity::EntityDef;
pub use field::AttributeDef;
pub use provider::SchemaProvider;
pub use relation::{RelationDef, RelationshipKind, RelationshipType};
pub use schema::SchemaBundle;
pub use types::{AttributeType, StructField, TemporalKind};
