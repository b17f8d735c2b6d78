//! Shared schema fixture for unit tests.

use crate::catalog::{
    AttributeDef, AttributeType, Catalog, EntityDef, RelationDef, SchemaBundle, TemporalKind,
};

/// A small library schema.
///
/// ```text
/// Book ─authors(M:N)→ Author ─publisher(M:1)→ Publisher ─editors(1:N)→ Editor
///  │                    └─books(M:N)→ Book
///  ├─publisher(M:1)→ Publisher
///  ├─reviews(1:N)→ Review
///  └─dimensions(embedded)→ Dimensions
/// ```
pub(crate) fn library_schema() -> SchemaBundle {
    let genre = AttributeType::enum_type(
        "Genre",
        vec!["Fiction".into(), "Poetry".into(), "Drama".into()],
    );

    SchemaBundle::new(1)
        .with_entity(EntityDef::new("Book", "id").with_attributes([
            AttributeDef::new("id", AttributeType::Int64),
            AttributeDef::new("title", AttributeType::String),
            AttributeDef::new("genre", genre),
            AttributeDef::optional("published", AttributeType::Temporal(TemporalKind::LocalDate)),
            AttributeDef::new("price", AttributeType::Float64),
        ]))
        .with_entity(EntityDef::new("Author", "id").with_attributes([
            AttributeDef::new("id", AttributeType::Int64),
            AttributeDef::new("name", AttributeType::String),
            AttributeDef::optional("born", AttributeType::Temporal(TemporalKind::Year)),
        ]))
        .with_entity(EntityDef::new("Publisher", "id").with_attributes([
            AttributeDef::new("id", AttributeType::Int64),
            AttributeDef::new("name", AttributeType::String),
        ]))
        .with_entity(EntityDef::new("Editor", "id").with_attributes([
            AttributeDef::new("id", AttributeType::Int64),
            AttributeDef::new("name", AttributeType::String),
        ]))
        .with_entity(EntityDef::new("Review", "id").with_attributes([
            AttributeDef::new("id", AttributeType::Int64),
            AttributeDef::new("rating", AttributeType::Int32),
            AttributeDef::new("posted", AttributeType::Temporal(TemporalKind::Instant)),
        ]))
        .with_entity(EntityDef::new("Dimensions", "width").with_attributes([
            AttributeDef::new("width", AttributeType::Float64),
            AttributeDef::new("height", AttributeType::Float64),
        ]))
        .with_relation(RelationDef::many_to_many("authors", "Book", "Author"))
        .with_relation(RelationDef::many_to_one("publisher", "Book", "Publisher"))
        .with_relation(RelationDef::one_to_many("reviews", "Book", "Review"))
        .with_relation(RelationDef::embedded("dimensions", "Book", "Dimensions"))
        .with_relation(RelationDef::many_to_many("books", "Author", "Book"))
        .with_relation(RelationDef::many_to_one("publisher", "Author", "Publisher"))
        .with_relation(RelationDef::one_to_many("editors", "Publisher", "Editor"))
}

/// The library schema as a catalog.
pub(crate) fn library_catalog() -> Catalog {
    Catalog::new(library_schema()).expect("library schema is valid")
}
