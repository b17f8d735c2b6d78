//! Integration tests for join planning over a library schema.

use pathql_core::catalog::{
    AttributeDef, AttributeType, Catalog, EntityDef, RelationDef, SchemaBundle, SchemaProvider,
    TemporalKind,
};
use pathql_core::query::{
    Coercer, EntityObject, FilterOperation, InMemoryFilterOperation, JoinOrigin, PathResolver,
    QueryPlanner, SortOrder, Sorting, SqlFilterOperation,
};
use pathql_core::{Error, PlannerConfig};
use pathql_proto::{FilterOp, FilterParam, QueryRequest, Value};
use pretty_assertions::assert_eq;

struct TestContext {
    catalog: Catalog,
    _schema_dir: tempfile::TempDir,
}

impl TestContext {
    fn new() -> Self {
        let schema_dir = tempfile::tempdir().unwrap();
        let schema_path = schema_dir.path().join("schema.json");
        std::fs::write(&schema_path, library_schema().to_json().unwrap()).unwrap();
        let catalog = Catalog::load(&schema_path).unwrap();

        Self {
            catalog,
            _schema_dir: schema_dir,
        }
    }

    fn planner(&self) -> QueryPlanner<'_, Catalog> {
        QueryPlanner::new(&self.catalog)
    }
}

fn library_schema() -> SchemaBundle {
    let genre = AttributeType::enum_type(
        "Genre",
        vec!["Fiction".into(), "Poetry".into(), "Drama".into()],
    );

    let book = EntityDef::new("Book", "id").with_attributes([
        AttributeDef::new("id", AttributeType::Int64),
        AttributeDef::new("title", AttributeType::String),
        AttributeDef::new("genre", genre),
        AttributeDef::optional("published", AttributeType::Temporal(TemporalKind::LocalDate)),
        AttributeDef::optional("released", AttributeType::Temporal(TemporalKind::ZonedDateTime)),
    ]);
    let author = EntityDef::new("Author", "id").with_attributes([
        AttributeDef::new("id", AttributeType::Int64),
        AttributeDef::new("name", AttributeType::String),
        AttributeDef::optional("born", AttributeType::Temporal(TemporalKind::Year)),
    ]);
    let publisher = EntityDef::new("Publisher", "id").with_attributes([
        AttributeDef::new("id", AttributeType::Int64),
        AttributeDef::new("name", AttributeType::String),
        AttributeDef::new("founded", AttributeType::Temporal(TemporalKind::YearMonth)),
    ]);
    let editor = EntityDef::new("Editor", "id").with_attributes([
        AttributeDef::new("id", AttributeType::Int64),
        AttributeDef::new("name", AttributeType::String),
        AttributeDef::new("hired", AttributeType::Temporal(TemporalKind::Instant)),
    ]);
    let chapter = EntityDef::new("Chapter", "id").with_attributes([
        AttributeDef::new("id", AttributeType::Int64),
        AttributeDef::new("title", AttributeType::String),
    ]);

    SchemaBundle::new(1)
        .with_entity(book)
        .with_entity(author)
        .with_entity(publisher)
        .with_entity(editor)
        .with_entity(chapter)
        .with_relation(RelationDef::many_to_many("authors", "Book", "Author").with_inverse("books"))
        .with_relation(RelationDef::many_to_many("books", "Author", "Book").with_inverse("authors"))
        .with_relation(RelationDef::many_to_one("publisher", "Book", "Publisher"))
        .with_relation(RelationDef::many_to_one("publisher", "Author", "Publisher"))
        .with_relation(RelationDef::one_to_many("editors", "Publisher", "Editor"))
        .with_relation(RelationDef::one_to_one("mentor", "Editor", "Editor"))
        .with_relation(RelationDef::embedded("chapters", "Book", "Chapter"))
}

fn filter(path: &str, op: FilterOp, values: &[&str]) -> FilterParam {
    FilterParam::new(path, op, values.iter().copied())
}

#[test]
fn test_schema_provider_surface() {
    let ctx = TestContext::new();
    let catalog = &ctx.catalog;

    assert_eq!(catalog.entity_type_for_alias("book"), Some("Book"));
    assert_eq!(catalog.related_type("Book", "authors"), Some("Author"));
    assert_eq!(catalog.related_type("Book", "title"), None);
    assert!(catalog.attributes_of("Publisher").contains(&"founded"));
}

#[test]
fn test_resolution_rules() {
    let ctx = TestContext::new();
    let resolver = PathResolver::new(&ctx.catalog, &PlannerConfig::default());

    assert!(resolver.resolve("Book", "authors.publisher.editors.name").is_ok());
    assert!(resolver.resolve("Book", "publisher.editors.mentor.name").is_ok());

    match resolver.resolve("Book", "authors.nonexistent").unwrap_err() {
        Error::UnknownAttribute { entity, attribute } => {
            assert_eq!(entity, "Author");
            assert_eq!(attribute, "nonexistent");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(matches!(
        resolver.resolve("Book", "chapters.title"),
        Err(Error::UnsupportedRelationshipKind { .. })
    ));
    assert!(matches!(
        resolver.resolve("Book", "translators.name"),
        Err(Error::UnknownRelationship { .. })
    ));
}

#[test]
fn test_filter_joins_are_deduplicated() {
    let ctx = TestContext::new();
    let request = QueryRequest::new("book")
        .with_filter(filter("book.authors.publisher.name", FilterOp::Eq, &["Ace"]))
        .with_filter(filter("book.authors.publisher.id", FilterOp::In, &["1", "2"]));

    let plan = ctx.planner().plan(&request).unwrap();
    let aliases: Vec<&str> = plan.joins().iter().map(|j| j.alias.as_str()).collect();
    assert_eq!(aliases, vec!["authors", "publisher"]);
}

#[test]
fn test_sort_reuses_and_extends_filter_chain() {
    let ctx = TestContext::new();
    let request = QueryRequest::new("book")
        .with_filter(filter("book.authors.publisher.name", FilterOp::Eq, &["Ace"]))
        .with_sort("authors.publisher.founded,-authors.born,authors.publisher.editors.name");

    let plan = ctx.planner().plan(&request).unwrap();
    let joins: Vec<(&str, Option<usize>, JoinOrigin)> = plan
        .joins()
        .iter()
        .map(|j| (j.alias.as_str(), j.parent, j.origin))
        .collect();
    assert_eq!(
        joins,
        vec![
            ("authors", None, JoinOrigin::Filter),
            ("publisher", Some(0), JoinOrigin::Filter),
            ("editors", Some(1), JoinOrigin::Sort),
        ]
    );

    let terms: Vec<(&str, &str, SortOrder)> = plan
        .order_by()
        .iter()
        .map(|t| (t.alias.as_str(), t.attribute.as_str(), t.order))
        .collect();
    assert_eq!(
        terms,
        vec![
            ("publisher", "founded", SortOrder::Asc),
            ("authors", "born", SortOrder::Desc),
            ("editors", "name", SortOrder::Asc),
        ]
    );
}

#[test]
fn test_sort_branch_created_under_shared_prefix() {
    let ctx = TestContext::new();
    let request = QueryRequest::new("author")
        .with_filter(filter("author.books.title", FilterOp::Prefix, &["Du"]))
        .with_sort("books.publisher.name");

    let plan = ctx.planner().plan(&request).unwrap();
    let publisher = plan.joins().iter().find(|j| j.alias == "publisher").unwrap();
    assert_eq!(plan.lineage(publisher.id), vec!["books", "publisher"]);
    assert_eq!(plan.joins()[publisher.parent.unwrap()].alias, "books");
}

#[test]
fn test_misaligned_sort_is_rejected() {
    let ctx = TestContext::new();
    let request = QueryRequest::new("book")
        .with_filter(filter("book.authors.publisher.name", FilterOp::Eq, &["Ace"]))
        .with_sort("authors.books.publisher.name");

    match ctx.planner().plan(&request).unwrap_err() {
        Error::InconsistentJoinPath { path, .. } => {
            assert_eq!(path, "authors.books.publisher.name");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_root_filters_and_together() {
    let ctx = TestContext::new();
    let request = QueryRequest::new("book")
        .with_filter(filter("book.title", FilterOp::Infix, &["un"]))
        .with_filter(filter("book.genre", FilterOp::NotIn, &["poetry"]));

    let plan = ctx.planner().plan(&request).unwrap();
    assert!(plan.joins().is_empty());
    let rendered = plan.render(&SqlFilterOperation);
    assert_eq!(
        rendered.sql,
        "SELECT book FROM Book book\nWHERE book.title LIKE ? ESCAPE '\\' AND book.genre NOT IN (?)"
    );
    assert_eq!(
        rendered.params,
        vec![Value::from("%un%"), Value::Enum("Poetry".into())]
    );
}

#[test]
fn test_rendered_plan() {
    let ctx = TestContext::new();
    let params = [
        ("filter[book.authors.name][prefix]", "Frank"),
        ("filter[book.published][lt]", "1970-01-01"),
        ("sort", "-published,authors.publisher.name"),
    ];
    let request = QueryRequest::from_query_params("book", params).unwrap();
    let plan = ctx.planner().plan(&request).unwrap();

    assert_eq!(
        plan.render(&SqlFilterOperation).sql,
        "SELECT book FROM Book book\n\
         JOIN book.authors authors\n\
         JOIN authors.publisher publisher\n\
         WHERE book.published < ? AND authors.name LIKE ? ESCAPE '\\'\n\
         ORDER BY book.published DESC, publisher.name ASC"
    );
}

#[test]
fn test_temporal_round_trip_through_filters() {
    let ctx = TestContext::new();
    let coercer = Coercer::default();
    let samples = [
        ("Editor", "hired", "2019-03-01T08:30:00Z"),
        ("Book", "published", "1965-08-01"),
        ("Book", "released", "2021-10-22T09:00:00+02:00[Europe/Berlin]"),
        ("Author", "born", "1920"),
        ("Publisher", "founded", "1953-06"),
    ];
    for (entity, attribute, text) in samples {
        let target = ctx.catalog.attribute_type(entity, attribute).unwrap();
        let value = coercer.coerce_str(text, target).unwrap();
        assert_eq!(value.to_string(), text);
        assert_eq!(coercer.coerce_str(&value.to_string(), target).unwrap(), value);
    }
}

#[test]
fn test_invalid_operand_rejects_request() {
    let ctx = TestContext::new();
    let request = QueryRequest::new("book")
        .with_filter(filter("book.published", FilterOp::Gt, &["Bad"]))
        .with_sort("title");

    match ctx.planner().plan(&request).unwrap_err() {
        Error::InvalidValue { value, target, .. } => {
            assert_eq!(value, "Bad");
            assert_eq!(target, "LocalDate");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_strict_enums() {
    let ctx = TestContext::new();
    let planner = QueryPlanner::with_config(&ctx.catalog, PlannerConfig::strict());
    let request =
        QueryRequest::new("book").with_filter(filter("book.genre", FilterOp::Eq, &["drama"]));
    assert!(matches!(
        planner.plan(&request),
        Err(Error::InvalidValue { .. })
    ));
}

#[test]
fn test_in_memory_evaluation_of_planned_filters() {
    let ctx = TestContext::new();
    let planner = ctx.planner();
    let filters = planner
        .filter_set(&[
            filter("book.authors.name", FilterOp::Prefix, &["Frank"]),
            filter("book.genre", FilterOp::Eq, &["Fiction"]),
        ])
        .unwrap();

    let dune = EntityObject::new()
        .with_attribute("genre", Value::Enum("Fiction".into()))
        .with_related("authors", EntityObject::new().with_attribute("name", "Frank Herbert"));
    let emma = EntityObject::new()
        .with_attribute("genre", Value::Enum("Fiction".into()))
        .with_related("authors", EntityObject::new().with_attribute("name", "Jane Austen"));

    let op = InMemoryFilterOperation;
    let matches = |record: &EntityObject| {
        filters
            .groups()
            .iter()
            .all(|g| op.apply_condition(g.condition(), record))
    };
    assert!(matches(&dune));
    assert!(!matches(&emma));
}

#[test]
fn test_sorting_sentinel() {
    let ctx = TestContext::new();
    let planner = ctx.planner();

    let sorting = Sorting::parse("");
    assert!(sorting.is_default());
    assert!(planner.sort_rules("Book", &sorting).unwrap().is_empty());

    let rules = planner
        .sort_rules("Book", &Sorting::parse("-title,published,+id"))
        .unwrap();
    let order: Vec<(&str, SortOrder)> = rules
        .iter()
        .map(|r| (r.path.attribute(), r.order))
        .collect();
    assert_eq!(
        order,
        vec![
            ("title", SortOrder::Desc),
            ("published", SortOrder::Asc),
            ("id", SortOrder::Asc),
        ]
    );
}
