//! Core error types.
//!
//! Every variant is terminal for the request being planned: nothing is retried
//! and nothing is downgraded to a warning.

use thiserror::Error;

/// Planning and validation errors.
#[derive(Debug, Error)]
pub enum Error {
    /// No entity type is registered under this name or alias.
    #[error("unknown entity type '{0}'")]
    UnknownEntity(String),

    /// A path hop names something that is neither a relationship nor an attribute.
    #[error("{entity} doesn't have relationship with {relationship}")]
    UnknownRelationship {
        /// Entity the hop was resolved against.
        entity: String,
        /// Offending segment.
        relationship: String,
    },

    /// A path hop goes through a relationship the join planner cannot follow.
    #[error(
        "relationship not supported - {entity} relationship with {relationship} is {kind}, \
         must be OneToOne, ManyToOne, OneToMany or ManyToMany"
    )]
    UnsupportedRelationshipKind {
        /// Entity the hop was resolved against.
        entity: String,
        /// Offending segment.
        relationship: String,
        /// Kind reported by the schema.
        kind: String,
    },

    /// The terminal segment is not an attribute of the entity reached.
    #[error("{entity} doesn't contain the field {attribute}")]
    UnknownAttribute {
        /// Entity reached by the preceding hops.
        entity: String,
        /// Offending segment.
        attribute: String,
    },

    /// The path string itself is malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The raw path.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A literal could not be coerced into the attribute's type.
    #[error("invalid value '{value}' for {target}: {reason}")]
    InvalidValue {
        /// The raw value as received.
        value: String,
        /// Name of the target type.
        target: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// Operator and operands do not fit together.
    #[error("invalid predicate: {0}")]
    InvalidPredicate(String),

    /// A sort path does not line up with the join chain built for filtering.
    #[error("{path} must match filter key chain: {reason}")]
    InconsistentJoinPath {
        /// The sort (or filter) path that failed to align.
        path: String,
        /// Where the chains diverge.
        reason: String,
    },

    /// The schema bundle is inconsistent.
    #[error("schema error: {0}")]
    Schema(String),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] pathql_proto::Error),

    /// I/O error while loading a schema.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_value(
        value: impl ToString,
        target: impl ToString,
        reason: impl ToString,
    ) -> Self {
        Error::InvalidValue {
            value: value.to_string(),
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownAttribute {
            entity: "Author".into(),
            attribute: "nonexistent".into(),
        };
        assert_eq!(err.to_string(), "Author doesn't contain the field nonexistent");

        let err = Error::invalid_value("Bad", "OffsetDateTime", "input contains invalid characters");
        assert!(err.to_string().contains("'Bad'"));
        assert!(err.to_string().contains("OffsetDateTime"));

        let err = Error::InconsistentJoinPath {
            path: "authors.publisher.name".into(),
            reason: "alias 'publisher' is reached through 'book'".into(),
        };
        assert!(err.to_string().starts_with("authors.publisher.name must match filter key chain"));
    }
}
