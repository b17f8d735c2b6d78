//! Attribute type definitions for the catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Precision of a date/time attribute.
///
/// Each kind accepts exactly one ISO-8601 textual grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalKind {
    /// `2007-12-03T10:15:30.00Z`
    Instant,
    /// `2007-12-03T10:15:30+01:00`
    OffsetDateTime,
    /// `2007-12-03T10:15:30+01:00[Europe/Paris]`
    ZonedDateTime,
    /// `2007-12-03`
    LocalDate,
    /// `2007-12-03T10:15:30`
    LocalDateTime,
    /// `10:15:30`
    LocalTime,
    /// `10:15:30+01:00`
    OffsetTime,
    /// `2007`
    Year,
    /// `2007-12`
    YearMonth,
}

impl TemporalKind {
    /// All temporal kinds.
    pub const ALL: [TemporalKind; 9] = [
        TemporalKind::Instant,
        TemporalKind::OffsetDateTime,
        TemporalKind::ZonedDateTime,
        TemporalKind::LocalDate,
        TemporalKind::LocalDateTime,
        TemporalKind::LocalTime,
        TemporalKind::OffsetTime,
        TemporalKind::Year,
        TemporalKind::YearMonth,
    ];

    /// Type name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TemporalKind::Instant => "Instant",
            TemporalKind::OffsetDateTime => "OffsetDateTime",
            TemporalKind::ZonedDateTime => "ZonedDateTime",
            TemporalKind::LocalDate => "LocalDate",
            TemporalKind::LocalDateTime => "LocalDateTime",
            TemporalKind::LocalTime => "LocalTime",
            TemporalKind::OffsetTime => "OffsetTime",
            TemporalKind::Year => "Year",
            TemporalKind::YearMonth => "YearMonth",
        }
    }
}

/// A field of a struct-typed attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    /// Field name.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub field_type: AttributeType,
}

/// Semantic type of an attribute, used to coerce filter literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// UUID identifier.
    Uuid,
    /// An enumeration type.
    Enum {
        /// Name of the enum type.
        name: String,
        /// Declared members, in ordinal order.
        variants: Vec<String>,
    },
    /// A date or time of the given precision.
    Temporal(TemporalKind),
    /// A structured value with named fields.
    Struct {
        /// Name of the struct type.
        name: String,
        /// Declared fields.
        fields: Vec<StructField>,
    },
}

impl AttributeType {
    /// Create an enum type.
    pub fn enum_type(name: impl Into<String>, variants: Vec<String>) -> Self {
        AttributeType::Enum {
            name: name.into(),
            variants,
        }
    }

    /// Create a struct type.
    pub fn struct_type(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = (String, AttributeType)>,
    ) -> Self {
        AttributeType::Struct {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(name, field_type)| StructField { name, field_type })
                .collect(),
        }
    }

    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            AttributeType::Int32
                | AttributeType::Int64
                | AttributeType::Float32
                | AttributeType::Float64
        )
    }

    /// Check if this type holds text.
    pub fn is_text(&self) -> bool {
        matches!(self, AttributeType::String | AttributeType::Enum { .. })
    }

    /// Look up a struct field type by name.
    pub fn struct_field(&self, name: &str) -> Option<&AttributeType> {
        match self {
            AttributeType::Struct { fields, .. } => fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| &f.field_type),
            _ => None,
        }
    }

    /// Type name used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            AttributeType::Bool => "Boolean",
            AttributeType::Int32 => "Integer",
            AttributeType::Int64 => "Long",
            AttributeType::Float32 => "Float",
            AttributeType::Float64 => "Double",
            AttributeType::String => "String",
            AttributeType::Uuid => "UUID",
            AttributeType::Enum { name, .. } | AttributeType::Struct { name, .. } => name,
            AttributeType::Temporal(kind) => kind.name(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
