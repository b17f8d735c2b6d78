//! Runtime value types for filter operands and coerced results.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// ISO-8601 layout shared by every date-time rendering.
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Time-of-day layout; the fraction is omitted when zero.
const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// A runtime value that can appear in a filter expression.
///
/// Raw request values usually arrive as [`Value::String`]; coercion turns them
/// into the variant matching the target attribute. Temporal variants keep the
/// precision of the attribute they were coerced for, so an `Instant` never
/// compares equal to a `LocalDateTime` with the same wall clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 32-bit floating point.
    Float32(f32),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string.
    String(String),
    /// UUID as 16 bytes.
    Uuid([u8; 16]),
    /// Enumeration member, stored by its declared name.
    Enum(String),
    /// Point on the UTC time-line.
    Instant(DateTime<Utc>),
    /// Date-time with a fixed offset from UTC.
    OffsetDateTime(DateTime<FixedOffset>),
    /// Date-time with an offset and an optional region zone id.
    ZonedDateTime {
        /// The resolved instant with its offset.
        datetime: DateTime<FixedOffset>,
        /// Region id such as `Europe/Paris`, when given.
        zone: Option<String>,
    },
    /// Calendar date without zone.
    LocalDate(NaiveDate),
    /// Calendar date and wall-clock time without zone.
    LocalDateTime(NaiveDateTime),
    /// Wall-clock time without zone.
    LocalTime(NaiveTime),
    /// Wall-clock time with a fixed offset.
    OffsetTime {
        /// Local time of day.
        time: NaiveTime,
        /// Offset from UTC in seconds.
        offset_seconds: i32,
    },
    /// Proleptic year.
    Year(i32),
    /// Year and month of year (1-12).
    YearMonth {
        /// Proleptic year.
        year: i32,
        /// Month of year, 1-based.
        month: u32,
    },
    /// Key/value mapping, used for struct-typed attributes.
    Map(BTreeMap<String, Value>),
    /// Ordered list of values.
    List(Vec<Value>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is one of the temporal variants.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Value::Instant(_)
                | Value::OffsetDateTime(_)
                | Value::ZonedDateTime { .. }
                | Value::LocalDate(_)
                | Value::LocalDateTime(_)
                | Value::LocalTime(_)
                | Value::OffsetTime { .. }
                | Value::Year(_)
                | Value::YearMonth { .. }
        )
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::String(_) => "string",
            Value::Uuid(_) => "uuid",
            Value::Enum(_) => "enum",
            Value::Instant(_) => "instant",
            Value::OffsetDateTime(_) => "offset_date_time",
            Value::ZonedDateTime { .. } => "zoned_date_time",
            Value::LocalDate(_) => "local_date",
            Value::LocalDateTime(_) => "local_date_time",
            Value::LocalTime(_) => "local_time",
            Value::OffsetTime { .. } => "offset_time",
            Value::Year(_) => "year",
            Value::YearMonth { .. } => "year_month",
            Value::Map(_) => "map",
            Value::List(_) => "list",
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            Value::Int32(i) => Some(*i as i64),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(f) => Some(*f),
            Value::Float32(f) => Some(*f as f64),
            Value::Int32(i) => Some(*i as f64),
            Value::Int64(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as UUID.
    pub fn as_uuid(&self) -> Option<&[u8; 16]> {
        match self {
            Value::Uuid(u) => Some(u),
            _ => None,
        }
    }

    /// Try to get as a key/value mapping.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// Render an offset the way ISO-8601 does: `Z` for UTC, `+HH:MM` otherwise.
pub fn format_offset(offset_seconds: i32) -> String {
    if offset_seconds == 0 {
        return "Z".to_string();
    }
    let sign = if offset_seconds < 0 { '-' } else { '+' };
    let abs = offset_seconds.unsigned_abs();
    let (hours, minutes, seconds) = (abs / 3600, (abs % 3600) / 60, abs % 60);
    if seconds == 0 {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Render a year with at least four digits and a sign past 9999.
pub fn format_year(year: i32) -> String {
    if year > 9999 {
        format!("+{year}")
    } else if year < 0 {
        format!("-{:04}", year.unsigned_abs())
    } else {
        format!("{year:04}")
    }
}

/// Render 16 bytes in the canonical 8-4-4-4-12 form.
pub fn format_uuid(bytes: &[u8; 16]) -> String {
    let hex = hex::encode(bytes);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int32(i) => write!(f, "{i}"),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float32(x) => write!(f, "{x}"),
            Value::Float64(x) => write!(f, "{x}"),
            Value::String(s) | Value::Enum(s) => write!(f, "{s}"),
            Value::Uuid(u) => write!(f, "{}", format_uuid(u)),
            Value::Instant(dt) => write!(f, "{}Z", dt.naive_utc().format(DATE_TIME_FORMAT)),
            Value::OffsetDateTime(dt) => write!(
                f,
                "{}{}",
                dt.naive_local().format(DATE_TIME_FORMAT),
                format_offset(dt.offset().local_minus_utc())
            ),
            Value::ZonedDateTime { datetime, zone } => {
                write!(
                    f,
                    "{}{}",
                    datetime.naive_local().format(DATE_TIME_FORMAT),
                    format_offset(datetime.offset().local_minus_utc())
                )?;
                match zone {
                    Some(zone) => write!(f, "[{zone}]"),
                    None => Ok(()),
                }
            }
            Value::LocalDate(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::LocalDateTime(dt) => write!(f, "{}", dt.format(DATE_TIME_FORMAT)),
            Value::LocalTime(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            Value::OffsetTime {
                time,
                offset_seconds,
            } => write!(f, "{}{}", time.format(TIME_FORMAT), format_offset(*offset_seconds)),
            Value::Year(y) => write!(f, "{}", format_year(*y)),
            Value::YearMonth { year, month } => write!(f, "{}-{month:02}", format_year(*year)),
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// Conversion implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<[u8; 16]> for Value {
    fn from(v: [u8; 16]) -> Self {
        Value::Uuid(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::LocalDate(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Instant(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}
