//! Literal coercion into attribute types.
//!
//! Request values arrive as text (or as loosely typed JSON values) and must be
//! turned into the representation of the attribute they are compared with.
//! Dispatch is a closed match over [`AttributeType`]; the only shared state is
//! the table of temporal parsers, built on first use and never mutated.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use pathql_proto::Value;

use crate::catalog::{AttributeType, StructField, TemporalKind};
use crate::config::PlannerConfig;
use crate::error::{Error, Result};

/// Parses one ISO-8601 profile. The error is a parser diagnostic.
type TemporalParser = fn(&str) -> std::result::Result<Value, String>;

static TEMPORAL_PARSERS: LazyLock<HashMap<TemporalKind, TemporalParser>> = LazyLock::new(|| {
    let mut parsers: HashMap<TemporalKind, TemporalParser> = HashMap::new();
    parsers.insert(TemporalKind::Instant, parse_instant);
    parsers.insert(TemporalKind::OffsetDateTime, parse_offset_date_time);
    parsers.insert(TemporalKind::ZonedDateTime, parse_zoned_date_time);
    parsers.insert(TemporalKind::LocalDate, parse_local_date);
    parsers.insert(TemporalKind::LocalDateTime, parse_local_date_time);
    parsers.insert(TemporalKind::LocalTime, parse_local_time);
    parsers.insert(TemporalKind::OffsetTime, parse_offset_time);
    parsers.insert(TemporalKind::Year, parse_year);
    parsers.insert(TemporalKind::YearMonth, parse_year_month);
    parsers
});

/// Largest integer magnitude an `f32` holds exactly.
const F32_EXACT_INT: i64 = 1 << 24;
/// Largest integer magnitude an `f64` holds exactly.
const F64_EXACT_INT: i64 = 1 << 53;

/// Converts raw values into the runtime representation of an attribute type.
#[derive(Debug, Clone)]
pub struct Coercer {
    case_insensitive_enums: bool,
    allow_enum_ordinals: bool,
}

impl Default for Coercer {
    fn default() -> Self {
        Self::new(&PlannerConfig::default())
    }
}

impl Coercer {
    /// Create a coercer honouring the enum switches of `config`.
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            case_insensitive_enums: config.case_insensitive_enums,
            allow_enum_ordinals: config.allow_enum_ordinals,
        }
    }

    /// Coerce `raw` into `target`.
    ///
    /// Null and values already in the target representation are returned
    /// unchanged.
    pub fn coerce(&self, raw: &Value, target: &AttributeType) -> Result<Value> {
        if raw.is_null() || Self::matches(raw, target) {
            return Ok(raw.clone());
        }

        match target {
            AttributeType::Enum { name, variants } => self.coerce_enum(raw, name, variants),
            AttributeType::Temporal(kind) => Self::coerce_temporal(raw, *kind),
            AttributeType::Struct { name, fields } => self.coerce_struct(raw, name, fields),
            AttributeType::Bool => Self::coerce_bool(raw),
            AttributeType::Int32 => Self::coerce_int32(raw),
            AttributeType::Int64 => Self::coerce_int64(raw),
            AttributeType::Float32 => Self::coerce_float32(raw),
            AttributeType::Float64 => Self::coerce_float64(raw),
            AttributeType::String => Self::coerce_string(raw),
            AttributeType::Uuid => Self::coerce_uuid(raw),
        }
    }

    /// Coerce a textual literal into `target`.
    pub fn coerce_str(&self, raw: &str, target: &AttributeType) -> Result<Value> {
        self.coerce(&Value::String(raw.to_string()), target)
    }

    /// Whether `value` already has the representation `target` expects.
    fn matches(value: &Value, target: &AttributeType) -> bool {
        match (target, value) {
            (AttributeType::Bool, Value::Bool(_))
            | (AttributeType::Int32, Value::Int32(_))
            | (AttributeType::Int64, Value::Int64(_))
            | (AttributeType::Float32, Value::Float32(_))
            | (AttributeType::Float64, Value::Float64(_))
            | (AttributeType::String, Value::String(_))
            | (AttributeType::Uuid, Value::Uuid(_)) => true,
            (AttributeType::Enum { variants, .. }, Value::Enum(member)) => {
                variants.iter().any(|v| v == member)
            }
            (AttributeType::Temporal(kind), value) => temporal_kind_of(value) == Some(*kind),
            _ => false,
        }
    }

    fn coerce_enum(&self, raw: &Value, name: &str, variants: &[String]) -> Result<Value> {
        let not_member = || Error::invalid_value(raw, name, "not a member of the enumeration");

        let ordinal = |index: i64| -> Result<Value> {
            usize::try_from(index)
                .ok()
                .and_then(|i| variants.get(i))
                .map(|v| Value::Enum(v.clone()))
                .ok_or_else(not_member)
        };

        match raw {
            Value::String(text) | Value::Enum(text) => {
                if let Some(member) = variants.iter().find(|v| *v == text) {
                    return Ok(Value::Enum(member.clone()));
                }
                if self.case_insensitive_enums {
                    if let Some(member) = variants.iter().find(|v| v.eq_ignore_ascii_case(text)) {
                        return Ok(Value::Enum(member.clone()));
                    }
                }
                match text.trim().parse::<i64>() {
                    Ok(index) if self.allow_enum_ordinals => ordinal(index),
                    _ => Err(not_member()),
                }
            }
            Value::Int32(_) | Value::Int64(_) if self.allow_enum_ordinals => {
                ordinal(raw.as_i64().unwrap_or(-1))
            }
            _ => Err(not_member()),
        }
    }

    fn coerce_temporal(raw: &Value, kind: TemporalKind) -> Result<Value> {
        let text = match raw {
            Value::String(text) => text,
            other => {
                return Err(Error::invalid_value(
                    other,
                    kind.name(),
                    format!("cannot convert {} to a date or time", other.type_name()),
                ))
            }
        };
        let parser = TEMPORAL_PARSERS
            .get(&kind)
            .ok_or_else(|| Error::invalid_value(text, kind.name(), "no parser registered"))?;
        parser(text).map_err(|reason| Error::invalid_value(text, kind.name(), reason))
    }

    fn coerce_struct(&self, raw: &Value, name: &str, fields: &[StructField]) -> Result<Value> {
        let entries = raw
            .as_map()
            .ok_or_else(|| Error::invalid_value(raw, name, "expected a key/value mapping"))?;

        let mut coerced = BTreeMap::new();
        for (key, value) in entries {
            let field = fields.iter().find(|f| &f.name == key).ok_or_else(|| {
                Error::invalid_value(raw, name, format!("undeclared field '{key}'"))
            })?;
            coerced.insert(key.clone(), self.coerce(value, &field.field_type)?);
        }
        Ok(Value::Map(coerced))
    }

    fn coerce_bool(raw: &Value) -> Result<Value> {
        let parsed = match raw {
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "on" | "1" => Some(true),
                "false" | "no" | "n" | "off" | "0" => Some(false),
                _ => None,
            },
            Value::Int32(_) | Value::Int64(_) => match raw.as_i64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            _ => None,
        };
        parsed
            .map(Value::Bool)
            .ok_or_else(|| Error::invalid_value(raw, "Boolean", "not a boolean"))
    }

    fn coerce_int32(raw: &Value) -> Result<Value> {
        let wide = Self::coerce_int64(raw).map_err(|_| Self::not_integer(raw, "Integer"))?;
        wide.as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int32)
            .ok_or_else(|| Error::invalid_value(raw, "Integer", "out of range"))
    }

    fn coerce_int64(raw: &Value) -> Result<Value> {
        let parsed = match raw {
            Value::String(text) => text.trim().parse::<i64>().ok(),
            Value::Int32(_) | Value::Int64(_) => raw.as_i64(),
            Value::Float32(_) | Value::Float64(_) => raw
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= F64_EXACT_INT as f64)
                .map(|f| f as i64),
            _ => None,
        };
        parsed
            .map(Value::Int64)
            .ok_or_else(|| Self::not_integer(raw, "Long"))
    }

    fn coerce_float32(raw: &Value) -> Result<Value> {
        let parsed = match raw {
            Value::String(text) => text.trim().parse::<f32>().ok(),
            Value::Int32(_) | Value::Int64(_) => raw
                .as_i64()
                .filter(|i| i.abs() <= F32_EXACT_INT)
                .map(|i| i as f32),
            Value::Float64(f) => {
                let narrowed = *f as f32;
                (narrowed as f64 == *f).then_some(narrowed)
            }
            _ => None,
        };
        parsed
            .filter(|f| f.is_finite())
            .map(Value::Float32)
            .ok_or_else(|| Error::invalid_value(raw, "Float", "not a representable float"))
    }

    fn coerce_float64(raw: &Value) -> Result<Value> {
        let parsed = match raw {
            Value::String(text) => text.trim().parse::<f64>().ok(),
            Value::Int32(_) | Value::Int64(_) => raw
                .as_i64()
                .filter(|i| i.abs() <= F64_EXACT_INT)
                .map(|i| i as f64),
            Value::Float32(f) => Some(*f as f64),
            _ => None,
        };
        parsed
            .filter(|f| f.is_finite())
            .map(Value::Float64)
            .ok_or_else(|| Error::invalid_value(raw, "Double", "not a representable double"))
    }

    fn coerce_string(raw: &Value) -> Result<Value> {
        match raw {
            Value::Map(_) | Value::List(_) => Err(Error::invalid_value(
                raw,
                "String",
                format!("cannot convert {} to text", raw.type_name()),
            )),
            other => Ok(Value::String(other.to_string())),
        }
    }

    fn coerce_uuid(raw: &Value) -> Result<Value> {
        let text = raw
            .as_str()
            .ok_or_else(|| Error::invalid_value(raw, "UUID", "expected text"))?;
        let digits: String = text.trim().chars().filter(|c| *c != '-').collect();
        if digits.len() != 32 {
            return Err(Error::invalid_value(text, "UUID", "expected 32 hex digits"));
        }
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(&digits, &mut bytes)
            .map_err(|e| Error::invalid_value(text, "UUID", e))?;
        Ok(Value::Uuid(bytes))
    }

    fn not_integer(raw: &Value, target: &str) -> Error {
        Error::invalid_value(raw, target, "not an integer")
    }
}

/// Temporal kind of a value, if it is temporal.
fn temporal_kind_of(value: &Value) -> Option<TemporalKind> {
    match value {
        Value::Instant(_) => Some(TemporalKind::Instant),
        Value::OffsetDateTime(_) => Some(TemporalKind::OffsetDateTime),
        Value::ZonedDateTime { .. } => Some(TemporalKind::ZonedDateTime),
        Value::LocalDate(_) => Some(TemporalKind::LocalDate),
        Value::LocalDateTime(_) => Some(TemporalKind::LocalDateTime),
        Value::LocalTime(_) => Some(TemporalKind::LocalTime),
        Value::OffsetTime { .. } => Some(TemporalKind::OffsetTime),
        Value::Year(_) => Some(TemporalKind::Year),
        Value::YearMonth { .. } => Some(TemporalKind::YearMonth),
        _ => None,
    }
}

fn naive_date_time(text: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .map_err(|e| e.to_string())
}

fn naive_time(text: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|e| e.to_string())
}

/// Split a trailing `Z` or `+HH:MM[:SS]` offset off `text`.
///
/// Only the part after `search_from` is searched, so date separators are
/// never mistaken for a negative offset.
fn split_offset(text: &str, search_from: usize) -> std::result::Result<(&str, i32), String> {
    if let Some(local) = text.strip_suffix('Z') {
        return Ok((local, 0));
    }
    let tail = text.get(search_from..).ok_or("missing time")?;
    let at = tail
        .rfind(['+', '-'])
        .map(|i| i + search_from)
        .ok_or("missing offset")?;
    let (local, offset) = text.split_at(at);
    Ok((local, parse_offset(offset)?))
}

fn parse_offset(text: &str) -> std::result::Result<i32, String> {
    let sign = if text.starts_with('-') { -1 } else { 1 };
    let parts: Vec<&str> = text[1..].split(':').collect();
    if !(2..=3).contains(&parts.len()) || parts.iter().any(|p| p.len() != 2) {
        return Err(format!("malformed offset '{text}'"));
    }
    let mut seconds = 0i32;
    for ((part, unit), max) in parts.iter().zip([3600, 60, 1]).zip([18, 59, 59]) {
        let n: i32 = part
            .parse()
            .map_err(|_| format!("malformed offset '{text}'"))?;
        if n > max {
            return Err(format!("offset '{text}' out of range"));
        }
        seconds += n * unit;
    }
    if seconds > 18 * 3600 {
        return Err(format!("offset '{text}' out of range"));
    }
    Ok(sign * seconds)
}

fn fixed_offset(seconds: i32) -> std::result::Result<FixedOffset, String> {
    FixedOffset::east_opt(seconds).ok_or_else(|| format!("offset {seconds}s out of range"))
}

fn parse_instant(text: &str) -> std::result::Result<Value, String> {
    let local = text
        .strip_suffix('Z')
        .ok_or("instant must be in UTC and end with 'Z'")?;
    Ok(Value::Instant(naive_date_time(local)?.and_utc()))
}

fn parse_offset_date_time(text: &str) -> std::result::Result<Value, String> {
    let time_start = text.find('T').ok_or("missing 'T' separator")?;
    let (local, seconds) = split_offset(text, time_start)?;
    let datetime = fixed_offset(seconds)?
        .from_local_datetime(&naive_date_time(local)?)
        .single()
        .ok_or("ambiguous local date-time")?;
    Ok(Value::OffsetDateTime(datetime))
}

fn parse_zoned_date_time(text: &str) -> std::result::Result<Value, String> {
    let (text, zone) = match text.strip_suffix(']') {
        Some(rest) => {
            let (datetime, zone) = rest.rsplit_once('[').ok_or("unbalanced zone brackets")?;
            let valid = !zone.is_empty()
                && zone
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "/_+-".contains(c));
            if !valid {
                return Err(format!("invalid zone id '{zone}'"));
            }
            (datetime, Some(zone.to_string()))
        }
        None => (text, None),
    };
    match parse_offset_date_time(text)? {
        Value::OffsetDateTime(datetime) => Ok(Value::ZonedDateTime { datetime, zone }),
        _ => Err("expected an offset date-time".to_string()),
    }
}

fn parse_local_date(text: &str) -> std::result::Result<Value, String> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(Value::LocalDate)
        .map_err(|e| e.to_string())
}

fn parse_local_date_time(text: &str) -> std::result::Result<Value, String> {
    naive_date_time(text).map(Value::LocalDateTime)
}

fn parse_local_time(text: &str) -> std::result::Result<Value, String> {
    naive_time(text).map(Value::LocalTime)
}

fn parse_offset_time(text: &str) -> std::result::Result<Value, String> {
    let (local, offset_seconds) = split_offset(text, 0)?;
    Ok(Value::OffsetTime {
        time: naive_time(local)?,
        offset_seconds,
    })
}

/// Four digits, or a sign followed by four to ten digits.
fn year_digits(text: &str) -> std::result::Result<i32, String> {
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'+') => (1, &text[1..]),
        Some(b'-') => (-1, &text[1..]),
        _ => (0, text),
    };
    if !digits.chars().all(|c| c.is_ascii_digit()) || !(4..=10).contains(&digits.len()) {
        return Err(format!("malformed year '{text}'"));
    }
    match (sign, digits.len()) {
        (0, 4) | (-1, _) => {}
        (1, n) if n > 4 => {}
        (0, _) => return Err(format!("year '{text}' needs a sign beyond four digits")),
        _ => return Err(format!("unexpected sign in year '{text}'")),
    }
    let year: i32 = digits
        .parse()
        .map_err(|_| format!("year '{text}' out of range"))?;
    Ok(if sign < 0 { -year } else { year })
}

fn parse_year(text: &str) -> std::result::Result<Value, String> {
    year_digits(text).map(Value::Year)
}

fn parse_year_month(text: &str) -> std::result::Result<Value, String> {
    let (year, month) = text.rsplit_once('-').ok_or("missing month")?;
    if month.len() != 2 {
        return Err(format!("malformed month '{month}'"));
    }
    let month: u32 = month
        .parse()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| format!("invalid month '{month}'"))?;
    Ok(Value::YearMonth {
        year: year_digits(year)?,
        month,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coercer() -> Coercer {
        Coercer::new(&PlannerConfig::default())
    }

    fn temporal(kind: TemporalKind) -> AttributeType {
        AttributeType::Temporal(kind)
    }

    fn genre() -> AttributeType {
        AttributeType::enum_type(
            "Genre",
            vec!["Fiction".into(), "Poetry".into(), "Drama".into()],
        )
    }

    #[test]
    fn test_null_and_matching_values_pass_through() {
        let c = coercer();
        assert_eq!(c.coerce(&Value::Null, &AttributeType::Int32).unwrap(), Value::Null);
        assert_eq!(
            c.coerce(&Value::Int64(7), &AttributeType::Int64).unwrap(),
            Value::Int64(7)
        );
        let year = Value::Year(2001);
        assert_eq!(c.coerce(&year, &temporal(TemporalKind::Year)).unwrap(), year);
    }

    #[test]
    fn test_temporal_round_trip() {
        let c = coercer();
        let samples = [
            (TemporalKind::Instant, "2007-12-03T10:15:30.250Z"),
            (TemporalKind::Instant, "2007-12-03T10:15:30Z"),
            (TemporalKind::OffsetDateTime, "2007-12-03T10:15:30+01:00"),
            (TemporalKind::OffsetDateTime, "2007-12-03T10:15:30-05:30"),
            (TemporalKind::ZonedDateTime, "2007-12-03T10:15:30+01:00[Europe/Paris]"),
            (TemporalKind::ZonedDateTime, "2007-12-03T10:15:30Z"),
            (TemporalKind::LocalDate, "2007-12-03"),
            (TemporalKind::LocalDateTime, "2007-12-03T10:15:30.123456"),
            (TemporalKind::LocalTime, "10:15:30"),
            (TemporalKind::OffsetTime, "10:15:30+01:00"),
            (TemporalKind::Year, "2001"),
            (TemporalKind::Year, "+12345"),
            (TemporalKind::Year, "-0044"),
            (TemporalKind::YearMonth, "2007-12"),
        ];
        for (kind, text) in samples {
            let value = c.coerce_str(text, &temporal(kind)).unwrap();
            assert_eq!(value.to_string(), text, "{kind:?}");
            assert_eq!(c.coerce_str(&value.to_string(), &temporal(kind)).unwrap(), value);
        }
    }

    #[test]
    fn test_optional_seconds() {
        let c = coercer();
        let value = c
            .coerce_str("2007-12-03T10:15", &temporal(TemporalKind::LocalDateTime))
            .unwrap();
        assert_eq!(value.to_string(), "2007-12-03T10:15:00");

        let value = c.coerce_str("10:15", &temporal(TemporalKind::LocalTime)).unwrap();
        assert_eq!(value, Value::LocalTime(NaiveTime::from_hms_opt(10, 15, 0).unwrap()));
    }

    #[test]
    fn test_temporal_rejections() {
        let c = coercer();
        let rejected = [
            (TemporalKind::Instant, "2007-12-03T10:15:30"),
            (TemporalKind::Instant, "2007-12-03T10:15:30+01:00"),
            (TemporalKind::OffsetDateTime, "2007-12-03T10:15:30"),
            (TemporalKind::OffsetDateTime, "Bad"),
            (TemporalKind::ZonedDateTime, "2007-12-03T10:15:30+01:00[]"),
            (TemporalKind::LocalDate, "2007-13-03"),
            (TemporalKind::LocalDate, "03/12/2007"),
            (TemporalKind::Year, "201"),
            (TemporalKind::Year, "20011"),
            (TemporalKind::Year, "+2001"),
            (TemporalKind::YearMonth, "2007-13"),
            (TemporalKind::YearMonth, "2007-1"),
            (TemporalKind::OffsetTime, "10:15:30+25:00"),
            (TemporalKind::OffsetTime, "10:15:30+01:75"),
            (TemporalKind::OffsetTime, "10:15:30+01:00:99"),
            (TemporalKind::OffsetDateTime, "2007-12-03T10:15:30+01:99"),
        ];
        for (kind, text) in rejected {
            let err = c.coerce_str(text, &temporal(kind)).unwrap_err();
            match err {
                Error::InvalidValue { value, target, .. } => {
                    assert_eq!(value, text);
                    assert_eq!(target, kind.name());
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn test_temporal_requires_text() {
        let err = coercer()
            .coerce(&Value::Int32(2001), &temporal(TemporalKind::LocalDate))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_enum_coercion() {
        let c = coercer();
        assert_eq!(c.coerce_str("Poetry", &genre()).unwrap(), Value::Enum("Poetry".into()));
        assert_eq!(c.coerce_str("poetry", &genre()).unwrap(), Value::Enum("Poetry".into()));
        assert_eq!(c.coerce_str("2", &genre()).unwrap(), Value::Enum("Drama".into()));
        assert_eq!(
            c.coerce(&Value::Int32(0), &genre()).unwrap(),
            Value::Enum("Fiction".into())
        );
        assert!(c.coerce_str("Opera", &genre()).is_err());
        assert!(c.coerce_str("3", &genre()).is_err());
    }

    #[test]
    fn test_strict_enum_coercion() {
        let c = Coercer::new(&PlannerConfig::strict());
        assert!(c.coerce_str("Poetry", &genre()).is_ok());
        assert!(c.coerce_str("poetry", &genre()).is_err());
        assert!(c.coerce_str("1", &genre()).is_err());
        assert!(c.coerce(&Value::Int64(1), &genre()).is_err());
    }

    #[test]
    fn test_scalar_coercion() {
        let c = coercer();
        assert_eq!(c.coerce_str(" 42 ", &AttributeType::Int32).unwrap(), Value::Int32(42));
        assert_eq!(
            c.coerce_str("9000000000", &AttributeType::Int64).unwrap(),
            Value::Int64(9_000_000_000)
        );
        assert!(c.coerce_str("9000000000", &AttributeType::Int32).is_err());
        assert!(c.coerce_str("4.5", &AttributeType::Int64).is_err());
        assert_eq!(
            c.coerce(&Value::Float64(3.0), &AttributeType::Int32).unwrap(),
            Value::Int32(3)
        );
        assert_eq!(
            c.coerce(&Value::Int32(5), &AttributeType::Float64).unwrap(),
            Value::Float64(5.0)
        );
        assert!(c.coerce(&Value::Float64(0.1), &AttributeType::Float32).is_err());
        assert_eq!(
            c.coerce(&Value::Float64(0.5), &AttributeType::Float32).unwrap(),
            Value::Float32(0.5)
        );
    }

    #[test]
    fn test_float_rejects_non_finite() {
        let c = coercer();
        assert!(c.coerce_str("1e40", &AttributeType::Float32).is_err());
        assert!(c.coerce_str("1e400", &AttributeType::Float64).is_err());
        for text in ["NaN", "inf", "-infinity"] {
            assert!(c.coerce_str(text, &AttributeType::Float32).is_err());
            assert!(c.coerce_str(text, &AttributeType::Float64).is_err());
        }
        assert_eq!(
            c.coerce_str("1e38", &AttributeType::Float32).unwrap(),
            Value::Float32(1e38)
        );
    }

    #[test]
    fn test_bool_coercion() {
        let c = coercer();
        for yes in ["true", "YES", "y", "on", "1"] {
            assert_eq!(c.coerce_str(yes, &AttributeType::Bool).unwrap(), Value::Bool(true));
        }
        for no in ["false", "No", "n", "off", "0"] {
            assert_eq!(c.coerce_str(no, &AttributeType::Bool).unwrap(), Value::Bool(false));
        }
        assert!(c.coerce_str("maybe", &AttributeType::Bool).is_err());
        assert!(c.coerce(&Value::Int32(2), &AttributeType::Bool).is_err());
    }

    #[test]
    fn test_string_and_uuid_coercion() {
        let c = coercer();
        assert_eq!(
            c.coerce(&Value::Int32(12), &AttributeType::String).unwrap(),
            Value::String("12".into())
        );
        assert!(c.coerce(&Value::List(vec![]), &AttributeType::String).is_err());

        let text = "123e4567-e89b-12d3-a456-426614174000";
        let value = c.coerce_str(text, &AttributeType::Uuid).unwrap();
        assert_eq!(value.to_string(), text);
        assert_eq!(
            c.coerce_str("123e4567e89b12d3a456426614174000", &AttributeType::Uuid)
                .unwrap(),
            value
        );
        assert!(c.coerce_str("123e4567", &AttributeType::Uuid).is_err());
        assert!(c
            .coerce_str("zzze4567-e89b-12d3-a456-426614174000", &AttributeType::Uuid)
            .is_err());
    }

    #[test]
    fn test_struct_coercion() {
        let c = coercer();
        let address = AttributeType::struct_type(
            "Address",
            [
                ("street".to_string(), AttributeType::String),
                ("zip".to_string(), AttributeType::Int32),
            ],
        );
        let mut raw = BTreeMap::new();
        raw.insert("zip".to_string(), Value::String("1012".into()));
        let coerced = c.coerce(&Value::Map(raw.clone()), &address).unwrap();
        assert_eq!(coerced.as_map().unwrap()["zip"], Value::Int32(1012));

        raw.insert("city".to_string(), Value::String("Amsterdam".into()));
        assert!(c.coerce(&Value::Map(raw), &address).is_err());
        assert!(c.coerce_str("Main street", &address).is_err());
    }
}
