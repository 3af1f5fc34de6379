//! Atomic check vocabulary.
//!
//! Every compiled rule carries one `Check`: a tagged variant evaluated by a
//! single interpreter rather than a stored function pointer, so plans stay
//! inspectable and comparable. Predicate checks answer pass/fail; mutating
//! checks (identifier normalization, default fill) produce a replacement
//! value.

use chrono::NaiveDate;
use collections_core::{DefaultSpec, EmbeddedFields, Record, Value};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use validator::{ValidateEmail, ValidateUrl};

/// The fixed type vocabulary for attribute declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Decimal,
    Numeric,
    Boolean,
    Email,
    Url,
    Datetime,
    Array,
    Object,
    /// A *serialized* JSON string, not an object
    Json,
}

impl FieldType {
    /// Resolves a declared type name. Unknown names yield `None` so the
    /// compiler can degrade with a diagnostic.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "decimal" => Some(Self::Decimal),
            "numeric" => Some(Self::Numeric),
            "boolean" => Some(Self::Boolean),
            "email" => Some(Self::Email),
            "url" => Some(Self::Url),
            "datetime" => Some(Self::Datetime),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// The canonical name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Email => "email",
            Self::Url => "url",
            Self::Datetime => "datetime",
            Self::Array => "array",
            Self::Object => "object",
            Self::Json => "json",
        }
    }

    /// Tests a value against this type.
    pub fn test(&self, value: &Value) -> bool {
        match self {
            Self::String => matches!(value, Value::String(_)),
            Self::Integer => match value {
                Value::Int(_) => true,
                Value::String(s) => s.parse::<i64>().is_ok(),
                _ => false,
            },
            Self::Decimal => match value {
                Value::Int(_) | Value::Float(_) => true,
                Value::String(s) => s.parse::<f64>().is_ok(),
                _ => false,
            },
            Self::Numeric => match value {
                Value::Int(_) => true,
                Value::String(s) => {
                    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
                    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
                }
                _ => false,
            },
            Self::Boolean => matches!(value, Value::Bool(_)),
            Self::Email => value.as_str().is_some_and(|s| s.validate_email()),
            Self::Url => value.as_str().is_some_and(|s| s.validate_url()),
            Self::Datetime => value.as_str().is_some_and(|s| parse_datetime(s).is_some()),
            Self::Array => matches!(value, Value::Array(_)),
            Self::Object => matches!(value, Value::Object(_)),
            Self::Json => value
                .as_str()
                .is_some_and(|s| serde_json::from_str::<serde_json::Value>(s).is_ok()),
        }
    }
}

/// The collection's identifier-normalization function.
///
/// Wrapped in a value object so rules stay `Clone` and comparable (by
/// identity) while the function itself remains opaque.
#[derive(Clone)]
pub struct IdNormalizer(Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>);

impl IdNormalizer {
    /// Wraps a normalization function.
    pub fn new<F>(normalize: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self(Arc::new(normalize))
    }

    /// A normalizer that passes identifiers through unchanged.
    pub fn identity() -> Self {
        Self::new(|value| Ok(value.clone()))
    }

    /// Applies the normalization function.
    pub fn apply(&self, value: &Value) -> Result<Value, String> {
        (self.0)(value)
    }
}

impl fmt::Debug for IdNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdNormalizer(..)")
    }
}

impl PartialEq for IdNormalizer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// One atomic predicate or transform.
#[derive(Debug, Clone)]
pub enum Check {
    /// Value must match the type
    Type(FieldType),
    /// Normalize the identifier in place (mutates)
    IdTransform(IdNormalizer),
    /// Absent, null, and empty-string values fail
    Required,
    /// Any present value fails
    Reject,
    /// Null and empty-string values fail
    NotNull,
    /// Fill the field when absent (mutates)
    DefaultFill(DefaultSpec),
    /// Minimum string length
    MinLength(u64),
    /// Maximum string length
    MaxLength(u64),
    /// String must contain the substring
    Contains(String),
    /// String must not contain the substring
    NotContains(String),
    /// Value must be a member of the set
    OneOf(Vec<Value>),
    /// Value must not be a member of the set
    NotOneOf(Vec<Value>),
    /// Numeric lower bound; non-numeric values pass
    Min(f64),
    /// Numeric upper bound; non-numeric values pass
    Max(f64),
    /// String must match the pattern
    Pattern(Regex),
    /// String must not match the pattern
    NotPattern(Regex),
    /// Datetime must be after the bound
    After(String),
    /// Datetime must be before the bound
    Before(String),
    /// Value must be an array whose every element passes the inner check
    Each(Box<Check>),
    /// Whole-payload unknown-field rejection
    Strict {
        fields: Vec<String>,
        embedded: BTreeMap<String, EmbeddedFields>,
    },
}

impl Check {
    /// True for checks that replace the field value instead of judging it.
    pub fn mutates(&self) -> bool {
        matches!(self, Check::IdTransform(_) | Check::DefaultFill(_))
    }

    /// Evaluates a predicate check against a single value.
    ///
    /// Absent fields that reach a predicate (a rule with skip-on-absent
    /// disabled) are passed in as `Value::Null`.
    pub fn test(&self, value: &Value) -> Result<(), String> {
        let passed = match self {
            Check::Type(field_type) => field_type.test(value),
            Check::Required => !matches!(value, Value::Null) && !is_empty_string(value),
            Check::Reject => false,
            Check::NotNull => !matches!(value, Value::Null) && !is_empty_string(value),
            Check::MinLength(min) => value
                .as_str()
                .is_some_and(|s| s.chars().count() as u64 >= *min),
            Check::MaxLength(max) => value
                .as_str()
                .is_some_and(|s| s.chars().count() as u64 <= *max),
            Check::Contains(needle) => value.as_str().is_some_and(|s| s.contains(needle)),
            Check::NotContains(needle) => value.as_str().is_some_and(|s| !s.contains(needle)),
            Check::OneOf(allowed) => is_member(value, allowed),
            Check::NotOneOf(excluded) => !is_member(value, excluded),
            Check::Min(min) => numeric_of(value).is_none_or(|n| n >= *min),
            Check::Max(max) => numeric_of(value).is_none_or(|n| n <= *max),
            Check::Pattern(regex) => value.as_str().is_some_and(|s| regex.is_match(s)),
            Check::NotPattern(regex) => value.as_str().is_some_and(|s| !regex.is_match(s)),
            Check::After(bound) => ordered_after(value, bound),
            Check::Before(bound) => ordered_before(value, bound),
            Check::Each(inner) => match value.as_array() {
                Some(items) => {
                    for (index, item) in items.iter().enumerate() {
                        if let Err(reason) = inner.test(item) {
                            return Err(format!("element {index}: {reason}"));
                        }
                    }
                    true
                }
                None => false,
            },
            Check::IdTransform(_) | Check::DefaultFill(_) => true,
            Check::Strict { .. } => true,
        };
        if passed {
            Ok(())
        } else {
            Err(self.expectation(value))
        }
    }

    /// Describes what the check expected, for failure messages.
    fn expectation(&self, value: &Value) -> String {
        match self {
            Check::Type(field_type) => {
                format!("expected {}, got {}", field_type.name(), value.type_name())
            }
            Check::Required => "value is required".to_string(),
            Check::Reject => "field is not allowed here".to_string(),
            Check::NotNull => "value must not be null or empty".to_string(),
            Check::MinLength(min) => format!("expected at least {min} characters"),
            Check::MaxLength(max) => format!("expected at most {max} characters"),
            Check::Contains(needle) => format!("expected substring `{needle}`"),
            Check::NotContains(needle) => format!("substring `{needle}` is not allowed"),
            Check::OneOf(_) => format!("`{}` is not an allowed value", value.render()),
            Check::NotOneOf(_) => format!("`{}` is an excluded value", value.render()),
            Check::Min(min) => format!("expected a value of at least {min}"),
            Check::Max(max) => format!("expected a value of at most {max}"),
            Check::Pattern(regex) => format!("expected a match for `{}`", regex.as_str()),
            Check::NotPattern(regex) => format!("matches forbidden pattern `{}`", regex.as_str()),
            Check::After(bound) => format!("expected a datetime after {bound}"),
            Check::Before(bound) => format!("expected a datetime before {bound}"),
            Check::Each(_) => format!("expected an array, got {}", value.type_name()),
            Check::IdTransform(_) | Check::DefaultFill(_) | Check::Strict { .. } => {
                "check failed".to_string()
            }
        }
    }

    /// Evaluates a mutating check, producing the replacement value.
    pub fn apply(&self, current: Option<&Value>) -> Result<Value, String> {
        match self {
            Check::IdTransform(normalizer) => match current {
                Some(value) => normalizer.apply(value),
                None => Ok(Value::Null),
            },
            Check::DefaultFill(default) => match current {
                Some(value) => Ok(value.clone()),
                None => Ok(default.produce()),
            },
            other => Err(format!("check {other:?} does not mutate")),
        }
    }

    /// Evaluates a whole-payload check.
    pub fn test_record(&self, payload: &Record) -> Result<(), String> {
        match self {
            Check::Strict { fields, embedded } => {
                for key in payload.keys() {
                    if !strict_allows(key, fields, embedded) {
                        return Err(format!("unknown field `{key}`"));
                    }
                }
                Ok(())
            }
            // Other checks bound to the whole payload see no single value
            other => other.test(&Value::Null),
        }
    }
}

impl PartialEq for Check {
    fn eq(&self, other: &Self) -> bool {
        use Check::*;
        match (self, other) {
            (Type(a), Type(b)) => a == b,
            (IdTransform(a), IdTransform(b)) => a == b,
            (Required, Required) | (Reject, Reject) | (NotNull, NotNull) => true,
            (DefaultFill(a), DefaultFill(b)) => a == b,
            (MinLength(a), MinLength(b)) | (MaxLength(a), MaxLength(b)) => a == b,
            (Contains(a), Contains(b)) | (NotContains(a), NotContains(b)) => a == b,
            (OneOf(a), OneOf(b)) | (NotOneOf(a), NotOneOf(b)) => a == b,
            (Min(a), Min(b)) | (Max(a), Max(b)) => a == b,
            (Pattern(a), Pattern(b)) | (NotPattern(a), NotPattern(b)) => {
                a.as_str() == b.as_str()
            }
            (After(a), After(b)) | (Before(a), Before(b)) => a == b,
            (Each(a), Each(b)) => a == b,
            (
                Strict {
                    fields: fa,
                    embedded: ea,
                },
                Strict {
                    fields: fb,
                    embedded: eb,
                },
            ) => fa == fb && ea == eb,
            _ => false,
        }
    }
}

/// Dotted-path aware unknown-field check.
///
/// A bare key must be declared. A dotted key needs a declared head segment;
/// when the head carries an embedded-object declaration, the second segment
/// is checked against it.
fn strict_allows(
    key: &str,
    fields: &[String],
    embedded: &BTreeMap<String, EmbeddedFields>,
) -> bool {
    match key.split_once('.') {
        Some((head, rest)) => {
            if !fields.iter().any(|f| f == head) {
                return false;
            }
            match embedded.get(head) {
                Some(declaration) => {
                    let sub_field = rest.split('.').next().unwrap_or(rest);
                    declaration.allows(sub_field)
                }
                None => true,
            }
        }
        None => fields.iter().any(|f| f == key),
    }
}

fn is_empty_string(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}

/// Membership with string coercion, so `3` matches a configured `"3"`.
fn is_member(value: &Value, set: &[Value]) -> bool {
    let rendered = value.render();
    set.iter().any(|member| member == value || member.render() == rendered)
}

/// Numeric view of a value; `None` means the bound does not apply.
fn numeric_of(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

fn ordered_after(value: &Value, bound: &str) -> bool {
    match (value.as_str().and_then(parse_datetime), parse_datetime(bound)) {
        (Some(value), Some(bound)) => value > bound,
        _ => false,
    }
}

fn ordered_before(value: &Value, bound: &str) -> bool {
    match (value.as_str().and_then(parse_datetime), parse_datetime(bound)) {
        (Some(value), Some(bound)) => value < bound,
        _ => false,
    }
}

/// Parses a datetime literal: RFC 3339 first, then common date-only and
/// space-separated forms.
pub fn parse_datetime(input: &str) -> Option<chrono::NaiveDateTime> {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(input) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed);
    }
    if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Some(parsed);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
