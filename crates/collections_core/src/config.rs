//! Declarative collection configuration.
//!
//! This module contains the types describing a collection schema: the
//! attribute map, per-field constraints, relation metadata, and visibility
//! flags. A `CollectionConfig` is the read-only input the schema compiler
//! consumes once at collection construction.

use crate::Value;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Configuration for a single collection.
///
/// # Example
///
/// ```rust
/// use collections_core::CollectionConfig;
///
/// let config: CollectionConfig = serde_json::from_str(
///     r#"{
///         "name": "users",
///         "attributes": {
///             "email": {"type": "email", "required": true},
///             "name": "string"
///         }
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(config.name, "users");
/// assert!(config.strict);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Unique collection name, used for event channels
    pub name: String,

    /// Field name to attribute specification
    ///
    /// An ordered map so that compilation walks fields deterministically.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeSpec>,

    /// Reject payload fields absent from the declared attributes
    #[serde(default = "default_true")]
    pub strict: bool,

    /// Extra event channel names, a single name or a list
    #[serde(
        default,
        alias = "eventNames",
        deserialize_with = "string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub event_names: Vec<String>,

    /// Identifier field of this collection
    #[serde(default = "default_id_field", alias = "idField")]
    pub id_field: String,

    /// Identifier field name used by the storage backend, when it differs
    #[serde(default, alias = "storageDefaultIdField", skip_serializing_if = "Option::is_none")]
    pub storage_default_id_field: Option<String>,
}

impl CollectionConfig {
    /// Identifier field the storage backend uses, defaulting to `id`.
    pub fn storage_id_field(&self) -> &str {
        self.storage_default_id_field.as_deref().unwrap_or("id")
    }
}

fn default_true() -> bool {
    true
}

fn default_id_field() -> String {
    "id".to_string()
}

fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrSeq {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<StringOrSeq>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrSeq::One(name)) => vec![name],
        Some(StringOrSeq::Many(names)) => names,
    })
}

/// One field's schema entry.
///
/// Either a bare type name (`"string"`, `"email"`, the `"id"` sentinel) or a
/// structured descriptor carrying constraints and relation metadata. Exactly
/// one of the two forms is used per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeSpec {
    /// Bare type-name shorthand
    Type(String),
    /// Structured descriptor
    Descriptor(Box<AttributeDescriptor>),
}

impl AttributeSpec {
    /// Returns the descriptor form, if this is one.
    pub fn as_descriptor(&self) -> Option<&AttributeDescriptor> {
        match self {
            AttributeSpec::Descriptor(d) => Some(d),
            AttributeSpec::Type(_) => None,
        }
    }
}

/// Structured attribute descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeDescriptor {
    /// Field type name; absent or unknown types degrade to `string`
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub attr_type: Option<String>,

    /// Absence of the field rejects an insert
    pub required: bool,

    /// Whether reads may return (and queries may filter by) this field
    pub readable: bool,

    /// Whether updates may touch this field
    pub writeable: bool,

    /// Default value filled in on insert when the field is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultSpec>,

    /// Target entity of a relation field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    /// Foreign key of a relation field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign: Option<String>,

    /// Role name disambiguating multiple relations to the same entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Whether the relation is expanded on reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,

    /// Whether the relation value is transferred to the related entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer: Option<bool>,

    /// Element specification for array-typed fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementSpec>,

    /// Embedded-object field declaration for object-typed fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<EmbeddedFields>,

    /// Flag and helper constraints
    #[serde(flatten)]
    pub constraints: ConstraintSet,
}

impl Default for AttributeDescriptor {
    fn default() -> Self {
        Self {
            attr_type: None,
            required: false,
            readable: true,
            writeable: true,
            default: None,
            entity: None,
            foreign: None,
            role: None,
            visible: None,
            transfer: None,
            element: None,
            fields: None,
            constraints: ConstraintSet::default(),
        }
    }
}

/// Helper and flag constraints configurable on a field or array element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintSet {
    /// Value must not be null or an empty string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_null: Option<bool>,

    /// Minimum string length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    /// Maximum string length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    /// String must contain the substring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,

    /// String must not contain the substring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_contains: Option<String>,

    /// Value must be a member of the set
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,

    /// Value must not be a member of the set
    #[serde(rename = "not_in", skip_serializing_if = "Option::is_none")]
    pub not_one_of: Option<Vec<Value>>,

    /// Numeric lower bound (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Numeric upper bound (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// String must match the pattern
    #[serde(rename = "regex", skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// String must not match the pattern
    #[serde(rename = "not_regex", skip_serializing_if = "Option::is_none")]
    pub not_pattern: Option<String>,

    /// Datetime must be after the bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    /// Datetime must be before the bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
}

impl ConstraintSet {
    /// True when no constraint is configured.
    pub fn is_empty(&self) -> bool {
        self == &ConstraintSet::default()
    }
}

/// Element specification for array-typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementSpec {
    /// Bare element type name
    Type(String),
    /// Element descriptor with its own constraints
    Descriptor(ElementDescriptor),
}

/// Nested element descriptor carrying per-element constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementDescriptor {
    /// Element type name
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,

    /// Per-element helper constraints
    #[serde(flatten)]
    pub constraints: ConstraintSet,
}

/// Embedded-object field declaration, used by the strict-mode check for
/// dotted paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddedFields {
    /// `false` forbids all dotted access; `true` admits any sub-field
    Toggle(bool),
    /// Explicit allow-list of sub-field names
    Allowed(Vec<String>),
}

impl EmbeddedFields {
    /// Whether the given sub-field may appear in a payload.
    pub fn allows(&self, sub_field: &str) -> bool {
        match self {
            EmbeddedFields::Toggle(open) => *open,
            EmbeddedFields::Allowed(list) => list.iter().any(|f| f == sub_field),
        }
    }
}

/// Default value for a field: a literal, or a zero-argument generator
/// invoked fresh on every insert.
///
/// Generators cannot be expressed in configuration files; they are attached
/// through the builder API.
#[derive(Clone)]
pub enum DefaultSpec {
    /// Literal default, cloned into the record
    Literal(Value),
    /// Generator invoked per insert
    Generator(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultSpec {
    /// Wraps a closure as a generated default.
    pub fn generator<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        DefaultSpec::Generator(Arc::new(f))
    }

    /// Produces the default value for one insert.
    pub fn produce(&self) -> Value {
        match self {
            DefaultSpec::Literal(value) => value.clone(),
            DefaultSpec::Generator(generate) => generate(),
        }
    }
}

impl fmt::Debug for DefaultSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultSpec::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            DefaultSpec::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

impl PartialEq for DefaultSpec {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DefaultSpec::Literal(a), DefaultSpec::Literal(b)) => a == b,
            (DefaultSpec::Generator(a), DefaultSpec::Generator(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Serialize for DefaultSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DefaultSpec::Literal(value) => value.serialize(serializer),
            DefaultSpec::Generator(_) => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for DefaultSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(DefaultSpec::Literal)
    }
}
