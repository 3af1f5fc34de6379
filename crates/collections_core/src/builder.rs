//! Builder pattern for creating collection configurations.
//!
//! This module provides ergonomic builders for constructing configurations
//! and their attribute descriptors with a fluent API.

use crate::{
    AttributeDescriptor, AttributeSpec, CollectionConfig, DefaultSpec, ElementSpec, EmbeddedFields,
    Value,
};
use std::collections::BTreeMap;

/// Builder for creating a `CollectionConfig`.
///
/// # Example
///
/// ```rust
/// use collections_core::{AttributeBuilder, CollectionConfigBuilder};
///
/// let config = CollectionConfigBuilder::new("users")
///     .attribute("name", AttributeBuilder::of_type("string").required().build())
///     .typed("email", "email")
///     .event_name("users:changed")
///     .build();
/// assert_eq!(config.attributes.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct CollectionConfigBuilder {
    name: Option<String>,
    attributes: BTreeMap<String, AttributeSpec>,
    strict: bool,
    event_names: Vec<String>,
    id_field: Option<String>,
    storage_default_id_field: Option<String>,
}

impl CollectionConfigBuilder {
    /// Creates a new builder for the named collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            strict: true,
            ..Default::default()
        }
    }

    /// Enables or disables strict unknown-field rejection.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Adds an extra event channel name.
    pub fn event_name(mut self, name: impl Into<String>) -> Self {
        self.event_names.push(name.into());
        self
    }

    /// Sets the collection identifier field.
    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }

    /// Sets the storage backend's identifier field name.
    pub fn storage_default_id_field(mut self, field: impl Into<String>) -> Self {
        self.storage_default_id_field = Some(field.into());
        self
    }

    /// Adds an attribute.
    pub fn attribute(mut self, field: impl Into<String>, spec: AttributeSpec) -> Self {
        self.attributes.insert(field.into(), spec);
        self
    }

    /// Adds a bare-type attribute.
    pub fn typed(self, field: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.attribute(field, AttributeSpec::Type(type_name.into()))
    }

    /// Builds the configuration.
    ///
    /// # Panics
    ///
    /// Panics if the collection name is not set.
    pub fn build(self) -> CollectionConfig {
        CollectionConfig {
            name: self.name.expect("name is required"),
            attributes: self.attributes,
            strict: self.strict,
            event_names: self.event_names,
            id_field: self.id_field.unwrap_or_else(|| "id".to_string()),
            storage_default_id_field: self.storage_default_id_field,
        }
    }
}

/// Builder for creating an `AttributeSpec` descriptor.
#[derive(Debug, Default)]
pub struct AttributeBuilder {
    descriptor: AttributeDescriptor,
}

impl AttributeBuilder {
    /// Creates a builder with no type set (degrades to `string`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for the given type name.
    pub fn of_type(type_name: impl Into<String>) -> Self {
        let mut builder = Self::default();
        builder.descriptor.attr_type = Some(type_name.into());
        builder
    }

    /// Marks the field required on insert.
    pub fn required(mut self) -> Self {
        self.descriptor.required = true;
        self
    }

    /// Sets readability.
    pub fn readable(mut self, readable: bool) -> Self {
        self.descriptor.readable = readable;
        self
    }

    /// Sets writeability.
    pub fn writeable(mut self, writeable: bool) -> Self {
        self.descriptor.writeable = writeable;
        self
    }

    /// Sets a literal default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.descriptor.default = Some(DefaultSpec::Literal(value.into()));
        self
    }

    /// Sets a generated default, invoked fresh per insert.
    pub fn default_generator<F>(mut self, generate: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.descriptor.default = Some(DefaultSpec::generator(generate));
        self
    }

    /// Declares a relation to the target entity.
    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.descriptor.entity = Some(entity.into());
        self
    }

    /// Sets the relation foreign key.
    pub fn foreign(mut self, foreign: impl Into<String>) -> Self {
        self.descriptor.foreign = Some(foreign.into());
        self
    }

    /// Sets the relation role name.
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.descriptor.role = Some(role.into());
        self
    }

    /// Sets relation visibility.
    pub fn visible(mut self, visible: bool) -> Self {
        self.descriptor.visible = Some(visible);
        self
    }

    /// Sets relation transfer behavior.
    pub fn transfer(mut self, transfer: bool) -> Self {
        self.descriptor.transfer = Some(transfer);
        self
    }

    /// Sets the array element specification.
    pub fn element(mut self, element: ElementSpec) -> Self {
        self.descriptor.element = Some(element);
        self
    }

    /// Sets the element type by name.
    pub fn element_type(mut self, type_name: impl Into<String>) -> Self {
        self.descriptor.element = Some(ElementSpec::Type(type_name.into()));
        self
    }

    /// Declares the embedded-object sub-fields.
    pub fn fields(mut self, fields: EmbeddedFields) -> Self {
        self.descriptor.fields = Some(fields);
        self
    }

    /// Forbids null and empty-string values.
    pub fn not_null(mut self) -> Self {
        self.descriptor.constraints.not_null = Some(true);
        self
    }

    /// Sets the minimum string length.
    pub fn min_length(mut self, min: u64) -> Self {
        self.descriptor.constraints.min_length = Some(min);
        self
    }

    /// Sets the maximum string length.
    pub fn max_length(mut self, max: u64) -> Self {
        self.descriptor.constraints.max_length = Some(max);
        self
    }

    /// Requires the substring to be present.
    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.descriptor.constraints.contains = Some(needle.into());
        self
    }

    /// Requires the substring to be absent.
    pub fn not_contains(mut self, needle: impl Into<String>) -> Self {
        self.descriptor.constraints.not_contains = Some(needle.into());
        self
    }

    /// Restricts the value to the given set.
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.descriptor.constraints.one_of = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Excludes the given set of values.
    pub fn not_one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.descriptor.constraints.not_one_of = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the numeric lower bound.
    pub fn min(mut self, min: f64) -> Self {
        self.descriptor.constraints.min = Some(min);
        self
    }

    /// Sets the numeric upper bound.
    pub fn max(mut self, max: f64) -> Self {
        self.descriptor.constraints.max = Some(max);
        self
    }

    /// Requires the value to match the pattern.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.descriptor.constraints.pattern = Some(pattern.into());
        self
    }

    /// Requires the value not to match the pattern.
    pub fn not_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.descriptor.constraints.not_pattern = Some(pattern.into());
        self
    }

    /// Requires the datetime to be after the bound.
    pub fn after(mut self, bound: impl Into<String>) -> Self {
        self.descriptor.constraints.after = Some(bound.into());
        self
    }

    /// Requires the datetime to be before the bound.
    pub fn before(mut self, bound: impl Into<String>) -> Self {
        self.descriptor.constraints.before = Some(bound.into());
        self
    }

    /// Builds the attribute specification.
    pub fn build(self) -> AttributeSpec {
        AttributeSpec::Descriptor(Box::new(self.descriptor))
    }
}
