//! Compiled validation artifacts.
//!
//! The schema compiler turns a `CollectionConfig` into these immutable
//! structures once per collection instance; the validation engine and the
//! operation pipeline only ever read them.

use crate::Check;
use std::collections::BTreeMap;

/// One compiled validation step.
///
/// A rule binds a check to zero or one field. Field-less rules operate on
/// the whole payload. When `skip_absent` is set (the default), an absent
/// field value passes without evaluating the check; required and
/// default-fill rules disable it because absence is exactly their case.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRule {
    /// Diagnostic name surfaced on failure
    pub name: &'static str,
    /// Field the rule is bound to; `None` for whole-payload rules
    pub field: Option<String>,
    /// The check to evaluate
    pub check: Check,
    /// Pass silently when the field is absent
    pub skip_absent: bool,
}

impl ValidationRule {
    /// Creates a field-bound rule with default skip-on-absent behavior.
    pub fn field(name: &'static str, field: impl Into<String>, check: Check) -> Self {
        Self {
            name,
            field: Some(field.into()),
            check,
            skip_absent: true,
        }
    }

    /// Creates a whole-payload rule.
    pub fn payload(name: &'static str, check: Check) -> Self {
        Self {
            name,
            field: None,
            check,
            skip_absent: true,
        }
    }

    /// Disables skip-on-absent, making absence reach the check.
    pub fn always(mut self) -> Self {
        self.skip_absent = false;
        self
    }

    /// True when the rule replaces the field value.
    pub fn mutates(&self) -> bool {
        self.check.mutates()
    }
}

/// Ordered rule lists, one per operation surface.
///
/// Built once when a collection is instantiated from its configuration and
/// immutable thereafter. Order matters: rules run in list order and the
/// first failure aborts the list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationPlan {
    /// Rules applied to insert payloads
    pub insert: Vec<ValidationRule>,
    /// Rules applied to query documents
    pub query: Vec<ValidationRule>,
    /// Rules applied to `$set` sections
    pub update_set_field: Vec<ValidationRule>,
    /// Rules applied to `$unset` sections
    pub update_unset_field: Vec<ValidationRule>,
    /// Rules applied to `$push` sections (single appended element)
    pub update_set_array: Vec<ValidationRule>,
    /// Rules applied to `$pull` sections
    pub update_unset_array: Vec<ValidationRule>,
}

impl ValidationPlan {
    /// Total number of compiled rules across all surfaces.
    pub fn len(&self) -> usize {
        self.insert.len()
            + self.query.len()
            + self.update_set_field.len()
            + self.update_unset_field.len()
            + self.update_set_array.len()
            + self.update_unset_array.len()
    }

    /// True when no rules were compiled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Relation metadata derived from an attribute carrying an `entity` key.
///
/// Consumed by relation-resolution collaborators outside this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationDescriptor {
    /// Field holding the related identifier(s)
    pub field: String,
    /// Name of the related entity
    pub target_entity: String,
    /// Foreign key on the related entity
    pub foreign_key: Option<String>,
    /// Whether the relation must be present on insert
    pub required: bool,
    /// Role name; defaults to `<target_entity>_collection`
    pub role: String,
    /// Whether reads expand the relation
    pub visible: Option<bool>,
    /// Whether the field is an array of related entities
    pub is_array: bool,
    /// Whether the value transfers to the related entity
    pub transfer: Option<bool>,
}

/// Exclusion map for read results: field name to `0` for every field
/// declared `readable: false`.
pub type ProjectionMap = BTreeMap<String, u8>;

/// Everything the compiler derives from one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    /// Per-operation rule lists
    pub plan: ValidationPlan,
    /// Relation descriptors in declaration order
    pub relations: Vec<RelationDescriptor>,
    /// Read-projection exclusions
    pub projection: ProjectionMap,
    /// Event channel name templates, ordered
    pub event_channels: Vec<String>,
}
