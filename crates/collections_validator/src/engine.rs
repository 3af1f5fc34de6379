//! Rule application.
//!
//! Runs a compiled [`ValidationPlan`] against records, query filters, and
//! update documents. Application stops at the first failing rule and returns
//! a [`Violation`] naming the rule and the offending field.

use crate::{ValidationPlan, ValidationRule};
use collections_core::{CollectionError, Record, UpdateDocument, Value};
use thiserror::Error;
use tracing::debug;

/// A validation failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Violation {
    /// A single field failed a rule.
    #[error("field `{field}` failed `{rule}` validation: {reason}")]
    Field {
        rule: &'static str,
        field: String,
        reason: String,
    },
    /// The record as a whole failed a rule.
    #[error("record failed `{rule}` validation: {reason}")]
    Record { rule: &'static str, reason: String },
}

impl Violation {
    /// The name of the rule that failed.
    pub fn rule_name(&self) -> &'static str {
        match self {
            Violation::Field { rule, .. } | Violation::Record { rule, .. } => rule,
        }
    }

    /// The failing field, if the rule targeted one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Violation::Field { field, .. } => Some(field),
            Violation::Record { .. } => None,
        }
    }
}

impl From<Violation> for CollectionError {
    fn from(violation: Violation) -> Self {
        match violation {
            Violation::Field { rule, field, reason } => CollectionError::Validation {
                rule: rule.to_string(),
                field: Some(field),
                message: reason,
            },
            Violation::Record { rule, reason } => CollectionError::Validation {
                rule: rule.to_string(),
                field: None,
                message: reason,
            },
        }
    }
}

/// Applies a single rule to a record, mutating it when the rule does.
pub fn apply_rule(record: &mut Record, rule: &ValidationRule) -> Result<(), Violation> {
    let Some(field) = &rule.field else {
        // Whole-record rules never mutate.
        return match rule.check.test_record(record) {
            Ok(()) => Ok(()),
            Err(reason) => Err(Violation::Record {
                rule: rule.name,
                reason,
            }),
        };
    };

    let current = record.get(field);
    if current.is_none() && rule.skip_absent {
        return Ok(());
    }

    if rule.mutates() {
        match rule.check.apply(current) {
            Ok(next) => {
                record.insert(field.clone(), next);
                Ok(())
            }
            Err(reason) => Err(Violation::Field {
                rule: rule.name,
                field: field.clone(),
                reason,
            }),
        }
    } else {
        let null = Value::Null;
        let value = current.unwrap_or(&null);
        match rule.check.test(value) {
            Ok(()) => Ok(()),
            Err(reason) => Err(Violation::Field {
                rule: rule.name,
                field: field.clone(),
                reason,
            }),
        }
    }
}

/// Applies rules in order, stopping at the first failure.
pub fn apply_rules(record: &mut Record, rules: &[ValidationRule]) -> Result<(), Violation> {
    for rule in rules {
        if let Err(violation) = apply_rule(record, rule) {
            debug!(rule = violation.rule_name(), field = violation.field(), "validation failed");
            return Err(violation);
        }
    }
    Ok(())
}

/// Validates a record for insertion, filling defaults and normalizing
/// identifiers in place.
pub fn validate_insert(plan: &ValidationPlan, record: &mut Record) -> Result<(), Violation> {
    apply_rules(record, &plan.insert)
}

/// Validates a query filter, normalizing identifier values in place.
pub fn validate_query(plan: &ValidationPlan, filter: &mut Record) -> Result<(), Violation> {
    apply_rules(filter, &plan.query)
}

/// Validates an update document section by section.
pub fn validate_update(plan: &ValidationPlan, update: &mut UpdateDocument) -> Result<(), Violation> {
    apply_rules(&mut update.set, &plan.update_set_field)?;
    apply_rules(&mut update.unset, &plan.update_unset_field)?;
    apply_rules(&mut update.push, &plan.update_set_array)?;
    apply_rules(&mut update.pull, &plan.update_unset_array)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Check, FieldType, IdNormalizer, SchemaCompiler};
    use collections_core::{AttributeBuilder, CollectionConfigBuilder, record};
    use pretty_assertions::assert_eq;

    fn plan_for(config: &collections_core::CollectionConfig) -> ValidationPlan {
        SchemaCompiler::new(IdNormalizer::identity()).compile(config).plan
    }

    #[test]
    fn test_absent_payload_field_skipped() {
        let rule = ValidationRule::field("type", "name", Check::Type(FieldType::String));
        let mut doc = record([("other", Value::from(1))]);
        assert_eq!(apply_rule(&mut doc, &rule), Ok(()));
    }

    #[test]
    fn test_required_runs_on_absent_field() {
        let rule = ValidationRule::field("required", "name", Check::Required).always();
        let mut doc = Record::new();
        let violation = apply_rule(&mut doc, &rule).unwrap_err();
        assert_eq!(violation.rule_name(), "required");
        assert_eq!(violation.field(), Some("name"));
    }

    #[test]
    fn test_default_fills_absent_field() {
        let config = CollectionConfigBuilder::new("posts")
            .strict(false)
            .attribute(
                "status",
                AttributeBuilder::of_type("string").default_value("draft").build(),
            )
            .build();
        let mut doc = Record::new();
        validate_insert(&plan_for(&config), &mut doc).unwrap();
        assert_eq!(doc.get("status"), Some(&Value::from("draft")));
    }

    #[test]
    fn test_default_does_not_override_present_value() {
        let config = CollectionConfigBuilder::new("posts")
            .strict(false)
            .attribute(
                "status",
                AttributeBuilder::of_type("string").default_value("draft").build(),
            )
            .build();
        let mut doc = record([("status", Value::from("published"))]);
        validate_insert(&plan_for(&config), &mut doc).unwrap();
        assert_eq!(doc.get("status"), Some(&Value::from("published")));
    }

    #[test]
    fn test_insert_rejects_unknown_field_in_strict_mode() {
        let config = CollectionConfigBuilder::new("posts")
            .typed("title", "string")
            .build();
        let mut doc = record([("bogus", Value::from(1))]);
        let violation = validate_insert(&plan_for(&config), &mut doc).unwrap_err();
        assert_eq!(violation.rule_name(), "strict");
        assert_eq!(violation.field(), None);
    }

    #[test]
    fn test_insert_type_mismatch() {
        let config = CollectionConfigBuilder::new("posts")
            .typed("title", "string")
            .build();
        let mut doc = record([("title", Value::from(42))]);
        let violation = validate_insert(&plan_for(&config), &mut doc).unwrap_err();
        assert_eq!(violation.rule_name(), "type");
        assert_eq!(violation.field(), Some("title"));
    }

    #[test]
    fn test_update_rejects_non_writeable_field() {
        let config = CollectionConfigBuilder::new("posts")
            .attribute(
                "created_at",
                AttributeBuilder::of_type("datetime").writeable(false).build(),
            )
            .build();
        let mut update = UpdateDocument::default();
        update.set.insert("created_at".into(), Value::from("2024-01-01"));
        let violation = validate_update(&plan_for(&config), &mut update).unwrap_err();
        assert_eq!(violation.rule_name(), "reject");
    }

    #[test]
    fn test_update_push_validates_single_element() {
        let config = CollectionConfigBuilder::new("posts")
            .strict(false)
            .attribute(
                "scores",
                AttributeBuilder::of_type("array").element_type("integer").build(),
            )
            .build();
        let plan = plan_for(&config);

        let mut ok = UpdateDocument::default();
        ok.push.insert("scores".into(), Value::from(5));
        validate_update(&plan, &mut ok).unwrap();

        let mut bad = UpdateDocument::default();
        bad.push.insert("scores".into(), Value::from("five"));
        let violation = validate_update(&plan, &mut bad).unwrap_err();
        assert_eq!(violation.rule_name(), "element");
    }

    #[test]
    fn test_every_array_element_must_pass() {
        let config = CollectionConfigBuilder::new("posts")
            .strict(false)
            .attribute(
                "scores",
                AttributeBuilder::of_type("array").element_type("integer").build(),
            )
            .build();
        let mut doc = record([(
            "scores",
            Value::Array(vec![Value::from(1), Value::from("two"), Value::from(3)]),
        )]);
        let violation = validate_insert(&plan_for(&config), &mut doc).unwrap_err();
        assert_eq!(violation.rule_name(), "element");
    }

    #[test]
    fn test_query_normalizes_identifier() {
        let normalizer = IdNormalizer::new(|value| match value {
            Value::String(s) => Ok(Value::String(s.to_uppercase())),
            other => Ok(other.clone()),
        });
        let config = CollectionConfigBuilder::new("posts").build();
        let plan = SchemaCompiler::new(normalizer).compile(&config).plan;

        let mut filter = record([("id", Value::from("abc"))]);
        validate_query(&plan, &mut filter).unwrap();
        assert_eq!(filter.get("id"), Some(&Value::from("ABC")));
    }

    #[test]
    fn test_first_failure_wins() {
        let config = CollectionConfigBuilder::new("posts")
            .attribute("title", AttributeBuilder::of_type("string").required().build())
            .build();
        let mut doc = record([("bogus", Value::from(1))]);
        // Strict runs before required in insert order.
        let violation = validate_insert(&plan_for(&config), &mut doc).unwrap_err();
        assert_eq!(violation.rule_name(), "strict");
    }
}
