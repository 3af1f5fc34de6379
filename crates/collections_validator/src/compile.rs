//! Schema compiler.
//!
//! Turns a declarative `CollectionConfig` into the compiled artifacts: the
//! per-operation rule lists, relation descriptors, the read projection, and
//! the event channel templates. Compilation is a single deterministic pass
//! over the attributes and never fails: unresolvable type names degrade to
//! the string check with a logged diagnostic, so a schema typo cannot crash
//! an application at startup.

use crate::{
    Check, CompiledSchema, FieldType, IdNormalizer, ProjectionMap, RelationDescriptor,
    ValidationPlan, ValidationRule,
};
use collections_core::{
    AttributeDescriptor, AttributeSpec, CollectionConfig, ConstraintSet, ElementSpec,
    EmbeddedFields,
};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::warn;

/// Sentinel type name resolving to the identifier transform.
const ID_TYPE: &str = "id";

/// Compiles collection configurations into validation plans.
pub struct SchemaCompiler {
    normalizer: IdNormalizer,
}

impl SchemaCompiler {
    /// Creates a compiler using the given identifier normalizer.
    pub fn new(normalizer: IdNormalizer) -> Self {
        Self { normalizer }
    }

    /// Compiles a configuration.
    pub fn compile(&self, config: &CollectionConfig) -> CompiledSchema {
        let mut plan = ValidationPlan::default();
        let mut relations = Vec::new();
        let mut projection = ProjectionMap::new();
        let mut embedded = BTreeMap::new();

        // The identifier is normalized on every surface that can carry it.
        let id_rule = self.transform_rule(&config.id_field);
        plan.insert.push(id_rule.clone());
        plan.update_set_field.push(id_rule.clone());
        plan.query.push(id_rule);

        for (field, spec) in &config.attributes {
            match spec {
                AttributeSpec::Type(type_name) => {
                    self.compile_bare(config, field, type_name, &mut plan);
                }
                AttributeSpec::Descriptor(descriptor) => {
                    self.compile_descriptor(
                        config,
                        field,
                        descriptor,
                        &mut plan,
                        &mut relations,
                        &mut projection,
                        &mut embedded,
                    );
                }
            }
        }

        if config.strict {
            let strict = ValidationRule::payload(
                "strict",
                Check::Strict {
                    fields: config.attributes.keys().cloned().collect(),
                    embedded,
                },
            );
            plan.insert.insert(0, strict.clone());
            plan.update_set_field.push(strict.clone());
            plan.update_set_array.push(strict);
        }

        CompiledSchema {
            plan,
            relations,
            projection,
            event_channels: event_channels(config),
        }
    }

    fn transform_rule(&self, field: &str) -> ValidationRule {
        ValidationRule::field("transform", field, Check::IdTransform(self.normalizer.clone()))
    }

    /// Bare-string attribute: a single type check on insert and update-set.
    fn compile_bare(
        &self,
        config: &CollectionConfig,
        field: &str,
        type_name: &str,
        plan: &mut ValidationPlan,
    ) {
        let rule = if type_name == ID_TYPE {
            self.transform_rule(field)
        } else {
            let field_type = resolve_type(config, field, Some(type_name));
            ValidationRule::field("type", field, Check::Type(field_type))
        };
        plan.insert.push(rule.clone());
        plan.update_set_field.push(rule);
    }

    #[allow(clippy::too_many_arguments)]
    fn compile_descriptor(
        &self,
        config: &CollectionConfig,
        field: &str,
        descriptor: &AttributeDescriptor,
        plan: &mut ValidationPlan,
        relations: &mut Vec<RelationDescriptor>,
        projection: &mut ProjectionMap,
        embedded: &mut BTreeMap<String, EmbeddedFields>,
    ) {
        let declared_type = descriptor.attr_type.as_deref();

        if descriptor.required {
            plan.insert
                .push(ValidationRule::field("required", field, Check::Required).always());
        }

        // Relation fields carry no type check of their own.
        if declared_type != Some("relation") {
            let rule = if declared_type == Some(ID_TYPE) {
                self.transform_rule(field)
            } else {
                let field_type = resolve_type(config, field, declared_type);
                ValidationRule::field("type", field, Check::Type(field_type))
            };
            plan.insert.push(rule.clone());
            plan.update_set_field.push(rule.clone());

            // Arrays of related entities hold foreign identifiers, so a
            // query filter on them is not an array literal.
            let related_array = declared_type == Some("array") && descriptor.entity.is_some();
            if !related_array {
                plan.query.push(rule);
            }
        }

        if !descriptor.readable {
            projection.insert(field.to_string(), 0);
            plan.query
                .push(ValidationRule::field("reject", field, Check::Reject));
        }

        if !descriptor.writeable {
            let reject = ValidationRule::field("reject", field, Check::Reject);
            plan.update_set_field.push(reject.clone());
            plan.update_unset_field.push(reject.clone());
            plan.update_set_array.push(reject.clone());
            plan.update_unset_array.push(reject);
        }

        if declared_type == Some("array") {
            if let Some(element) = &descriptor.element {
                self.compile_element(config, field, element, plan);
            }
        }

        if declared_type == Some("object") {
            if let Some(fields) = &descriptor.fields {
                embedded.insert(field.to_string(), fields.clone());
            }
        }

        if descriptor.constraints.not_null == Some(true) {
            let rule = ValidationRule::field("not_null", field, Check::NotNull);
            plan.insert.push(rule.clone());
            plan.update_set_field.push(rule);
        }

        for (name, check) in constraint_checks(config, field, &descriptor.constraints) {
            let rule = ValidationRule::field(name, field, check);
            plan.insert.push(rule.clone());
            plan.update_set_field.push(rule);
        }

        if let Some(default) = &descriptor.default {
            plan.insert.push(
                ValidationRule::field("default", field, Check::DefaultFill(default.clone()))
                    .always(),
            );
        }

        if let Some(entity) = &descriptor.entity {
            relations.push(RelationDescriptor {
                field: field.to_string(),
                target_entity: entity.clone(),
                foreign_key: descriptor.foreign.clone(),
                required: descriptor.required,
                role: descriptor
                    .role
                    .clone()
                    .unwrap_or_else(|| format!("{entity}_collection")),
                visible: descriptor.visible,
                is_array: declared_type == Some("array"),
                transfer: descriptor.transfer,
            });
        }
    }

    /// Array element rules: element-wise on insert and update-set, plus a
    /// single-element form for `$push`.
    fn compile_element(
        &self,
        config: &CollectionConfig,
        field: &str,
        element: &ElementSpec,
        plan: &mut ValidationPlan,
    ) {
        let (element_type, constraints) = match element {
            ElementSpec::Type(name) => (Some(name.as_str()), None),
            ElementSpec::Descriptor(descriptor) => (
                descriptor.element_type.as_deref(),
                Some(&descriptor.constraints),
            ),
        };

        let field_type = resolve_type(config, field, element_type);
        let type_check = Check::Type(field_type);
        let each = ValidationRule::field("element", field, Check::Each(Box::new(type_check.clone())));
        plan.insert.push(each.clone());
        plan.update_set_field.push(each);
        plan.update_set_array
            .push(ValidationRule::field("element", field, type_check));

        if let Some(constraints) = constraints {
            for (name, check) in constraint_checks(config, field, constraints) {
                let each = ValidationRule::field(name, field, Check::Each(Box::new(check.clone())));
                plan.insert.push(each.clone());
                plan.update_set_field.push(each);
                plan.update_set_array
                    .push(ValidationRule::field(name, field, check));
            }
        }
    }
}

/// Resolves a declared type name, degrading to `string` with a diagnostic.
fn resolve_type(config: &CollectionConfig, field: &str, name: Option<&str>) -> FieldType {
    match name {
        Some(name) => FieldType::parse(name).unwrap_or_else(|| {
            warn!(
                collection = %config.name,
                field,
                declared = name,
                "unrecognized type, assumed string"
            );
            FieldType::String
        }),
        None => {
            warn!(
                collection = %config.name,
                field,
                "undefined type, assumed string"
            );
            FieldType::String
        }
    }
}

/// Compiles the configured helper constraints into named checks.
fn constraint_checks(
    config: &CollectionConfig,
    field: &str,
    constraints: &ConstraintSet,
) -> Vec<(&'static str, Check)> {
    let mut checks = Vec::new();

    if let Some(min) = constraints.min_length {
        checks.push(("min_length", Check::MinLength(min)));
    }
    if let Some(max) = constraints.max_length {
        checks.push(("max_length", Check::MaxLength(max)));
    }
    if let Some(needle) = &constraints.contains {
        checks.push(("contains", Check::Contains(needle.clone())));
    }
    if let Some(needle) = &constraints.not_contains {
        checks.push(("not_contains", Check::NotContains(needle.clone())));
    }
    if let Some(values) = &constraints.one_of {
        checks.push(("in", Check::OneOf(values.clone())));
    }
    if let Some(values) = &constraints.not_one_of {
        checks.push(("not_in", Check::NotOneOf(values.clone())));
    }
    if let Some(min) = constraints.min {
        checks.push(("min", Check::Min(min)));
    }
    if let Some(max) = constraints.max {
        checks.push(("max", Check::Max(max)));
    }
    if let Some(pattern) = &constraints.pattern {
        if let Some(regex) = compile_pattern(config, field, pattern) {
            checks.push(("regex", Check::Pattern(regex)));
        }
    }
    if let Some(pattern) = &constraints.not_pattern {
        if let Some(regex) = compile_pattern(config, field, pattern) {
            checks.push(("not_regex", Check::NotPattern(regex)));
        }
    }
    if let Some(bound) = &constraints.after {
        checks.push(("after", Check::After(bound.clone())));
    }
    if let Some(bound) = &constraints.before {
        checks.push(("before", Check::Before(bound.clone())));
    }

    checks
}

/// Compiles a constraint pattern; an invalid pattern is skipped with a
/// diagnostic because compilation must not fail.
fn compile_pattern(config: &CollectionConfig, field: &str, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(error) => {
            warn!(
                collection = %config.name,
                field,
                pattern,
                %error,
                "invalid constraint pattern, skipped"
            );
            None
        }
    }
}

/// Builds the ordered event channel templates: configured names, the
/// collection channel, then the per-identifier channel.
fn event_channels(config: &CollectionConfig) -> Vec<String> {
    let mut channels = config.event_names.clone();
    channels.push(format!("entity:{}", config.name));
    let id_channel = if config.id_field == config.storage_id_field() {
        format!("entity:{}:{{{{obj.id}}}}", config.name)
    } else {
        format!("entity:{}:{{{{obj.{}}}}}", config.name, config.id_field)
    };
    channels.push(id_channel);
    channels
}
