//! End-to-end compilation and validation flows.
//!
//! These tests exercise the full path from a declarative configuration
//! through the compiler to rule application on inserts, queries, and update
//! documents, the way an engine embedding this crate drives it.

use collections_core::{
    record, AttributeBuilder, CollectionConfigBuilder, Record, UpdateDocument, Value,
};
use collections_validator::{
    validate_insert, validate_query, validate_update, IdNormalizer, SchemaCompiler,
};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

fn compile(config: &collections_core::CollectionConfig) -> collections_validator::CompiledSchema {
    SchemaCompiler::new(IdNormalizer::identity()).compile(config)
}

#[test]
fn test_insert_flow_fills_defaults_and_enforces_constraints() {
    let config = CollectionConfigBuilder::new("posts")
        .attribute("title", AttributeBuilder::of_type("string").required().min_length(3).build())
        .attribute(
            "status",
            AttributeBuilder::of_type("string")
                .one_of(["draft", "published"])
                .default_value("draft")
                .build(),
        )
        .build();
    let compiled = compile(&config);

    let mut doc = record([("title", Value::from("Hello"))]);
    validate_insert(&compiled.plan, &mut doc).unwrap();
    assert_eq!(doc.get("status"), Some(&Value::from("draft")));

    let mut short = record([("title", Value::from("Hi"))]);
    let violation = validate_insert(&compiled.plan, &mut short).unwrap_err();
    assert_eq!(violation.rule_name(), "min_length");

    let mut missing = Record::new();
    let violation = validate_insert(&compiled.plan, &mut missing).unwrap_err();
    assert_eq!(violation.rule_name(), "required");
    assert_eq!(violation.field(), Some("title"));
}

#[test]
fn test_generated_default_runs_fresh_per_insert() {
    let counter = Arc::new(AtomicI64::new(0));
    let counter_in_generator = Arc::clone(&counter);
    let config = CollectionConfigBuilder::new("tickets")
        .strict(false)
        .attribute(
            "number",
            AttributeBuilder::of_type("integer")
                .default_generator(move || {
                    Value::Int(counter_in_generator.fetch_add(1, Ordering::SeqCst))
                })
                .build(),
        )
        .build();
    let compiled = compile(&config);

    let mut first = Record::new();
    let mut second = Record::new();
    validate_insert(&compiled.plan, &mut first).unwrap();
    validate_insert(&compiled.plan, &mut second).unwrap();

    assert_eq!(first.get("number"), Some(&Value::Int(0)));
    assert_eq!(second.get("number"), Some(&Value::Int(1)));
}

#[test]
fn test_strict_mode_allows_declared_embedded_paths_on_update() {
    let config = CollectionConfigBuilder::new("users")
        .typed("name", "string")
        .attribute(
            "address",
            AttributeBuilder::of_type("object")
                .fields(collections_core::EmbeddedFields::Allowed(vec![
                    "street".to_string(),
                    "city".to_string(),
                ]))
                .build(),
        )
        .build();
    let compiled = compile(&config);

    let mut ok = UpdateDocument::default();
    ok.set.insert("address.street".into(), Value::from("Main St"));
    validate_update(&compiled.plan, &mut ok).unwrap();

    let mut bad = UpdateDocument::default();
    bad.set.insert("address.zip".into(), Value::from("12345"));
    let violation = validate_update(&compiled.plan, &mut bad).unwrap_err();
    assert_eq!(violation.rule_name(), "strict");

    let mut unknown = UpdateDocument::default();
    unknown.set.insert("nickname".into(), Value::from("Al"));
    assert!(validate_update(&compiled.plan, &mut unknown).is_err());
}

#[test]
fn test_identifier_normalization_runs_on_every_surface() {
    let normalizer = IdNormalizer::new(|value| match value {
        Value::String(s) => Ok(Value::String(s.trim().to_string())),
        Value::Int(i) => Ok(Value::String(i.to_string())),
        other => Err(format!("cannot use {} as identifier", other.type_name())),
    });
    let config = CollectionConfigBuilder::new("users").strict(false).build();
    let compiled = SchemaCompiler::new(normalizer).compile(&config);

    let mut doc = record([("id", Value::from(" abc "))]);
    validate_insert(&compiled.plan, &mut doc).unwrap();
    assert_eq!(doc.get("id"), Some(&Value::from("abc")));

    let mut filter = record([("id", Value::Int(42))]);
    validate_query(&compiled.plan, &mut filter).unwrap();
    assert_eq!(filter.get("id"), Some(&Value::from("42")));

    let mut update = UpdateDocument::default();
    update.set.insert("id".into(), Value::Bool(true));
    let violation = validate_update(&compiled.plan, &mut update).unwrap_err();
    assert_eq!(violation.rule_name(), "transform");
}

#[test]
fn test_element_descriptor_constraints() {
    let config = CollectionConfigBuilder::new("posts")
        .strict(false)
        .attribute(
            "tags",
            AttributeBuilder::of_type("array")
                .element(collections_core::ElementSpec::Descriptor(
                    collections_core::ElementDescriptor {
                        element_type: Some("string".to_string()),
                        constraints: collections_core::ConstraintSet {
                            min_length: Some(2),
                            ..Default::default()
                        },
                    },
                ))
                .build(),
        )
        .build();
    let compiled = compile(&config);

    let mut ok = record([(
        "tags",
        Value::Array(vec![Value::from("rust"), Value::from("db")]),
    )]);
    validate_insert(&compiled.plan, &mut ok).unwrap();

    let mut bad = record([(
        "tags",
        Value::Array(vec![Value::from("rust"), Value::from("x")]),
    )]);
    let violation = validate_insert(&compiled.plan, &mut bad).unwrap_err();
    assert_eq!(violation.rule_name(), "min_length");

    // The single-element form guards pushes
    let mut push = UpdateDocument::default();
    push.push.insert("tags".into(), Value::from("x"));
    assert!(validate_update(&compiled.plan, &mut push).is_err());
}

#[test]
fn test_readable_projection_and_query_rejection() {
    let config = CollectionConfigBuilder::new("accounts")
        .typed("name", "string")
        .attribute(
            "password_hash",
            AttributeBuilder::of_type("string").readable(false).build(),
        )
        .build();
    let compiled = compile(&config);

    assert_eq!(compiled.projection.get("password_hash"), Some(&0));

    let mut filter = record([("password_hash", Value::from("deadbeef"))]);
    let violation = validate_query(&compiled.plan, &mut filter).unwrap_err();
    assert_eq!(violation.rule_name(), "reject");
    assert_eq!(violation.field(), Some("password_hash"));
}

#[test]
fn test_compiled_plans_are_reproducible() {
    let build = || {
        CollectionConfigBuilder::new("orders")
            .typed("sku", "string")
            .attribute(
                "quantity",
                AttributeBuilder::of_type("integer").min(1.0).max(100.0).build(),
            )
            .attribute(
                "customer",
                AttributeBuilder::of_type("relation").entity("user").build(),
            )
            .build()
    };
    let compiler = SchemaCompiler::new(IdNormalizer::identity());
    let first = compiler.compile(&build());
    let second = compiler.compile(&build());
    assert_eq!(first, second);
}
