use anyhow::{bail, Context, Result};
use collections_core::{Record, Value};
use collections_parser::parse_file;
use collections_validator::{validate_insert, IdNormalizer, SchemaCompiler};
use std::path::Path;
use tracing::info;

use crate::output::{self, ValidationReport};

pub fn execute(config_path: &str, records_path: &str, format: &str) -> Result<()> {
    info!("Validating records: {}", records_path);

    // Parse the configuration file
    let config = parse_file(Path::new(config_path))
        .with_context(|| format!("Failed to parse configuration file: {}", config_path))?;

    output::print_info(&format!(
        "Configuration loaded: {} ({} attributes)",
        config.name,
        config.attributes.len()
    ));

    let compiled = SchemaCompiler::new(IdNormalizer::identity()).compile(&config);

    // Load records: one object or an array of objects
    let content = std::fs::read_to_string(records_path)
        .with_context(|| format!("Failed to read records file: {}", records_path))?;
    let parsed: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse records file: {}", records_path))?;

    let records: Vec<Record> = match parsed {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                other => bail!("expected an object, found {}", other.type_name()),
            })
            .collect::<Result<_>>()?,
        Value::Object(record) => vec![record],
        other => bail!("expected an object or an array, found {}", other.type_name()),
    };

    output::print_info(&format!("Running {} record(s) through the insert rules", records.len()));

    // Run each record through the insert rule list
    let mut errors = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let mut record = record.clone();
        if let Err(violation) = validate_insert(&compiled.plan, &mut record) {
            errors.push(format!("record {}: {}", index, violation));
        }
    }

    let report = ValidationReport {
        checked: records.len(),
        errors,
    };
    output::print_validation_report(&report, format);

    if !report.passed() {
        std::process::exit(1);
    }

    Ok(())
}
