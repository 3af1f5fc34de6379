use anyhow::{Context, Result};
use collections_parser::parse_file;
use collections_validator::{IdNormalizer, SchemaCompiler};
use serde_json::json;
use std::path::Path;
use tracing::info;

use crate::output;

pub fn execute(config_path: &str, format: &str) -> Result<()> {
    info!("Checking collection configuration: {}", config_path);

    // Parse the configuration file
    let path = Path::new(config_path);
    let config = parse_file(path)
        .with_context(|| format!("Failed to parse configuration file: {}", config_path))?;

    output::print_info(&format!(
        "Configuration loaded: {} ({} attributes)",
        config.name,
        config.attributes.len()
    ));

    // Compile to surface degraded type names and skipped patterns as
    // diagnostics before anything runs against a live collection
    let compiled = SchemaCompiler::new(IdNormalizer::identity()).compile(&config);

    output::print_success("Configuration is valid");

    if format == "json" {
        let summary = json!({
            "name": config.name,
            "strict": config.strict,
            "id_field": config.id_field,
            "attributes": config.attributes.len(),
            "rules": {
                "insert": compiled.plan.insert.len(),
                "query": compiled.plan.query.len(),
                "update_set_field": compiled.plan.update_set_field.len(),
                "update_unset_field": compiled.plan.update_unset_field.len(),
                "update_set_array": compiled.plan.update_set_array.len(),
                "update_unset_array": compiled.plan.update_unset_array.len(),
            },
            "relations": compiled.relations.iter().map(|r| &r.target_entity).collect::<Vec<_>>(),
            "hidden_fields": compiled.projection.keys().collect::<Vec<_>>(),
            "event_channels": compiled.event_channels,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    // Print configuration summary
    println!("\nCollection Summary:");
    println!("  Name:        {}", config.name);
    println!("  Strict:      {}", config.strict);
    println!("  Id field:    {}", config.id_field);
    println!("  Attributes:  {}", config.attributes.len());
    println!("  Rules:       {}", compiled.plan.len());
    println!("    insert:            {}", compiled.plan.insert.len());
    println!("    query:             {}", compiled.plan.query.len());
    println!("    update set field:  {}", compiled.plan.update_set_field.len());
    println!("    update unset field:{}", compiled.plan.update_unset_field.len());
    println!("    update set array:  {}", compiled.plan.update_set_array.len());
    println!("    update unset array:{}", compiled.plan.update_unset_array.len());

    if !compiled.relations.is_empty() {
        println!("\nRelations:");
        for relation in &compiled.relations {
            println!(
                "  {} -> {} (role: {}{})",
                relation.field,
                relation.target_entity,
                relation.role,
                if relation.is_array { ", array" } else { "" }
            );
        }
    }

    if !compiled.projection.is_empty() {
        println!("\nHidden fields:");
        for field in compiled.projection.keys() {
            println!("  {}", field);
        }
    }

    println!("\nEvent channels:");
    for channel in &compiled.event_channels {
        println!("  {}", channel);
    }

    Ok(())
}
