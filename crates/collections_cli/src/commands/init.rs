use anyhow::{Context, Result};
use collections_core::{AttributeBuilder, CollectionConfigBuilder};
use std::fs::File;
use std::io::Write;
use tracing::info;

use crate::output;

pub fn execute(name: &str, output_path: Option<&str>) -> Result<()> {
    info!("Scaffolding collection configuration: {}", name);

    // Starter configuration with one of each common attribute shape
    let config = CollectionConfigBuilder::new(name)
        .typed("id", "id")
        .attribute(
            "name",
            AttributeBuilder::of_type("string").required().build(),
        )
        .attribute(
            "status",
            AttributeBuilder::of_type("string")
                .one_of(["active", "archived"])
                .default_value("active")
                .build(),
        )
        .attribute(
            "tags",
            AttributeBuilder::of_type("array").element_type("string").build(),
        )
        .attribute(
            "created_at",
            AttributeBuilder::of_type("datetime").writeable(false).build(),
        )
        .build();

    let yaml = serde_yaml::to_string(&config)
        .context("Failed to serialize configuration to YAML")?;

    if let Some(path) = output_path {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path))?;
        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write to file: {}", path))?;
        output::print_success(&format!("Configuration written to: {}", path));
    } else {
        println!("{}", yaml);
    }

    Ok(())
}
