//! Parser for collection configuration files (YAML/TOML/JSON formats).
//!
//! This module provides functionality to parse collection configurations
//! from YAML, TOML, and JSON sources into the strongly-typed
//! `CollectionConfig` structure.
//!
//! # Example
//!
//! ```rust
//! use collections_parser::parse_yaml;
//!
//! let yaml = r#"
//! name: users
//! strict: true
//! attributes:
//!   email:
//!     type: email
//!     required: true
//!   name: string
//! "#;
//!
//! let config = parse_yaml(yaml).expect("Failed to parse configuration");
//! assert_eq!(config.name, "users");
//! ```

use collections_core::CollectionConfig;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration parsing.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// JSON parsing or deserialization failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

/// Parse a collection configuration from a YAML string.
///
/// # Example
///
/// ```rust
/// use collections_parser::parse_yaml;
///
/// let yaml = r#"
/// name: posts
/// attributes:
///   title: string
/// "#;
///
/// let config = parse_yaml(yaml).unwrap();
/// assert_eq!(config.name, "posts");
/// assert!(config.strict);
/// ```
pub fn parse_yaml(content: &str) -> Result<CollectionConfig> {
    let config: CollectionConfig = serde_yaml::from_str(content)?;
    Ok(config)
}

/// Parse a collection configuration from a TOML string.
///
/// # Example
///
/// ```rust
/// use collections_parser::parse_toml;
///
/// let toml = r#"
/// name = "posts"
///
/// [attributes]
/// title = "string"
/// "#;
///
/// let config = parse_toml(toml).unwrap();
/// assert_eq!(config.name, "posts");
/// ```
pub fn parse_toml(content: &str) -> Result<CollectionConfig> {
    let config: CollectionConfig =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    Ok(config)
}

/// Parse a collection configuration from a JSON string.
pub fn parse_json(content: &str) -> Result<CollectionConfig> {
    let config: CollectionConfig = serde_json::from_str(content)?;
    Ok(config)
}

/// Detect the configuration format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `ConfigFormat::Yaml`
/// * `.toml` → `ConfigFormat::Toml`
/// * `.json` → `ConfigFormat::Json`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<ConfigFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(ConfigFormat::Yaml),
        "toml" => Ok(ConfigFormat::Toml),
        "json" => Ok(ConfigFormat::Json),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a collection configuration from a file with automatic format
/// detection based on the file extension.
///
/// # Example
///
/// ```no_run
/// use collections_parser::parse_file;
/// use std::path::Path;
///
/// let config = parse_file(Path::new("collections/users.yml")).unwrap();
/// println!("Loaded collection: {}", config.name);
/// ```
pub fn parse_file(path: &Path) -> Result<CollectionConfig> {
    let content = std::fs::read_to_string(path)?;
    let format = detect_format(path)?;

    match format {
        ConfigFormat::Yaml => parse_yaml(&content),
        ConfigFormat::Toml => parse_toml(&content),
        ConfigFormat::Json => parse_json(&content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collections_core::{AttributeSpec, EmbeddedFields, Value};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_valid_yaml_minimal() {
        let yaml = r#"
name: users
attributes:
  name: string
"#;

        let config = parse_yaml(yaml).expect("Failed to parse valid YAML");

        assert_eq!(config.name, "users");
        assert!(config.strict);
        assert_eq!(config.id_field, "id");
        assert_eq!(config.attributes.len(), 1);
        assert_eq!(
            config.attributes.get("name"),
            Some(&AttributeSpec::Type("string".to_string()))
        );
    }

    #[test]
    fn test_parse_yaml_with_descriptors() {
        let yaml = r#"
name: posts
strict: false
event_names:
  - audit
  - search_index
attributes:
  title:
    type: string
    required: true
    min_length: 3
  status:
    type: string
    in: [draft, published]
    default: draft
  author:
    type: relation
    entity: user
    foreign: post_id
  tags:
    type: array
    element: string
"#;

        let config = parse_yaml(yaml).expect("Failed to parse YAML with descriptors");

        assert_eq!(config.name, "posts");
        assert!(!config.strict);
        assert_eq!(config.event_names, vec!["audit", "search_index"]);

        let title = config.attributes["title"].as_descriptor().unwrap();
        assert_eq!(title.attr_type.as_deref(), Some("string"));
        assert!(title.required);
        assert_eq!(title.constraints.min_length, Some(3));

        let status = config.attributes["status"].as_descriptor().unwrap();
        assert_eq!(
            status.constraints.one_of,
            Some(vec![Value::from("draft"), Value::from("published")])
        );
        assert!(status.default.is_some());

        let author = config.attributes["author"].as_descriptor().unwrap();
        assert_eq!(author.entity.as_deref(), Some("user"));
        assert_eq!(author.foreign.as_deref(), Some("post_id"));

        let tags = config.attributes["tags"].as_descriptor().unwrap();
        assert!(tags.element.is_some());
    }

    #[test]
    fn test_parse_yaml_single_event_name() {
        let yaml = r#"
name: users
event_names: audit
"#;
        let config = parse_yaml(yaml).unwrap();
        assert_eq!(config.event_names, vec!["audit"]);
    }

    #[test]
    fn test_parse_yaml_camel_case_aliases() {
        let yaml = r#"
name: users
eventNames: audit
idField: uuid
"#;
        let config = parse_yaml(yaml).unwrap();
        assert_eq!(config.event_names, vec!["audit"]);
        assert_eq!(config.id_field, "uuid");
    }

    #[test]
    fn test_parse_yaml_embedded_fields() {
        let yaml = r#"
name: users
attributes:
  address:
    type: object
    fields: [street, city]
  metadata:
    type: object
    fields: false
"#;
        let config = parse_yaml(yaml).unwrap();

        let address = config.attributes["address"].as_descriptor().unwrap();
        assert_eq!(
            address.fields,
            Some(EmbeddedFields::Allowed(vec![
                "street".to_string(),
                "city".to_string()
            ]))
        );

        let metadata = config.attributes["metadata"].as_descriptor().unwrap();
        assert_eq!(metadata.fields, Some(EmbeddedFields::Toggle(false)));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let invalid_yaml = r#"
name: [not, a, string
"#;
        let result = parse_yaml(invalid_yaml);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ParserError::YamlError(_)));
    }

    #[test]
    fn test_parse_yaml_missing_name() {
        let yaml = r#"
attributes:
  name: string
"#;
        assert!(parse_yaml(yaml).is_err());
    }

    #[test]
    fn test_parse_valid_toml() {
        let toml = r#"
name = "orders"
strict = true

[attributes]
sku = "string"

[attributes.quantity]
type = "integer"
required = true
min = 1.0
"#;

        let config = parse_toml(toml).expect("Failed to parse valid TOML");

        assert_eq!(config.name, "orders");
        assert_eq!(
            config.attributes.get("sku"),
            Some(&AttributeSpec::Type("string".to_string()))
        );
        let quantity = config.attributes["quantity"].as_descriptor().unwrap();
        assert!(quantity.required);
        assert_eq!(quantity.constraints.min, Some(1.0));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let invalid_toml = r#"
name = "test"
[[[invalid syntax
"#;
        let result = parse_toml(invalid_toml);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ParserError::TomlError(_)));
    }

    #[test]
    fn test_parse_valid_json() {
        let json = r#"{
            "name": "users",
            "attributes": {
                "email": {"type": "email", "required": true},
                "name": "string"
            }
        }"#;

        let config = parse_json(json).expect("Failed to parse valid JSON");
        assert_eq!(config.name, "users");
        let email = config.attributes["email"].as_descriptor().unwrap();
        assert_eq!(email.attr_type.as_deref(), Some("email"));
        assert!(email.required);
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format(Path::new("users.yaml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            detect_format(Path::new("users.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            detect_format(Path::new("users.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            detect_format(Path::new("users.json")).unwrap(),
            ConfigFormat::Json
        );
    }

    #[test]
    fn test_detect_format_unsupported() {
        let result = detect_format(Path::new("users.xml"));
        assert!(matches!(
            result.unwrap_err(),
            ParserError::UnsupportedFormat(_)
        ));
    }

    #[test]
    fn test_detect_format_no_extension() {
        let result = detect_format(Path::new("users"));
        assert!(matches!(result.unwrap_err(), ParserError::InvalidExtension));
    }

    #[test]
    fn test_round_trip_yaml() {
        let yaml = r#"
name: posts
attributes:
  title:
    type: string
    required: true
  views: integer
"#;
        let original = parse_yaml(yaml).unwrap();
        let serialized = serde_yaml::to_string(&original).expect("Failed to serialize");
        let parsed = parse_yaml(&serialized).expect("Failed to parse");

        assert_eq!(parsed.name, original.name);
        assert_eq!(parsed.strict, original.strict);
        assert_eq!(parsed.attributes, original.attributes);
    }
}
