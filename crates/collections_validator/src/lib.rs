//! Schema compilation and record validation.
//!
//! This crate turns declarative collection configurations from
//! [`collections_core`] into compiled validation plans and applies them to
//! records, query filters, and update documents:
//!
//! - [`checks`]: the atomic check vocabulary (types, constraints, strict
//!   field filtering, identifier normalization)
//! - [`plan`]: compiled rule lists per operation, relation descriptors, and
//!   read projections
//! - [`compile`]: the configuration-to-plan compiler
//! - [`engine`]: rule application with first-failure reporting
//! - [`events`]: event channel template rendering

pub mod checks;
pub mod compile;
pub mod engine;
pub mod events;
pub mod plan;

pub use checks::{Check, FieldType, IdNormalizer};
pub use compile::SchemaCompiler;
pub use engine::{apply_rule, apply_rules, validate_insert, validate_query, validate_update, Violation};
pub use events::{render_channel, TemplateDelimiters};
pub use plan::{
    CompiledSchema, ProjectionMap, RelationDescriptor, ValidationPlan, ValidationRule,
};
