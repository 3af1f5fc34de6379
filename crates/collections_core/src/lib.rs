//! # Entity Collections Core
//!
//! Core data structures and types for the Entity Collections Engine.
//!
//! This crate provides the building blocks for describing entity collections:
//! the declarative attribute configuration a collection is constructed from,
//! the runtime `Value`/`Record` representation of entities, queries and
//! update payloads, and the shared error type.
//!
//! ## Key Concepts
//!
//! - **CollectionConfig**: declarative schema for one collection — field
//!   types, constraints, relations, visibility
//! - **Record**: a loosely typed entity, query, or update-section document
//! - **UpdateDocument / ReadOptions**: payload shapes exchanged with
//!   storage adapters
//!
//! ## Example
//!
//! ```rust
//! use collections_core::{AttributeBuilder, CollectionConfigBuilder};
//!
//! let config = CollectionConfigBuilder::new("users")
//!     .typed("name", "string")
//!     .attribute("email", AttributeBuilder::of_type("email").required().build())
//!     .build();
//!
//! assert_eq!(config.name, "users");
//! assert!(config.strict);
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod payload;
pub mod value;

pub use builder::*;
pub use config::*;
pub use error::*;
pub use payload::*;
pub use value::*;
