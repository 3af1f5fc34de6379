//! CRUD operation pipeline over compiled collection schemas.
//!
//! This crate assembles the pieces from [`collections_core`] and
//! [`collections_validator`] into a runnable [`Collection`]: a storage
//! adapter contract with predictable defaults, lifecycle hooks, and the
//! seven operation verbs as fixed sequential chains.
//!
//! ```rust
//! use collections_core::{record, AttributeBuilder, CollectionConfigBuilder, Value};
//! use collections_engine::Collection;
//!
//! let config = CollectionConfigBuilder::new("posts")
//!     .attribute("title", AttributeBuilder::of_type("string").required().build())
//!     .build();
//! let collection = Collection::from_config(config);
//!
//! // The null adapter validates and persists nothing.
//! let saved = collection.create(&record([("title", Value::from("Hello"))]));
//! assert_eq!(saved.unwrap(), None);
//! ```

pub mod adapter;
pub mod collection;
pub mod hooks;

pub use adapter::{NullAdapter, StorageAdapter};
pub use collection::{Collection, CollectionBuilder};
pub use hooks::{DefaultHooks, LifecycleHooks, SaveIntent};
