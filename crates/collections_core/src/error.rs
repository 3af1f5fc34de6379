//! Error types for collection operations.

use thiserror::Error;

/// Errors surfaced by a collection operation chain.
///
/// A rejected chain reports which stage failed: input validation (with the
/// failing rule's name and field), the storage adapter, or a lifecycle hook.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// A compiled validation rule rejected the payload
    #[error("validation rule '{rule}' failed: {message}")]
    Validation {
        rule: String,
        field: Option<String>,
        message: String,
    },

    /// The storage adapter failed
    #[error("adapter error during {operation}: {message}")]
    Adapter { operation: String, message: String },

    /// A lifecycle hook failed
    #[error("hook '{hook}' failed: {message}")]
    Hook { hook: String, message: String },

    /// The collection configuration is unusable
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CollectionError {
    /// Creates a new validation error.
    pub fn validation(
        rule: impl Into<String>,
        field: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            rule: rule.into(),
            field,
            message: message.into(),
        }
    }

    /// Creates a new adapter error.
    pub fn adapter(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Adapter {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a new hook error.
    pub fn hook(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Hook {
            hook: hook.into(),
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// The failing rule's name, when this is a validation rejection.
    pub fn rule(&self) -> Option<&str> {
        match self {
            Self::Validation { rule, .. } => Some(rule),
            _ => None,
        }
    }

    /// The failing field, when this is a validation rejection bound to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

/// Result type for collection operations.
pub type Result<T> = std::result::Result<T, CollectionError>;
