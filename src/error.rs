//! Error handling for telebind-rs
//!
//! This module defines the crate-level error type and a Result alias for use
//! throughout the library. Per-entry failures while committing a binding batch
//! use [`BindingError`], which is collected into a report instead of aborting
//! the batch.

use crate::model::{NodeId, ValueType};
use thiserror::Error;

/// Main error type for telebind-rs operations
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to the configuration model arena or documents
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Errors raised while applying a value binding
    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<TelemetryError>,
    },
}

impl TelemetryError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        TelemetryError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for TelemetryError {
    fn from(err: serde_json::Error) -> Self {
        TelemetryError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for TelemetryError {
    fn from(err: toml::de::Error) -> Self {
        TelemetryError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for TelemetryError {
    fn from(err: toml::ser::Error) -> Self {
        TelemetryError::Serialization(err.to_string())
    }
}

/// Errors produced while building or editing a configuration model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("Duplicate declaration name '{0}'")]
    DuplicateDeclaration(String),

    #[error("Unresolved reference '{reference}' in slot '{slot}' of '{node}'")]
    UnresolvedReference {
        node: String,
        slot: String,
        reference: String,
    },

    #[error("Slot '{slot}' of {node:?} is not a scalar slot")]
    NotScalar { node: NodeId, slot: String },

    #[error("Slot '{slot}' of {node:?} does not exist")]
    MissingSlot { node: NodeId, slot: String },
}

/// Per-entry failure while committing a binding batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    /// The identifier does not resolve to any element of the model.
    #[error("Identifier '{identifier}' does not address a known element")]
    Unresolved { identifier: String },

    /// The identifier resolved to an element but a path step does not exist.
    #[error("Identifier '{identifier}': no slot '{slot}' on '{element}'")]
    UnknownSlot {
        identifier: String,
        element: String,
        slot: String,
    },

    /// The identifier resolved to a slot that cannot hold a value.
    #[error("Identifier '{identifier}': slot '{slot}' is not assignable")]
    NotAssignable { identifier: String, slot: String },

    /// The raw value does not fit the slot type and no coercion rule applies.
    #[error("Identifier '{identifier}': cannot assign {found} to {expected} slot")]
    TypeMismatch {
        identifier: String,
        expected: ValueType,
        found: &'static str,
    },
}

impl BindingError {
    /// The identifier this failure belongs to.
    pub fn identifier(&self) -> &str {
        match self {
            BindingError::Unresolved { identifier }
            | BindingError::UnknownSlot { identifier, .. }
            | BindingError::NotAssignable { identifier, .. }
            | BindingError::TypeMismatch { identifier, .. } => identifier,
        }
    }

    /// Whether this is a caller/data error rather than a missing mapping.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, BindingError::TypeMismatch { .. })
    }
}

/// Result type alias for telebind-rs operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<TelemetryError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::Config("missing separator".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing separator");
    }

    #[test]
    fn test_error_with_context() {
        let err = TelemetryError::Config("test".to_string());
        let with_ctx = err.with_context("Failed to load");
        assert!(with_ctx.to_string().contains("Failed to load"));
    }

    #[test]
    fn test_result_ext_on_io_error() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        let err = res.context("Reading model").unwrap_err();
        assert!(err.to_string().starts_with("Reading model"));
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = BindingError::TypeMismatch {
            identifier: "PipelineElement:p:src:LATENCY".into(),
            expected: ValueType::Integer,
            found: "text",
        };
        assert!(err.is_type_mismatch());
        assert!(err.to_string().contains("Integer"));
        assert_eq!(err.identifier(), "PipelineElement:p:src:LATENCY");
    }
}
