//! Error types for the advisory service

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// A single rejected input field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AdvisorError {

    // =============================
    // Domain Errors
    // =============================

    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Invalid provider payload: {0}")]
    InvalidPayload(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AdvisorError {
    /// Field-level errors, if this is a validation failure
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            AdvisorError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
