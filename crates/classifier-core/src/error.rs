//! Classifier Core Error Types

use thiserror::Error;

/// Model-level error types
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid fact path '{path}': {reason}")]
    InvalidFactPath { path: String, reason: String },

    #[error("Invalid value shape for operator '{operator}': {reason}")]
    InvalidRuleShape { operator: String, reason: String },

    #[error("Duplicate rule id: {0}")]
    DuplicateRuleId(String),

    #[error("Duplicate class: {0}")]
    DuplicateClass(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl serde::Serialize for ModelError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ModelError>;
