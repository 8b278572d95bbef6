//! Error types for node templates and editor configuration

use std::path::PathBuf;
use thiserror::Error;

/// Result type for field template operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur while loading templates or configuration
#[derive(Debug, Error)]
pub enum FieldsError {
    /// Source record is missing or does not have the shape of a node record
    #[error("invalid source record: {reason}")]
    InvalidSource { reason: String },

    /// JSON syntax error in a node document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be extracted
    #[error("failed to load editor configuration: {source}")]
    Config { source: figment::Error },

    /// Configuration file has an extension we cannot parse
    #[error("unsupported configuration file format: {path}")]
    UnsupportedConfigFormat { path: PathBuf },
}

impl FieldsError {
    pub fn invalid_source(reason: impl Into<String>) -> Self {
        Self::InvalidSource {
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for FieldsError {
    fn from(source: figment::Error) -> Self {
        Self::Config { source }
    }
}
