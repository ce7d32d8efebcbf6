//! Error types for emlsync
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// All error types that can occur in emlsync
#[derive(Debug, Error)]
pub enum EmlError {
    /// A template set's metadata.json is missing, malformed or invalid
    #[error("Invalid metadata in {}: {reason}", path.display())]
    InvalidMetadata { path: PathBuf, reason: String },

    /// No remote template matches the lookup key
    #[error("Could not find template with {key}")]
    NotFound { key: String },

    /// Remote listing holds more templates than a single page
    #[error("Remote has {total} templates, page size is {limit}; raise the page size")]
    PageLimit { total: u64, limit: u32 },

    /// Non-success HTTP response
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport failure (connect, timeout, body decode)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Required key absent from the settings file
    #[error("Missing setting: {0}")]
    MissingSetting(String),

    /// Config or settings file unreadable or malformed
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid command line usage
    #[error("Usage error: {0}")]
    Usage(String),

    /// Blueprint rendering failure
    #[error("Render error: {0}")]
    Render(String),

    /// Unparsable translation catalog
    #[error("Translation error: {0}")]
    Translation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EmlError {
    pub fn invalid_metadata(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        EmlError::InvalidMetadata {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EmlError::NotFound { .. })
    }
}

/// Result type alias for emlsync operations
pub type Result<T> = std::result::Result<T, EmlError>;
