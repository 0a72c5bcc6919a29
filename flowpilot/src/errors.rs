//! Error types for flowpilot

use thiserror::Error;

/// Main error type for flowpilot
#[derive(Error, Debug)]
pub enum CopilotError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Adapter error: {0}")]
    AdapterError(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}
