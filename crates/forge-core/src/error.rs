//! Centralized error types for Forge.

use std::path::PathBuf;
use thiserror::Error;

use crate::service::ServiceError;

/// Main error type for Forge operations.
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Failed to write '{}': {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Service '{service}' failed to start: {source}")]
    ServiceStart {
        service: String,
        #[source]
        source: ServiceError,
    },

    #[error("Application already stopped: {0}")]
    ApplicationStopped(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for Forge operations.
pub type ForgeResult<T> = Result<T, ForgeError>;

impl ForgeError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a render error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Create a persistence error for the given path.
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}
