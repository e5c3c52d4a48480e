//! Error types for the modelforge library.
//!
//! Soft per-model failures (catalog miss, declined conflict, failed
//! acquisition) are surfaced as warnings by the reconciliation pipeline;
//! only the variants marked hard below abort a run.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for modelforge operations.
#[derive(Debug, Error)]
pub enum ForgeError {
    // Catalog errors
    #[error("Model catalog unavailable: every lookup failed")]
    CatalogUnavailable,

    #[error("Model not found in catalog: {name}")]
    ModelNotFound { name: String },

    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    // Reconciliation errors
    #[error("Failed to delete install path for {name}: {message}")]
    DeletionFailed { name: String, message: String },

    // Commit errors
    #[error("Acquisition failed for {name}: {message}")]
    AcquisitionFailed { name: String, message: String },

    #[error("Configuration write failed; downloaded but undeclared models: {}", names.join(", "))]
    PersistFailed { names: Vec<String> },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for modelforge operations.
pub type Result<T> = std::result::Result<T, ForgeError>;

// Conversion implementations for common error types

impl From<std::io::Error> for ForgeError {
    fn from(err: std::io::Error) -> Self {
        ForgeError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(err: serde_json::Error) -> Self {
        ForgeError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for ForgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ForgeError::Timeout(std::time::Duration::from_secs(0))
        } else {
            ForgeError::Network {
                message: err.to_string(),
                cause: Some(err.to_string()),
            }
        }
    }
}

impl ForgeError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ForgeError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

}

/// Extension for attaching path context to raw IO results.
pub trait IoResultExt<T> {
    fn with_path(self, path: &std::path::Path) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| ForgeError::io_with_path(e, path))
    }
}
