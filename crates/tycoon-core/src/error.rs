//! Unified error types for Tycoon

use thiserror::Error;

/// Unified error type for all Tycoon operations
#[derive(Error, Debug)]
pub enum TycoonError {
    // Extraction errors
    #[error("Cannot parse number from {0:?}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // Page driver errors
    #[error("Element not present: {0}")]
    TransientLookup(String),

    #[error("Browser error: {0}")]
    Browser(String),

    // Game errors
    #[error("Planning error: {0}")]
    Planning(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("CSV error: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TycoonError {
    /// Whether the failure is an element that may still appear on the page
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientLookup(_))
    }

    /// Whether the failure means the looked-up thing does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias using TycoonError
pub type Result<T> = std::result::Result<T, TycoonError>;
