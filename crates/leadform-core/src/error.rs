//! Error types for the lead form system

use thiserror::Error;

/// Main error type for all lead form operations
#[derive(Error, Debug)]
pub enum LeadFormError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote API answered, but not with what we asked for
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Result type for lead form operations
pub type Result<T> = std::result::Result<T, LeadFormError>;
