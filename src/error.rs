// src/error.rs

//! Unified error handling for the source adapter.

use std::fmt;

use thiserror::Error;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Structural landmark that was missing from a fetched page.
///
/// These signal that the upstream markup changed and the selectors need
/// maintenance; they are never transient.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Fewer than seven weekday containers on the schedule page
    #[error("schedule page has {found} day containers, expected 7")]
    ScheduleShapeMismatch { found: usize },

    /// The detail page has no root metadata block
    #[error("detail page {url} has no metadata block")]
    DetailNotFound { url: String },
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Non-2xx status, network failure or timeout
    #[error("Transport error for {url}: {reason}")]
    Transport { url: String, reason: String },

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Expected page structure was absent
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a transport error for a URL.
    pub fn transport(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error came from the network layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Http(_))
    }

    /// The missing landmark, if this is an extraction failure.
    pub fn extraction(&self) -> Option<&ExtractionError> {
        match self {
            Self::Extraction(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        let err = AppError::transport("https://example.com", "status 404");
        assert!(err.is_transport());
        assert!(err.extraction().is_none());
        assert_eq!(
            err.to_string(),
            "Transport error for https://example.com: status 404"
        );
    }

    #[test]
    fn test_extraction_sub_kind() {
        let err = AppError::from(ExtractionError::ScheduleShapeMismatch { found: 3 });
        assert!(!err.is_transport());
        assert_eq!(
            err.extraction(),
            Some(&ExtractionError::ScheduleShapeMismatch { found: 3 })
        );
    }
}
