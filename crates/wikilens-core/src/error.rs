//! Error types for Wikilens

use thiserror::Error;

/// Result type alias using Wikilens' Error
pub type Result<T> = std::result::Result<T, Error>;

/// Wikilens error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Network errors (E100-E199)
    #[error("Service unavailable: {0}. Check your internet connection.")]
    ServiceUnavailable(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Image lookup failed for entity '{0}': {1}")]
    EnrichmentFailed(String, String),

    #[error("Generative AI API key missing. Set GEMINI_API_KEY or API_KEY environment variable.")]
    ApiKeyMissing,

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ServiceUnavailable(format!("request timed out ({})", err))
        } else {
            Self::ServiceUnavailable(err.to_string())
        }
    }
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "E100",
            Self::MalformedResponse(_) => "E101",
            Self::EnrichmentFailed(..) => "E102",
            Self::ApiKeyMissing => "E103",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ServiceUnavailable(_) => Some("Check internet connection".to_string()),
            Self::MalformedResponse(_) => {
                Some("Retry the request or choose another model".to_string())
            }
            Self::ApiKeyMissing => Some("export GEMINI_API_KEY=<your key>".to_string()),
            Self::ConfigError(_) => Some("wikilens --reset-config".to_string()),
            _ => None,
        }
    }

    /// Whether this error is the non-fatal per-item enrichment failure
    pub fn is_enrichment_failure(&self) -> bool {
        matches!(self, Self::EnrichmentFailed(..))
    }
}
