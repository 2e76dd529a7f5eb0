//! WFS client error types.

use super::convert::ConversionError;

/// Errors from the routing service client.
#[derive(Debug, thiserror::Error)]
pub enum WfsError {
    /// HTTP request failed (connection refused, reset, DNS, ...)
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The request did not complete in time
    #[error("request timed out")]
    Timeout,

    /// Service returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed. `body` keeps the start of the response
    /// for debugging.
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// A feature could not be turned into a domain value
    #[error("invalid feature: {0}")]
    Conversion(#[from] ConversionError),

    /// Client or mock data not set up
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl WfsError {
    /// Whether retrying the same request might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            WfsError::Http(_) | WfsError::Timeout => true,
            WfsError::Api { status, .. } => *status >= 500 || *status == 429,
            WfsError::Json { .. } | WfsError::Conversion(_) | WfsError::NotConfigured(_) => false,
        }
    }
}

impl From<reqwest::Error> for WfsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WfsError::Timeout
        } else {
            WfsError::Http(err)
        }
    }
}
