//! Error types for Control API operations.
//!
//! Errors carry a category so callers can tell a missing resource apart
//! from every other failure without inspecting status codes themselves.

use std::fmt;

/// Result type alias for Control API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of Control API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The requested resource does not exist.
    NotFound,
    /// The token is missing, invalid, or lacks the required capability.
    Unauthorized,
    /// The request was rejected as invalid.
    Rejected,
    /// Network-related errors (no HTTP response).
    Network,
    /// The response could not be decoded.
    Format,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether this error means the resource is already gone.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Resource not found",
            Self::Unauthorized => "Not authorized",
            Self::Rejected => "Request rejected",
            Self::Network => "Network connectivity issue",
            Self::Format => "Invalid response format",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotFound => "Verify the app ID and resource ID",
            Self::Unauthorized => "Check that the account token is valid and has the required capabilities",
            Self::Rejected => "Check the resource attributes against the Control API documentation",
            Self::Network => "Check your internet connection and the Control API URL",
            Self::Format => "The Control API returned an unexpected payload",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur when talking to the Control API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The request never produced an HTTP response.
    #[error("HTTP request failed: {message}")]
    HttpError {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The API answered with an error status.
    #[error("status: {status}, code: {code}, error: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Ably error code, 0 if absent.
        code: u32,
        /// Error message from the response body.
        message: String,
    },

    /// A resource was not found outside of an HTTP exchange.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid response from API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::HttpError {
            message: message.into(),
            status,
        }
    }

    /// Create an API status error.
    pub fn api(status: u16, code: u32, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code,
            message: message.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::HttpError { status: None, .. } => ErrorCategory::Network,
            Error::HttpError {
                status: Some(status),
                ..
            }
            | Error::Api { status, .. } => status_category(*status),
            Error::NotFound(_) => ErrorCategory::NotFound,
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether the error means the resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category().is_not_found()
    }
}

fn status_category(status: u16) -> ErrorCategory {
    match status {
        404 => ErrorCategory::NotFound,
        401 | 403 => ErrorCategory::Unauthorized,
        400 | 409 | 422 => ErrorCategory::Rejected,
        _ => ErrorCategory::Other,
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::HttpError {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            other => Self::HttpError {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_categories() {
        assert_eq!(Error::api(404, 40400, "missing").category(), ErrorCategory::NotFound);
        assert_eq!(Error::api(401, 40100, "bad token").category(), ErrorCategory::Unauthorized);
        assert_eq!(Error::api(422, 42200, "bad field").category(), ErrorCategory::Rejected);
        assert_eq!(Error::api(500, 50000, "boom").category(), ErrorCategory::Other);
    }

    #[test]
    fn test_http_error_without_status_is_network() {
        let err = Error::http("connection reset", None);
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_http_status_error_is_classified() {
        let err: Error = ureq::Error::StatusCode(404).into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_not_found_variant() {
        let err = Error::NotFound("rule abc".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: rule abc");
    }

    #[test]
    fn test_api_error_display() {
        let err = Error::api(400, 40000, "invalid url");
        let display = format!("{}", err);
        assert!(display.contains("400"));
        assert!(display.contains("invalid url"));
    }

    #[test]
    fn test_category_advice() {
        assert!(!ErrorCategory::NotFound.advice().is_empty());
        assert!(!ErrorCategory::Unauthorized.advice().is_empty());
        assert!(format!("{}", ErrorCategory::Network).contains("Network"));
    }

    #[test]
    fn test_invalid_json_is_format_error() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.category(), ErrorCategory::Format);
    }
}
