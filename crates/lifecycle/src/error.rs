//! Error types for lifecycle operations.
//!
//! Errors are categorized so the driver can decide which ones are recovered
//! locally (a resource that is already gone) and which ones terminate the
//! operation with a user-visible diagnostic.

use crate::types::{Diagnostic, Operation};
use std::fmt;

/// Result type alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by the API collaborator, classified by the caller.
///
/// The engine only depends on the not-found / other split, never on
/// status codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The remote resource does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Any other API failure.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Categories of lifecycle errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The provider was not configured before the operation ran.
    NotConfigured,
    /// Plan or state could not be decoded, or state could not be encoded.
    Decode,
    /// The remote resource is gone (recoverable).
    NotFound,
    /// The API call failed or returned something unusable.
    Api,
    /// The import identifier is malformed.
    ImportFormat,
}

impl ErrorCategory {
    /// Whether the driver recovers from this category without an error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotConfigured => "Provider not configured",
            Self::Decode => "Invalid configuration data",
            Self::NotFound => "Resource not found",
            Self::Api => "Control API failure",
            Self::ImportFormat => "Invalid import identifier",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while driving a resource lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No configured API client is available.
    #[error("the provider hasn't been configured before apply")]
    NotConfigured,

    /// Host-supplied plan or state is malformed.
    #[error("could not decode {source_name}: {message}")]
    Decode {
        /// "plan", "state" or "response".
        source_name: &'static str,
        /// Underlying decoder message.
        message: String,
    },

    /// A snapshot could not be turned back into host data.
    #[error("could not encode state: {0}")]
    Encode(String),

    /// The API reports the resource as missing.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Any other API failure.
    #[error("{0}")]
    Api(String),

    /// The API returned a target variant this adapter does not know.
    #[error("unrecognized target variant '{0}'")]
    UnknownVariant(String),

    /// The API answered with a target variant other than the expected one.
    #[error("target variant mismatch: expected '{requested}', API returned '{returned}'")]
    VariantMismatch {
        requested: String,
        returned: String,
    },

    /// The import identifier does not match the expected field list.
    #[error("Expected import identifier with format: '{expected}'. Got: {got:?}")]
    ImportFormat {
        /// Comma-joined field names.
        expected: String,
        /// Raw identifier as supplied.
        got: String,
    },
}

impl Error {
    pub fn decode(source_name: &'static str, message: impl fmt::Display) -> Self {
        Self::Decode {
            source_name,
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotConfigured => ErrorCategory::NotConfigured,
            Error::Decode { .. } | Error::Encode(_) => ErrorCategory::Decode,
            Error::NotFound(_) => ErrorCategory::NotFound,
            Error::Api(_) | Error::UnknownVariant(_) | Error::VariantMismatch { .. } => {
                ErrorCategory::Api
            }
            Error::ImportFormat { .. } => ErrorCategory::ImportFormat,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Render this error as a user-visible diagnostic for `kind`.
    pub fn to_diagnostic(&self, kind: &str, operation: Operation) -> Diagnostic {
        match self {
            Error::NotConfigured => Diagnostic::error(
                "Provider not configured",
                "The provider hasn't been configured before apply",
            ),
            Error::Decode { source_name, message } => Diagnostic::error(
                format!("Invalid {source_name} for Resource '{kind}'"),
                format!("Could not decode {source_name} for resource '{kind}': {message}"),
            ),
            Error::Encode(message) => Diagnostic::error(
                format!("Error saving state for Resource '{kind}'"),
                format!("Could not encode state for resource '{kind}': {message}"),
            ),
            Error::ImportFormat { .. } => {
                Diagnostic::error("Unexpected Import Identifier", self.to_string())
            }
            Error::NotFound(_)
            | Error::Api(_)
            | Error::UnknownVariant(_)
            | Error::VariantMismatch { .. } => Diagnostic::error(
                format!("Error {} Resource '{kind}'", operation.verb()),
                format!(
                    "Could not {} resource '{kind}', unexpected error: {self}",
                    operation.infinitive()
                ),
            ),
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(message) => Self::NotFound(message),
            ApiError::Other(message) => Self::Api(message),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}
