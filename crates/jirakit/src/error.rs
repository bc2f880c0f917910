//! Error types for Jira operations.
//!
//! Errors are categorized so callers can pick appropriate user feedback.
//! A missing remote resource is not an error: lookups report it as
//! [`Fetched::Absent`](crate::Fetched::Absent) instead.

use std::fmt;

/// Result type alias for Jira operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of Jira errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection settings are missing or invalid.
    Configuration,
    /// A name lookup required by the operation found nothing.
    NotFound,
    /// The server rejected the request or could not be reached.
    Http,
    /// The server answered with something we could not interpret.
    Format,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Invalid connection configuration",
            Self::NotFound => "Referenced resource not found",
            Self::Http => "Jira request failed",
            Self::Format => "Unexpected response from Jira",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Configuration => {
                "Set --url/--username/--password, the [connection] table, or JIRA_URL/JIRA_USERNAME/JIRA_PASSWORD"
            }
            Self::NotFound => "Check that the referenced name exists in Jira",
            Self::Http => "Check the error details, credentials and network access",
            Self::Format => "Verify the URL points at a Jira server REST root",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to Jira.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A connection parameter is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A lookup by human-readable name produced no match.
    #[error("Unable to find Jira {kind} {name}")]
    NotFound {
        /// Resource kind that was looked up (e.g. "role").
        kind: String,
        /// Name that failed to resolve.
        name: String,
    },

    /// Non-success HTTP status or transport failure.
    ///
    /// The message already aggregates the transport message and any
    /// `errorMessages`/`errors` reported by Jira.
    #[error("{message}")]
    Http {
        /// HTTP status code if the server answered.
        status: Option<u16>,
        /// Aggregated error message.
        message: String,
    },

    /// Invalid response from the API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// Create a not-found error for a failed name lookup.
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Configuration(_) => ErrorCategory::Configuration,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Http { .. } => ErrorCategory::Http,
            Error::InvalidResponse(_) => ErrorCategory::Format,
        }
    }

    /// HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::http(format!("HTTP Error {code}"), Some(code)),
            other => Self::http(other.to_string(), None),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
