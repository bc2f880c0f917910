//! Errors raised while reconciling.

/// Result type alias for reconciliation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building descriptors or reconciling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport, configuration or lookup failure, surfaced verbatim.
    #[error(transparent)]
    Jira(#[from] jirakit::Error),

    /// Two rows of a field mapping write the same remote field.
    #[error("duplicate remote field '{remote}' in field mapping")]
    DuplicateField {
        /// The remote field name that appears twice.
        remote: String,
    },

    /// A desired-state parameter is missing, malformed or conflicting.
    #[error("invalid {kind} parameter '{param}': {reason}")]
    InvalidParameter {
        /// Resource kind being configured.
        kind: String,
        /// Offending parameter.
        param: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The confirmation prompt could not be shown or read.
    #[error("confirmation failed: {0}")]
    Confirm(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid-parameter error.
    pub fn invalid(kind: impl Into<String>, param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            kind: kind.into(),
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// The underlying transport error, if this is one.
    #[must_use]
    pub fn jira(&self) -> Option<&jirakit::Error> {
        match self {
            Self::Jira(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Jira(jirakit::Error::from(err))
    }
}
