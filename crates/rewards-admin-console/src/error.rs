//! Error types for the admin console

use rewards_admin_client::ApiError;
use thiserror::Error;

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Errors surfaced by console state machines and the CLI
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Normalized API failure
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Operator input failed a local check; no request was sent
    #[error("{field}: {message}")]
    Validation {
        /// Offending field
        field: String,
        /// Human-readable reason
        message: String,
    },

    /// A dialog was driven through an invalid transition
    #[error("Invalid dialog transition: {message}")]
    InvalidTransition {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] rewards_admin_core::Error),

    /// A delete was not confirmed the way the target requires
    #[error("Confirmation required: {message}")]
    ConfirmationRequired {
        /// What the operator still has to provide
        message: String,
    },

    /// Output could not be rendered
    #[error("Failed to render output: {message}")]
    Output {
        /// Error message
        message: String,
    },
}

impl ConsoleError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid transition error
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::InvalidTransition {
            message: message.into(),
        }
    }

    /// Create a confirmation error
    pub fn confirmation_required(message: impl Into<String>) -> Self {
        Self::ConfirmationRequired {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// The API error, when this failure came from the server
    #[must_use]
    pub const fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        Self::output(err.to_string())
    }
}

impl From<toml::ser::Error> for ConsoleError {
    fn from(err: toml::ser::Error) -> Self {
        Self::output(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validation_display() {
        let err = ConsoleError::validation("reason", "must be at least 10 characters");

        assert_eq!(err.to_string(), "reason: must be at least 10 characters");
        assert!(err.as_api().is_none());
    }

    #[test]
    fn test_api_error_is_transparent() {
        let err = ConsoleError::from(ApiError::NotFound {
            message: "No such creator".to_string(),
        });

        assert_eq!(err.to_string(), "Resource not found: No such creator");
        assert!(err.as_api().is_some());
    }
}
