//! Normalized API error taxonomy
//!
//! Transport failures and HTTP status codes are folded into [`ApiError`] once,
//! inside the client. Callers branch on [`ApiError::kind`] and never on raw
//! status codes.

use serde_json::Value;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Message fragments that mark a 401 as a server-side misconfiguration
/// rather than a missing or expired session
const MISCONFIGURATION_MARKERS: [&str; 3] = ["misconfigur", "server configuration", "secret key"];

/// Errors returned by the admin API client
#[derive(Error, Debug)]
pub enum ApiError {
    /// 401: no session, or the session was rejected
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Server message
        message: String,
        /// The server blamed its own configuration, not the session
        server_misconfigured: bool,
    },

    /// 403: signed in without the required role
    #[error("Access forbidden: {message}")]
    Forbidden {
        /// Server message
        message: String,
    },

    /// 404
    #[error("Resource not found: {message}")]
    NotFound {
        /// Server message
        message: String,
    },

    /// The request conflicts with dependent records
    #[error("{message}")]
    Conflict {
        /// Server message
        message: String,
        /// Number of dependent records blocking the operation, when reported
        dependent_count: Option<u64>,
    },

    /// Server-side validation rejected the payload
    #[error("Validation failed: {message}")]
    Validation {
        /// Server message
        message: String,
    },

    /// 5xx
    #[error("Server error ({status}): {message}")]
    ServerError {
        /// HTTP status
        status: u16,
        /// Server message
        message: String,
    },

    /// Any other non-success status
    #[error("Request failed ({status}): {message}")]
    Http {
        /// HTTP status
        status: u16,
        /// Server message
        message: String,
    },

    /// No response was received
    #[error("Network error: {message}")]
    Network {
        /// Transport error description
        message: String,
    },

    /// A response was received but its body could not be decoded
    #[error("Failed to decode response: {message}")]
    Decode {
        /// Decoder error description
        message: String,
    },

    /// The client itself could not be constructed
    #[error("Invalid client configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

/// Coarse error classes that page-level code reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No or invalid session; the operator must sign in
    Unauthenticated,
    /// Signed in with the wrong role
    Unauthorized,
    /// Missing record
    NotFound,
    /// Operator-correctable conflict, shown inline
    Conflict,
    /// Payload rejected, shown inline
    Validation,
    /// Server, network or decoding failure; shown as a dismissible notification
    Transient,
}

impl ApiError {
    /// Build the normalized error for a non-success response
    #[must_use]
    pub fn from_response(status: u16, reason: Option<&str>, body: &Value) -> Self {
        let message = server_message(body)
            .or(reason)
            .unwrap_or("Request failed")
            .to_string();
        let dependent_count = body.get("businessCount").and_then(Value::as_u64);

        match status {
            401 => Self::Unauthorized {
                server_misconfigured: is_misconfiguration(&message),
                message,
            },
            403 => Self::Forbidden { message },
            404 => Self::NotFound { message },
            409 => Self::Conflict {
                message,
                dependent_count,
            },
            400 if dependent_count.is_some() => Self::Conflict {
                message,
                dependent_count,
            },
            400 | 422 => Self::Validation { message },
            500..=599 => Self::ServerError { status, message },
            _ => Self::Http { status, message },
        }
    }

    /// Coarse class of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthenticated,
            Self::Forbidden { .. } => ErrorKind::Unauthorized,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::ServerError { .. }
            | Self::Http { .. }
            | Self::Network { .. }
            | Self::Decode { .. }
            | Self::Configuration { .. } => ErrorKind::Transient,
        }
    }

    /// HTTP status, when the error came from a response
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::ServerError { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::Conflict { .. }
            | Self::Validation { .. }
            | Self::Network { .. }
            | Self::Decode { .. }
            | Self::Configuration { .. } => None,
        }
    }

    /// Message suitable for a notification or inline display
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized { message, .. }
            | Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::Conflict { message, .. }
            | Self::Validation { message }
            | Self::ServerError { message, .. }
            | Self::Http { message, .. }
            | Self::Network { message }
            | Self::Decode { message }
            | Self::Configuration { message } => message,
        }
    }

    /// Dependent record count carried by a conflict
    #[must_use]
    pub const fn dependent_count(&self) -> Option<u64> {
        match self {
            Self::Conflict {
                dependent_count, ..
            } => *dependent_count,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
            }
        } else if err.is_builder() {
            Self::Configuration {
                message: err.to_string(),
            }
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }
}

/// Extract the server-reported message from an error body
fn server_message(body: &Value) -> Option<&str> {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
}

fn is_misconfiguration(message: &str) -> bool {
    let lower = message.to_lowercase();
    MISCONFIGURATION_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}
