//! Error types for the LMS API

use thiserror::Error;

/// Errors that can occur when talking to the LMS API
#[derive(Debug, Error)]
pub enum ApiError {
    /// No session is available to authenticate the request
    #[error("Not signed in. Run `coursepath login <email>` first")]
    NotSignedIn,

    /// The server rejected the bearer token
    #[error("Session expired. Please sign in again")]
    Unauthorized,

    /// Failed to access system keyring
    #[error("Failed to access keyring: {0}")]
    KeyringError(String),

    /// Token does not look like a bearer token issued by the server
    #[error("Invalid token format")]
    InvalidToken,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Reading a file for upload failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Check if this error is recoverable (user can retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            ApiError::RequestError(_) => true,
            ApiError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Check if this error requires re-authentication
    pub fn requires_reauth(&self) -> bool {
        matches!(self, ApiError::NotSignedIn | ApiError::Unauthorized | ApiError::InvalidToken)
    }

    /// Check if the server reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_recoverable() {
        assert!(ApiError::Status { status: 503, message: String::new() }.is_recoverable());
        assert!(!ApiError::Status { status: 400, message: String::new() }.is_recoverable());
    }

    #[test]
    fn unauthorized_requires_reauth() {
        assert!(ApiError::Unauthorized.requires_reauth());
        assert!(ApiError::NotSignedIn.requires_reauth());
        assert!(!ApiError::Status { status: 500, message: String::new() }.requires_reauth());
    }

    #[test]
    fn status_display_includes_message() {
        let err = ApiError::Status { status: 422, message: "title is required".into() };
        assert_eq!(err.to_string(), "API error (422): title is required");
    }
}
