//! Bearer token storage using system keyring

use keyring::Entry;

use super::error::ApiError;

/// Service name for keyring storage
const SERVICE_NAME: &str = "coursepath";
/// Entry name for the bearer token
const TOKEN_ENTRY: &str = "lms-bearer-token";

/// Manages the LMS bearer token in the system keyring
pub struct TokenVault;

impl TokenVault {
    /// Get the token from system keyring
    pub fn get_token() -> Result<String, ApiError> {
        let entry = Entry::new(SERVICE_NAME, TOKEN_ENTRY)
            .map_err(|e| ApiError::KeyringError(e.to_string()))?;

        entry.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => ApiError::NotSignedIn,
            _ => ApiError::KeyringError(e.to_string()),
        })
    }

    /// Store the token in system keyring
    pub fn set_token(token: &str) -> Result<(), ApiError> {
        if !Self::validate_token_format(token) {
            return Err(ApiError::InvalidToken);
        }

        let entry = Entry::new(SERVICE_NAME, TOKEN_ENTRY)
            .map_err(|e| ApiError::KeyringError(e.to_string()))?;

        entry.set_password(token).map_err(|e| ApiError::KeyringError(e.to_string()))
    }

    /// Delete the stored token
    pub fn delete_token() -> Result<(), ApiError> {
        let entry = Entry::new(SERVICE_NAME, TOKEN_ENTRY)
            .map_err(|e| ApiError::KeyringError(e.to_string()))?;

        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ApiError::KeyringError(e.to_string())),
        }
    }

    /// Validate token format: three non-empty dot-separated segments (JWT)
    pub fn validate_token_format(token: &str) -> bool {
        let segments: Vec<&str> = token.split('.').collect();
        segments.len() == 3 && segments.iter().all(|s| !s.is_empty() && !s.contains(' '))
    }

    /// Mask a token for display (show first 6 and last 4 chars)
    pub fn mask_token(token: &str) -> String {
        if token.len() <= 12 {
            return "*".repeat(token.len());
        }
        let prefix = &token[..6];
        let suffix = &token[token.len() - 4..];
        format!("{}...{}", prefix, suffix)
    }
}
