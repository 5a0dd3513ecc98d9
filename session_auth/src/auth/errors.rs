//! Authentication error types.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Token could not be signed
    #[error("Token encoding failed: {0}")]
    TokenEncoding(jsonwebtoken::errors::Error),

    /// Registration input rejected
    #[error("Validation error: {0}")]
    Validation(String),

    /// Name already exists
    #[error("Validation error: name must be unique")]
    NameTaken,

    /// Email already exists
    #[error("Validation error: email must be unique")]
    EmailTaken,

    /// Role outside the fixed enumeration
    #[error("Validation error: unknown role '{0}'")]
    InvalidRole(String),

    /// Unknown email, wrong password, or unusable account
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No token was presented
    #[error("No token provided")]
    MissingToken,

    /// Bad signature, malformed token, or expired token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Role not permitted for this resource
    #[error("Forbidden")]
    Forbidden,
}

impl AuthError {
    /// Whether the failure is caused by the caller's input rather than the
    /// server.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AuthError::Validation(_)
                | AuthError::NameTaken
                | AuthError::EmailTaken
                | AuthError::InvalidRole(_)
        )
    }

    /// Whether the failure is an unexpected server-side fault.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::Database(_) | AuthError::HashingFailed | AuthError::TokenEncoding(_)
        )
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database, hashing and signing errors are collapsed into a generic
    /// message so the store layout and key material never reach a client.
    pub fn client_message(&self) -> String {
        if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
