//! JSON error responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use session_auth::AuthError;

pub const NO_TOKEN_MESSAGE: &str = "No token, authorization denied";
pub const INVALID_TOKEN_MESSAGE: &str = "Token is not valid";
pub const FORBIDDEN_MESSAGE: &str =
    "Forbidden: You do not have permission to perform this action";

/// Error body returned by every endpoint: `{message}` or `{message, error}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A failed request, rendered as JSON with its status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error: None,
        }
    }

    /// Attach a detail string under `error`.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Server-side fault; the detail is sanitised before it reaches the body.
    pub fn internal(message: impl Into<String>, err: &AuthError) -> Self {
        let message = message.into();
        tracing::error!(error = %err, "{}", message);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message).with_error(err.client_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
            error: self.error,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Guard-level mapping. Handlers with endpoint-specific wording build their
/// `ApiError` directly.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::new(StatusCode::UNAUTHORIZED, NO_TOKEN_MESSAGE),
            AuthError::InvalidToken => {
                ApiError::new(StatusCode::UNAUTHORIZED, INVALID_TOKEN_MESSAGE)
            }
            AuthError::Forbidden => ApiError::new(StatusCode::FORBIDDEN, FORBIDDEN_MESSAGE),
            AuthError::InvalidCredentials => {
                ApiError::new(StatusCode::UNAUTHORIZED, "Invalid credentials")
            }
            e if e.is_validation() => {
                ApiError::new(StatusCode::BAD_REQUEST, e.client_message())
            }
            e => ApiError::internal("Server error", &e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, "Invalid request body")
            .with_error(rejection.body_text())
    }
}
