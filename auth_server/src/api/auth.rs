//! Authentication API handlers.
//!
//! Tokens never appear in response bodies; they are set and cleared through
//! cookies (see [`super::cookies`]).
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:3001/api/v1/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "john", "email": "john@x.com", "password": "secret123", "role": "client"}'
//! ```
//!
//! Login, keeping the cookies:
//! ```bash
//! curl -c cookies.txt -X POST http://localhost:3001/api/v1/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "john@x.com", "password": "secret123"}'
//! ```

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use session_auth::auth::{AuthError, LoginRequest, RegisterRequest, UserId};

use super::{AppState, cookies::REFRESH_COOKIE, error::ApiError};
use crate::logging::log_security_event;

/// Body of every successful response that carries no data
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: UserId,
}

/// Create a user account.
///
/// Does not log the user in.
///
/// # Response
///
/// `201 Created`:
/// ```json
/// { "message": "User created successfully", "userId": "7d9f..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: malformed body, invalid email, short password,
///   unknown role, or duplicate name/email
///   (`{"message": "Error creating user", "error": "..."}`)
/// - `500 Internal Server Error`: store or hashing failure
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(request) = payload?;

    match state.auth_manager.register(request).await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            Json(RegisterResponse {
                message: "User created successfully".to_string(),
                user_id: user.id,
            }),
        )),
        Err(e) if e.is_internal() => Err(ApiError::internal("Error creating user", &e)),
        Err(e) => Err(ApiError::new(StatusCode::BAD_REQUEST, "Error creating user")
            .with_error(e.client_message())),
    }
}

/// Verify credentials and start a session.
///
/// # Response
///
/// `200 OK` with `{"message": "Login successful"}` and two cookies:
/// `access_token` and `refreshToken`.
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password, indistinguishable
///   (`{"message": "Invalid credentials"}`)
/// - `500 Internal Server Error`: `{"message": "Server error", "error": "..."}`
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    let Json(request) = payload?;

    match state.auth_manager.login(request).await {
        Ok((_, tokens)) => {
            let jar = jar
                .add(state.cookies.access_cookie(&tokens.access))
                .add(state.cookies.refresh_cookie(&tokens.refresh));
            Ok((jar, MessageResponse::new("Login successful")))
        }
        Err(AuthError::InvalidCredentials) => {
            log_security_event("failed_login", None, "invalid credentials");
            Err(ApiError::new(StatusCode::UNAUTHORIZED, "Invalid credentials"))
        }
        Err(e) => Err(ApiError::internal("Server error", &e)),
    }
}

/// End the session by clearing both cookies.
///
/// Sits behind the access guard. Always succeeds once the guard passes; the
/// tokens themselves stay valid until they expire.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        state.cookies.clear_all(jar),
        MessageResponse::new("Logout successful"),
    )
}

/// Mint a new access token from the `refreshToken` cookie.
///
/// The refresh token is not rotated.
///
/// # Responses
///
/// - `200 OK`: `{"message": "Token refreshed successfully"}` plus a new
///   `access_token` cookie
/// - `401 Unauthorized`: no (or empty) refresh cookie, or the user is missing or
///   cancelled (cookies untouched)
/// - `403 Forbidden`: bad signature or expired; both cookies are cleared
/// - `500 Internal Server Error`: store failure
pub async fn refresh_token(State(state): State<AppState>, jar: CookieJar) -> Response {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty());

    match state.auth_manager.refresh(token.as_deref()).await {
        Ok((_, access)) => (
            jar.add(state.cookies.access_cookie(&access)),
            MessageResponse::new("Token refreshed successfully"),
        )
            .into_response(),
        Err(AuthError::MissingToken) => ApiError::new(
            StatusCode::UNAUTHORIZED,
            "No refresh token provided, authorization denied.",
        )
        .into_response(),
        Err(AuthError::InvalidToken) => {
            log_security_event("rejected_refresh_token", None, "refresh token failed verification");
            (
                state.cookies.clear_all(jar),
                ApiError::new(
                    StatusCode::FORBIDDEN,
                    "Invalid or expired refresh token. Please log in again.",
                ),
            )
                .into_response()
        }
        Err(AuthError::InvalidCredentials) => ApiError::new(
            StatusCode::UNAUTHORIZED,
            "User not found or inactive, authorization denied.",
        )
        .into_response(),
        Err(e) => ApiError::internal("Server error", &e).into_response(),
    }
}
