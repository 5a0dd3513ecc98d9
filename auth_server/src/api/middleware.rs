//! Access and role guards for protected endpoints.
//!
//! [`access_guard`] reads the `access_token` cookie, verifies it and stores
//! the decoded [`AccessTokenClaims`] in request extensions. [`role_guard`]
//! runs after it and admits only the roles configured in its [`RoleGuard`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get, middleware};
//! # use auth_server::api::middleware::{access_guard, role_guard, RoleGuard};
//! # use auth_server::api::AppState;
//! # use session_auth::auth::Role;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let employee_only: Router<AppState> = Router::new()
//!     .route("/reports", get(handler))
//!     .layer(middleware::from_fn_with_state(RoleGuard::new([Role::Employee]), role_guard))
//!     .layer(middleware::from_fn_with_state(state.clone(), access_guard));
//! # let _ = employee_only;
//! ```
//!
//! Handlers behind the guard read the caller with the [`Claims`] extractor.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use session_auth::auth::{AccessTokenClaims, AuthError, Role};

use super::{AppState, cookies::ACCESS_COOKIE, error::ApiError};
use crate::logging::log_security_event;

/// Authentication middleware that validates the access token cookie.
///
/// # Behavior
///
/// - **Missing or empty cookie**: `401 {"message": "No token, authorization denied"}`
/// - **Invalid/expired token**: `401 {"message": "Token is not valid"}`
/// - **Success**: injects [`AccessTokenClaims`] into request extensions and
///   calls the next handler
pub async fn access_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(ACCESS_COOKIE)
        .map(|c| c.value())
        .filter(|v| !v.is_empty());

    match state.auth_manager.verify_access_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            let event = match e {
                AuthError::MissingToken => "missing_access_token",
                _ => "rejected_access_token",
            };
            log_security_event(event, None, "access token missing or failed verification");
            Err(e.into())
        }
    }
}

/// Set of roles admitted by [`role_guard`]
#[derive(Debug, Clone)]
pub struct RoleGuard {
    allowed: Arc<[Role]>,
}

impl RoleGuard {
    pub fn new(allowed: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }
}

/// Role middleware; must be layered inside [`access_guard`].
///
/// Requests without claims, or whose role is not permitted, get
/// `403 {"message": "Forbidden: ..."}`.
pub async fn role_guard(
    State(guard): State<RoleGuard>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = request
        .extensions()
        .get::<AccessTokenClaims>()
        .map(|claims| (claims.sub, guard.permits(claims.role)));

    match caller {
        Some((_, true)) => Ok(next.run(request).await),
        _ => {
            log_security_event(
                "role_denied",
                caller.map(|(sub, _)| sub),
                "role not permitted for this resource",
            );
            Err(AuthError::Forbidden.into())
        }
    }
}

/// Extractor for the claims attached by [`access_guard`]
#[derive(Debug, Clone)]
pub struct Claims(pub AccessTokenClaims);

impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AccessTokenClaims>()
            .cloned()
            .map(Claims)
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}
