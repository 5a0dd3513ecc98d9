//! HTTP API for cookie-session authentication.
//!
//! # Modules
//!
//! - [`auth`]: register, login, logout and token refresh handlers
//! - [`cookies`]: cookie attributes for the access and refresh tokens
//! - [`middleware`]: access guard, role guard and the [`middleware::Claims`]
//!   extractor
//! - [`error`]: JSON error responses
//! - [`request_id`]: request correlation
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                       - Store health (public)
//! POST /api/v1/auth/register         - Register user (public)
//! POST /api/v1/auth/login            - Login, sets cookies (public)
//! POST /api/v1/auth/refresh-token    - New access cookie (refresh cookie)
//! POST /api/v1/auth/logout           - Clear cookies (access cookie)
//! GET  /api/v1/test                  - Liveness probe (public)
//! GET  /api/v1/testauth              - Caller identity (access cookie)
//! GET  /api/v1/testauth/employee     - Employee-only probe (access cookie)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use auth_server::api::{AppState, cookies::CookiePolicy, create_router};
//! use session_auth::auth::{Argon2Hasher, AuthManager, TokenConfig, TokenService};
//! use session_auth::db::InMemoryUserRepository;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let auth_manager = AuthManager::new(
//!     Arc::new(InMemoryUserRepository::new()),
//!     Arc::new(Argon2Hasher::default()),
//!     TokenService::new(&TokenConfig::new("access_secret", "refresh_secret")),
//! );
//! let state = AppState {
//!     auth_manager: Arc::new(auth_manager),
//!     cookies: CookiePolicy::default(),
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod auth;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod request_id;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use session_auth::auth::{AuthManager, Role};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer};

use cookies::CookiePolicy;
use middleware::{Claims, RoleGuard, access_guard, role_guard};

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub cookies: CookiePolicy,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_v1_router(state.clone()))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh-token", post(auth::refresh_token))
        .route("/test", get(probe));

    // Layers run outside-in: the access guard attaches claims before the
    // role guard reads them.
    let employee_routes = Router::new()
        .route("/testauth/employee", get(employee_probe))
        .layer(axum::middleware::from_fn_with_state(
            RoleGuard::new([Role::Employee]),
            role_guard,
        ));

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/testauth", get(auth_probe))
        .merge(employee_routes)
        .layer(axum::middleware::from_fn_with_state(state, access_guard));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` if the credential store answers, `503 Service Unavailable`
/// otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = state.auth_manager.users().health_check().await.is_ok();

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": store_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}

async fn probe() -> &'static str {
    "ok"
}

async fn auth_probe(Claims(claims): Claims) -> impl IntoResponse {
    Json(json!({
        "message": "Authenticated",
        "sub": claims.sub,
        "role": claims.role,
    }))
}

async fn employee_probe(Claims(claims): Claims) -> impl IntoResponse {
    Json(json!({
        "message": "Employee access granted",
        "sub": claims.sub,
    }))
}
