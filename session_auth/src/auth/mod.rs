//! Authentication module providing user registration, login, and session
//! continuity.
//!
//! This module implements:
//! - Argon2id password hashing with a per-user salt
//! - JWT access tokens (15-minute default expiry)
//! - JWT refresh tokens (7-day default expiry, separate secret, not rotated)
//!
//! ## Example
//!
//! ```no_run
//! use session_auth::auth::{
//!     Argon2Hasher, AuthManager, LoginRequest, RegisterRequest, TokenConfig, TokenService,
//! };
//! use session_auth::db::InMemoryUserRepository;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthManager::new(
//!         Arc::new(InMemoryUserRepository::new()),
//!         Arc::new(Argon2Hasher::default()),
//!         TokenService::new(&TokenConfig::new("access_secret", "refresh_secret")),
//!     );
//!
//!     let user = auth
//!         .register(RegisterRequest {
//!             name: "john".to_string(),
//!             email: "john@x.com".to_string(),
//!             password: "secret123".to_string(),
//!             role: "client".to_string(),
//!         })
//!         .await?;
//!
//!     let (_, tokens) = auth
//!         .login(LoginRequest {
//!             email: "john@x.com".to_string(),
//!             password: "secret123".to_string(),
//!         })
//!         .await?;
//!     println!("{} expires at {}", user.id, tokens.access.expires_at);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod password;
pub mod tokens;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{
    AccessTokenClaims, IssuedToken, LoginRequest, NewUser, RefreshTokenClaims, RegisterRequest,
    Role, SessionTokens, User, UserId, UserStatus,
};
pub use password::{Argon2Hasher, DEFAULT_HASH_COST, PasswordHasher};
pub use tokens::{DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL, TokenConfig, TokenService};
