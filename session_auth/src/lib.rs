//! # Session Auth
//!
//! User registration, credential verification and session continuity through
//! short-lived access tokens and long-lived refresh tokens.
//!
//! ## Core Modules
//!
//! - [`auth`]: password hashing, token service and the [`AuthManager`] that
//!   drives register, login and refresh
//! - [`db`]: connection pool, migrations and the [`db::UserRepository`]
//!   credential store with PostgreSQL and in-memory implementations
//!
//! HTTP concerns (cookies, guards, routing) live in the server crate; this
//! crate only deals in users, claims and signed tokens.

/// Registration, login, token issuance and verification.
pub mod auth;
pub use auth::{AuthError, AuthManager, AuthResult};

/// Credential store and database plumbing.
pub mod db;
