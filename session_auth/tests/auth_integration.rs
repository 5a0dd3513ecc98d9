//! Integration tests for the authentication flow.
//!
//! Tests registration, login, and access-token refresh against the in-memory
//! credential store.

use chrono::Utc;
use session_auth::auth::{
    AuthError, AuthManager, Argon2Hasher, LoginRequest, RegisterRequest, Role, TokenConfig,
    TokenService, UserStatus,
};
use session_auth::db::{InMemoryUserRepository, UserRepository};
use std::sync::Arc;
use uuid::Uuid;

const ACCESS_SECRET: &str = "test_access_secret_for_jwt_0123456789";
const REFRESH_SECRET: &str = "test_refresh_secret_for_jwt_0123456789";

/// Helper to create test auth manager with its store
fn setup_auth_manager() -> (AuthManager, Arc<InMemoryUserRepository>) {
    let users = Arc::new(InMemoryUserRepository::new());
    let auth = AuthManager::new(
        users.clone(),
        Arc::new(Argon2Hasher::new(1).expect("valid cost")),
        TokenService::new(&TokenConfig::new(ACCESS_SECRET, REFRESH_SECRET)),
    );
    (auth, users)
}

fn register_request(name: &str, email: &str, password: &str, role: &str) -> RegisterRequest {
    RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role: role.to_string(),
    }
}

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_register_then_login_round_trip() {
    let (auth, users) = setup_auth_manager();

    let user = auth
        .register(register_request("john", "john@x.com", "secret123", "client"))
        .await
        .expect("Registration should succeed");
    assert_eq!(user.role, Role::Client);
    assert_eq!(user.status, UserStatus::Available);

    let stored = users.find_by_id(user.id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "secret123", "Password must be hashed");

    let (logged_in, tokens) = auth
        .login(login_request("john@x.com", "secret123"))
        .await
        .expect("Login should succeed");
    assert_eq!(logged_in.id, user.id);
    assert!(!tokens.access.token.is_empty());
    assert!(!tokens.refresh.token.is_empty());
    assert!(tokens.refresh.expires_at > tokens.access.expires_at);

    let claims = auth
        .verify_access_token(Some(&tokens.access.token))
        .expect("Fresh access token should verify");
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.role, Role::Client);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (auth, _) = setup_auth_manager();
    auth.register(register_request("john", "john@x.com", "secret123", "client"))
        .await
        .expect("First registration should succeed");

    let result = auth
        .register(register_request("johnny", "john@x.com", "secret456", "client"))
        .await;

    assert!(
        matches!(result, Err(AuthError::EmailTaken)),
        "Should return EmailTaken error"
    );
}

#[tokio::test]
async fn test_register_duplicate_name() {
    let (auth, _) = setup_auth_manager();
    auth.register(register_request("john", "john@x.com", "secret123", "client"))
        .await
        .expect("First registration should succeed");

    let result = auth
        .register(register_request("john", "other@x.com", "secret456", "employee"))
        .await;

    assert!(
        matches!(result, Err(AuthError::NameTaken)),
        "Should return NameTaken error"
    );
}

#[tokio::test]
async fn test_register_distinct_users() {
    let (auth, users) = setup_auth_manager();

    auth.register(register_request("john", "john@x.com", "secret123", "client"))
        .await
        .unwrap();
    auth.register(register_request("jane", "jane@x.com", "secret123", "employee"))
        .await
        .unwrap();

    assert_eq!(users.len().await, 2);
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let (auth, users) = setup_auth_manager();

    let bad_email = auth
        .register(register_request("john", "not-an-email", "secret123", "client"))
        .await;
    assert!(matches!(bad_email, Err(AuthError::Validation(ref m)) if m.contains("email")));

    let bad_role = auth
        .register(register_request("john", "john@x.com", "secret123", "admin"))
        .await;
    assert!(matches!(bad_role, Err(AuthError::InvalidRole(_))));

    assert!(users.is_empty().await, "Nothing should be stored");
}

#[tokio::test]
async fn test_login_failures_share_one_error() {
    let (auth, _) = setup_auth_manager();
    auth.register(register_request("john", "john@x.com", "secret123", "client"))
        .await
        .unwrap();

    let wrong_password = auth
        .login(login_request("john@x.com", "wrong-password"))
        .await
        .unwrap_err();
    let unknown_email = auth
        .login(login_request("nobody@x.com", "secret123"))
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_refresh_without_token() {
    let (auth, _) = setup_auth_manager();
    assert!(matches!(
        auth.refresh(None).await,
        Err(AuthError::MissingToken)
    ));
    assert!(matches!(
        auth.refresh(Some("")).await,
        Err(AuthError::MissingToken)
    ));
}

#[tokio::test]
async fn test_refresh_with_tampered_or_expired_token() {
    let (auth, _) = setup_auth_manager();
    let user = auth
        .register(register_request("john", "john@x.com", "secret123", "client"))
        .await
        .unwrap();

    assert!(matches!(
        auth.refresh(Some("not.a.token")).await,
        Err(AuthError::InvalidToken)
    ));

    let expired = auth
        .tokens()
        .issue_refresh_at(user.id, Utc::now() - chrono::Duration::days(8))
        .unwrap();
    assert!(matches!(
        auth.refresh(Some(&expired.token)).await,
        Err(AuthError::InvalidToken)
    ));

    // An access token is signed with the other secret.
    let access = auth.tokens().issue_access(user.id, user.role).unwrap();
    assert!(matches!(
        auth.refresh(Some(&access.token)).await,
        Err(AuthError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_refresh_for_cancelled_user() {
    let (auth, users) = setup_auth_manager();
    auth.register(register_request("john", "john@x.com", "secret123", "client"))
        .await
        .unwrap();
    let (user, tokens) = auth
        .login(login_request("john@x.com", "secret123"))
        .await
        .unwrap();

    users.deactivate_user(user.id).await.unwrap();

    assert!(matches!(
        auth.refresh(Some(&tokens.refresh.token)).await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_refresh_for_unknown_subject() {
    let (auth, _) = setup_auth_manager();
    let orphan = auth.tokens().issue_refresh(Uuid::new_v4()).unwrap();

    assert!(matches!(
        auth.refresh(Some(&orphan.token)).await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_refresh_issues_new_access_token() {
    let (auth, _) = setup_auth_manager();
    auth.register(register_request("jane", "jane@x.com", "secret123", "employee"))
        .await
        .unwrap();
    let (user, tokens) = auth
        .login(login_request("jane@x.com", "secret123"))
        .await
        .unwrap();

    let (refreshed_user, access) = auth
        .refresh(Some(&tokens.refresh.token))
        .await
        .expect("Refresh should succeed");

    assert_eq!(refreshed_user.id, user.id);
    let claims = auth.verify_access_token(Some(&access.token)).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.role, Role::Employee);

    // The refresh token is not rotated and keeps working.
    assert!(auth.refresh(Some(&tokens.refresh.token)).await.is_ok());
}

#[tokio::test]
async fn test_login_does_not_check_status() {
    let (auth, users) = setup_auth_manager();
    let user = auth
        .register(register_request("john", "john@x.com", "secret123", "client"))
        .await
        .unwrap();
    users.deactivate_user(user.id).await.unwrap();

    let (_, tokens) = auth
        .login(login_request("john@x.com", "secret123"))
        .await
        .expect("Login only checks credentials");

    assert!(matches!(
        auth.refresh(Some(&tokens.refresh.token)).await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_verify_access_token_requires_token() {
    let (auth, _) = setup_auth_manager();
    assert!(matches!(
        auth.verify_access_token(None),
        Err(AuthError::MissingToken)
    ));
    assert!(matches!(
        auth.verify_access_token(Some("")),
        Err(AuthError::MissingToken)
    ));
    assert!(matches!(
        auth.verify_access_token(Some("garbage")),
        Err(AuthError::InvalidToken)
    ));
}
