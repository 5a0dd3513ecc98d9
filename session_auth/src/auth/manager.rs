//! Authentication manager implementation.

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::{
    errors::{AuthError, AuthResult},
    models::{
        AccessTokenClaims, IssuedToken, LoginRequest, NewUser, RegisterRequest, Role,
        SessionTokens, User,
    },
    password::PasswordHasher,
    tokens::TokenService,
};
use crate::db::UserRepository;

/// Hashed once per manager and verified against when the email is unknown,
/// so both login failures pay for one Argon2 verification.
const TIMING_DUMMY_PASSWORD: &str = "timing-equaliser-not-a-real-password";

/// Authentication manager
///
/// Stateless apart from the credential store: every call is a pure function
/// of the stored users, the token secrets and the clock, so one instance can
/// be shared across all request handlers.
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<TokenService>,
    dummy_digest: Arc<str>,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - Credential store
    /// * `hasher` - Password hasher used at registration and login
    /// * `tokens` - Signer/verifier for access and refresh tokens
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: TokenService,
    ) -> Self {
        // A failed hash leaves an empty digest; verify then returns false
        // without running Argon2, which only weakens the timing cover.
        let dummy_digest = hasher.hash(TIMING_DUMMY_PASSWORD).unwrap_or_else(|e| {
            log::error!("Could not prepare dummy password digest: {}", e);
            String::new()
        });

        Self {
            users,
            hasher,
            tokens: Arc::new(tokens),
            dummy_digest: dummy_digest.into(),
        }
    }

    /// Credential store backing this manager
    pub fn users(&self) -> &Arc<dyn UserRepository> {
        &self.users
    }

    /// Register a new user
    ///
    /// The password is hashed once, before the row is written. No tokens are
    /// issued; the caller logs in separately.
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - malformed name, email or password
    /// * `AuthError::InvalidRole` - role outside the enumeration
    /// * `AuthError::NameTaken` / `AuthError::EmailTaken` - duplicate user
    /// * `AuthError::HashingFailed` - hasher failure
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        request
            .validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let role: Role = request.role.parse()?;
        let password_hash = self.hasher.hash(&request.password)?;

        let user = self
            .users
            .create_user(NewUser {
                id: Uuid::new_v4(),
                name: request.name,
                email: request.email,
                password_hash,
                role,
            })
            .await?;

        log::info!("Registered user {} with role {}", user.id, user.role);
        Ok(user)
    }

    /// Login a user
    ///
    /// Account status is not consulted here; a cancelled account is stopped
    /// at the next refresh.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - unknown email or wrong password
    ///   (the two cases are indistinguishable to the caller)
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, SessionTokens)> {
        let Some(user) = self.users.find_by_email(&request.email).await? else {
            // Same hashing work as the wrong-password path.
            let _ = self.hasher.verify(&request.password, &self.dummy_digest);
            log::warn!("SECURITY: login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(&request.password, &user.password_hash) {
            log::warn!("SECURITY: wrong password for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = SessionTokens {
            access: self.tokens.issue_access(user.id, user.role)?,
            refresh: self.tokens.issue_refresh(user.id)?,
        };

        log::info!("User {} logged in", user.id);
        Ok((user, tokens))
    }

    /// Mint a new access token from a refresh token
    ///
    /// The refresh token itself is not rotated.
    ///
    /// # Errors
    ///
    /// * `AuthError::MissingToken` - no refresh token presented, or an empty one
    /// * `AuthError::InvalidToken` - bad signature or expired
    /// * `AuthError::InvalidCredentials` - subject missing or not available
    pub async fn refresh(&self, refresh_token: Option<&str>) -> AuthResult<(User, IssuedToken)> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.tokens.verify_refresh(token).inspect_err(|_| {
            log::warn!("SECURITY: rejected refresh token");
        })?;

        let Some(user) = self.users.find_available_by_id(claims.sub).await? else {
            log::warn!(
                "SECURITY: refresh for missing or cancelled user {}",
                claims.sub
            );
            return Err(AuthError::InvalidCredentials);
        };

        let access = self.tokens.issue_access(user.id, user.role)?;
        log::debug!("Refreshed access token for user {}", user.id);

        Ok((user, access))
    }

    /// Verify an access token
    ///
    /// # Errors
    ///
    /// * `AuthError::MissingToken` - no token presented, or an empty one
    /// * `AuthError::InvalidToken` - bad signature or expired
    pub fn verify_access_token(&self, token: Option<&str>) -> AuthResult<AccessTokenClaims> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        self.tokens.verify_access(token)
    }

    /// Token service used by this manager
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Argon2Hasher, LoginRequest, TokenConfig};
    use crate::db::InMemoryUserRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts verifications so tests can see how much hashing a path does
    struct CountingHasher {
        inner: Argon2Hasher,
        verifications: AtomicUsize,
    }

    impl PasswordHasher for CountingHasher {
        fn hash(&self, plaintext: &str) -> AuthResult<String> {
            self.inner.hash(plaintext)
        }

        fn verify(&self, plaintext: &str, digest: &str) -> bool {
            self.verifications.fetch_add(1, Ordering::SeqCst);
            self.inner.verify(plaintext, digest)
        }
    }

    fn manager_with_counter() -> (AuthManager, Arc<CountingHasher>) {
        let hasher = Arc::new(CountingHasher {
            inner: Argon2Hasher::new(1).unwrap(),
            verifications: AtomicUsize::new(0),
        });
        let manager = AuthManager::new(
            Arc::new(InMemoryUserRepository::new()),
            hasher.clone(),
            TokenService::new(&TokenConfig::new("access_secret", "refresh_secret")),
        );
        (manager, hasher)
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_unknown_email_still_verifies_a_digest() {
        let (manager, hasher) = manager_with_counter();

        let result = manager.login(login("nobody@x.com", "secret123")).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(hasher.verifications.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_both_login_failures_do_equal_hashing_work() {
        let (manager, hasher) = manager_with_counter();
        manager
            .register(RegisterRequest {
                name: "john".to_string(),
                email: "john@x.com".to_string(),
                password: "secret123".to_string(),
                role: "client".to_string(),
            })
            .await
            .unwrap();

        manager.login(login("john@x.com", "wrong-password")).await.unwrap_err();
        let after_wrong_password = hasher.verifications.load(Ordering::SeqCst);
        manager.login(login("nobody@x.com", "wrong-password")).await.unwrap_err();
        let after_unknown_email = hasher.verifications.load(Ordering::SeqCst);

        assert_eq!(after_wrong_password, 1);
        assert_eq!(after_unknown_email - after_wrong_password, 1);
    }

    #[test]
    fn test_dummy_digest_is_a_real_hash() {
        let (manager, hasher) = manager_with_counter();
        assert!(hasher.verify(TIMING_DUMMY_PASSWORD, &manager.dummy_digest));
    }
}
