//! Signed access and refresh tokens.
//!
//! The two token classes use independent HMAC secrets and lifetimes, so a
//! token of one class never verifies as the other.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Serialize, de::DeserializeOwned};

use super::{
    errors::{AuthError, AuthResult},
    models::{AccessTokenClaims, IssuedToken, RefreshTokenClaims, Role, UserId},
};

/// Default access token lifetime
pub const DEFAULT_ACCESS_TTL: Duration = Duration::minutes(15);

/// Default refresh token lifetime
pub const DEFAULT_REFRESH_TTL: Duration = Duration::days(7);

/// Secrets and lifetimes for both token classes
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    /// Config with the default lifetimes.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Keys {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

/// Issues and verifies access and refresh tokens
pub struct TokenService {
    access: Keys,
    refresh: Keys,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            access: Keys::new(&config.access_secret, config.access_ttl),
            refresh: Keys::new(&config.refresh_secret, config.refresh_ttl),
            validation,
        }
    }

    /// Sign an access token for `subject` carrying its role.
    pub fn issue_access(&self, subject: UserId, role: Role) -> AuthResult<IssuedToken> {
        self.issue_access_at(subject, role, Utc::now())
    }

    /// Sign a refresh token for `subject`.
    pub fn issue_refresh(&self, subject: UserId) -> AuthResult<IssuedToken> {
        self.issue_refresh_at(subject, Utc::now())
    }

    /// Sign an access token as if issued at `issued_at`.
    pub fn issue_access_at(
        &self,
        subject: UserId,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> AuthResult<IssuedToken> {
        let expires_at = issued_at + self.access.ttl;
        let claims = AccessTokenClaims {
            sub: subject,
            role,
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        };

        sign(&claims, &self.access.encoding, expires_at)
    }

    /// Sign a refresh token as if issued at `issued_at`.
    pub fn issue_refresh_at(
        &self,
        subject: UserId,
        issued_at: DateTime<Utc>,
    ) -> AuthResult<IssuedToken> {
        let expires_at = issued_at + self.refresh.ttl;
        let claims = RefreshTokenClaims {
            sub: subject,
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        };

        sign(&claims, &self.refresh.encoding, expires_at)
    }

    /// Verify an access token
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` - bad signature, malformed, or expired
    pub fn verify_access(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        self.verify(token, &self.access.decoding)
    }

    /// Verify a refresh token
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` - bad signature, malformed, or expired
    pub fn verify_refresh(&self, token: &str) -> AuthResult<RefreshTokenClaims> {
        self.verify(token, &self.refresh.decoding)
    }

    fn verify<T: DeserializeOwned>(&self, token: &str, key: &DecodingKey) -> AuthResult<T> {
        decode::<T>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })
    }
}

fn sign<T: Serialize>(
    claims: &T,
    key: &EncodingKey,
    expires_at: DateTime<Utc>,
) -> AuthResult<IssuedToken> {
    let token = encode(&Header::default(), claims, key).map_err(AuthError::TokenEncoding)?;
    Ok(IssuedToken { token, expires_at })
}
