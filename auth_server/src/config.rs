//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration. Loaded once at startup and passed down; nothing reads the
//! environment after that.

use std::net::SocketAddr;

use chrono::Duration;
use session_auth::auth::{DEFAULT_ACCESS_TTL, DEFAULT_HASH_COST, DEFAULT_REFRESH_TTL, TokenConfig};
use session_auth::db::DatabaseConfig;

/// Default port when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_PORT: u16 = 3001;

/// Minimum length accepted for either signing secret
pub const MIN_SECRET_LEN: usize = 32;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Cookie configuration
    pub cookies: CookieConfig,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Access token signing secret (required)
    pub jwt_secret: String,
    /// Refresh token signing secret (required, distinct)
    pub jwt_secret_refresh: String,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
    /// Argon2 iteration count
    pub hash_cost: u32,
}

impl SecurityConfig {
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            access_secret: self.jwt_secret.clone(),
            refresh_secret: self.jwt_secret_refresh.clone(),
            access_ttl: self.access_ttl,
            refresh_ttl: self.refresh_ttl,
        }
    }
}

/// Cookie attributes
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Development mode drops the `Secure` attribute so cookies work over
    /// plain HTTP
    pub dev_mode: bool,
    /// `Max-Age` of the access token cookie
    pub access_max_age: Duration,
    /// `Max-Age` of the refresh token cookie
    pub refresh_max_age: Duration,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            access_max_age: Duration::minutes(60),
            refresh_max_age: Duration::days(7),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => match std::env::var("SERVER_BIND") {
                Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{raw}' is not a socket address"),
                })?,
                Err(_) => SocketAddr::from(([0, 0, 0, 0], parse_env_or("APP_PORT", DEFAULT_PORT))),
            },
        };

        let defaults = DatabaseConfig::development();
        let database = DatabaseConfig {
            database_url: database_url_override.or_else(|| std::env::var("DATABASE_URL").ok()),
            host: std::env::var("DB_HOST").unwrap_or(defaults.host),
            port: parse_env_or("DB_PORT", defaults.port),
            database: std::env::var("DB_NAME").unwrap_or(defaults.database),
            username: std::env::var("DB_USER").unwrap_or(defaults.username),
            password: std::env::var("DB_PASSWORD").ok(),
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", defaults.min_connections),
            connection_timeout_secs: parse_env_or(
                "DB_CONNECTION_TIMEOUT_SECS",
                defaults.connection_timeout_secs,
            ),
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs),
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs),
        };

        // Security configuration (REQUIRED)
        let jwt_secret = required("JWT_SECRET", "Generate with: openssl rand -hex 32")?;
        let jwt_secret_refresh =
            required("JWT_SECRET_REFRESH", "Generate with: openssl rand -hex 32")?;

        let security = SecurityConfig {
            jwt_secret,
            jwt_secret_refresh,
            access_ttl: duration_env_or("JWT_EXPIRATE_TIME_ACCESS", DEFAULT_ACCESS_TTL)?,
            refresh_ttl: duration_env_or("JWT_EXPIRE_REFRESH_TIME", DEFAULT_REFRESH_TTL)?,
            hash_cost: parse_env_or("PASSWORD_HASH_COST", DEFAULT_HASH_COST),
        };

        let cookie_defaults = CookieConfig::default();
        let cookies = CookieConfig {
            dev_mode: std::env::var("APP_MODE").is_ok_and(|mode| mode == "dev"),
            access_max_age: duration_env_or("ACCESS_COOKIE_MAX_AGE", cookie_defaults.access_max_age)?,
            refresh_max_age: duration_env_or(
                "REFRESH_COOKIE_MAX_AGE",
                cookie_defaults.refresh_max_age,
            )?,
        };

        Ok(ServerConfig {
            bind,
            database,
            security,
            cookies,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let security = &self.security;

        for (var, secret) in [
            ("JWT_SECRET", &security.jwt_secret),
            ("JWT_SECRET_REFRESH", &security.jwt_secret_refresh),
        ] {
            if secret.len() < MIN_SECRET_LEN {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: format!("Must be at least {MIN_SECRET_LEN} characters"),
                });
            }
        }

        if security.jwt_secret == security.jwt_secret_refresh {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET_REFRESH".to_string(),
                reason: "Must differ from JWT_SECRET".to_string(),
            });
        }

        for (var, ttl) in [
            ("JWT_EXPIRATE_TIME_ACCESS", security.access_ttl),
            ("JWT_EXPIRE_REFRESH_TIME", security.refresh_ttl),
            ("ACCESS_COOKIE_MAX_AGE", self.cookies.access_max_age),
            ("REFRESH_COOKIE_MAX_AGE", self.cookies.refresh_max_age),
        ] {
            if ttl <= Duration::zero() {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
        }

        if security.access_ttl >= security.refresh_ttl {
            return Err(ConfigError::Invalid {
                var: "JWT_EXPIRATE_TIME_ACCESS".to_string(),
                reason: "Must be shorter than the refresh token lifetime".to_string(),
            });
        }

        if !(1..=10).contains(&security.hash_cost) {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_HASH_COST".to_string(),
                reason: "Must be between 1 and 10".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn required(var: &str, hint: &str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingRequired {
        var: var.to_string(),
        hint: hint.to_string(),
    })
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn duration_env_or(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => parse_duration(&raw).ok_or_else(|| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("'{raw}' is not a duration like 15m, 12h or 7d"),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse `<n>[s|m|h|d]`; a bare number is seconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: i64 = digits.parse().ok()?;

    match unit.trim() {
        "" | "s" => Duration::try_seconds(value),
        "m" => Duration::try_minutes(value),
        "h" => Duration::try_hours(value),
        "d" => Duration::try_days(value),
        _ => None,
    }
}
