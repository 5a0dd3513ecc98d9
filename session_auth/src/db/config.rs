//! Database configuration module.
//!
//! Provides configuration structures for database connection management.

use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; takes precedence over the individual parts
    pub database_url: Option<String>,

    /// Database host
    pub host: String,

    /// Database port
    pub port: u16,

    /// Database name
    pub database: String,

    /// Login role
    pub username: String,

    /// Login password
    pub password: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Create a default configuration for development
    ///
    /// Connects to `postgres@localhost:5432/auth_db`.
    pub fn development() -> Self {
        Self {
            database_url: None,
            host: "localhost".to_string(),
            port: 5432,
            database: "auth_db".to_string(),
            username: "postgres".to_string(),
            password: None,
            max_connections: 20,
            min_connections: 5,
            connection_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }

    /// Build connect options from the URL, or from the parts when no URL is
    /// set. Building from parts avoids escaping passwords into a URL.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error::Configuration` if the URL does not parse
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = self.database_url.as_deref() {
            return PgConnectOptions::from_str(url);
        }

        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username);

        Ok(match self.password.as_deref() {
            Some(password) => options.password(password),
            None => options,
        })
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::development()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_parts() {
        let config = DatabaseConfig {
            host: "db.internal".to_string(),
            port: 6543,
            database: "users".to_string(),
            username: "svc".to_string(),
            password: Some("p@ss/word".to_string()),
            ..DatabaseConfig::development()
        };

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("users"));
        assert_eq!(options.get_username(), "svc");
    }

    #[test]
    fn test_url_takes_precedence() {
        let config = DatabaseConfig {
            database_url: Some("postgres://alice@dbhost:5433/app".to_string()),
            ..DatabaseConfig::development()
        };

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "dbhost");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_username(), "alice");
    }

    #[test]
    fn test_bad_url_is_an_error() {
        let config = DatabaseConfig {
            database_url: Some("not a url".to_string()),
            ..DatabaseConfig::development()
        };
        assert!(config.connect_options().is_err());
    }
}
