//! Cookie-session authentication server.
//!
//! Connects to PostgreSQL, applies migrations and serves the auth API until
//! Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use auth_server::{
    api::{AppState, cookies::CookiePolicy, create_router},
    config::ServerConfig,
    logging,
};
use pico_args::Arguments;
use session_auth::{
    auth::{Argon2Hasher, AuthManager, TokenService},
    db::{Database, PgUserRepository},
};
use tracing::info;

const HELP: &str = "\
Run the cookie-session authentication server

USAGE:
  auth_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 0.0.0.0:$APP_PORT]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or DB_* parts]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:3001)
  APP_PORT                 Port bound on 0.0.0.0 when SERVER_BIND is unset [default: 3001]
  DATABASE_URL             PostgreSQL connection string
  DB_HOST, DB_PORT, DB_NAME, DB_USER, DB_PASSWORD
                           Connection parts used when DATABASE_URL is unset
  JWT_SECRET               Access token signing secret (required, >= 32 chars)
  JWT_SECRET_REFRESH       Refresh token signing secret (required, >= 32 chars)
  JWT_EXPIRATE_TIME_ACCESS Access token lifetime [default: 15m]
  JWT_EXPIRE_REFRESH_TIME  Refresh token lifetime [default: 7d]
  PASSWORD_HASH_COST       Argon2 iteration count, 1-10 [default: 2]
  APP_MODE                 Set to 'dev' to send cookies without Secure
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind, database_url)?;
    config.validate()?;

    info!(
        "Connecting to database at {}:{}/{}",
        config.database.host, config.database.port, config.database.database
    );
    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to apply migrations")?;
    info!("Database connected and migrated");

    let hasher = Argon2Hasher::new(config.security.hash_cost)?;
    let auth_manager = AuthManager::new(
        Arc::new(PgUserRepository::new(db.pool().clone())),
        Arc::new(hasher),
        TokenService::new(&config.security.token_config()),
    );

    let state = AppState {
        auth_manager: Arc::new(auth_manager),
        cookies: CookiePolicy::new(&config.cookies),
    };
    if config.cookies.dev_mode {
        info!("APP_MODE=dev: cookies are sent without the Secure attribute");
    }

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Auth server listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
