//! Structured logging configuration.
//!
//! Sets up the tracing subscriber and the helpers used to record security
//! events with consistent fields.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured logging
///
/// Log levels are taken from `RUST_LOG`, falling back to
/// `info,sqlx=warn,hyper=warn`. Records emitted through the `log` facade by
/// the library crate are forwarded to the same subscriber.
///
/// # Example
///
/// ```no_run
/// use auth_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// Never pass raw tokens or passwords as `message`.
///
/// # Example
///
/// ```
/// use auth_server::logging::log_security_event;
///
/// log_security_event("rejected_access_token", None, "Token is not valid");
/// ```
pub fn log_security_event(event_type: &str, user_id: Option<Uuid>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        user_id = user_id.map(|id| id.to_string()),
        "SECURITY: {}",
        message
    );
}
