//! Session middleware configuration.
//!
//! SQLite-backed sessions using tower-sessions, with signed cookies.

use axum::Router;
use secrecy::ExposeSecret;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::{AppConfig, ConfigError};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "permit_session";

/// Session expiry time in seconds (1 day of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Wrap `router` in the session layer.
///
/// The sessions table must already exist (`SqliteStore::migrate`).
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if no signing key can be derived
/// from the session secret.
pub fn with_session_layer(
    router: Router,
    store: SqliteStore,
    config: &AppConfig,
) -> Result<Router, ConfigError> {
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes()).map_err(|_| {
        ConfigError::InsecureSecret(
            "SESSION_SECRET".into(),
            "cannot derive a signing key".into(),
        )
    })?;

    let layer = SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookie)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key);

    Ok(router.layer(layer))
}
