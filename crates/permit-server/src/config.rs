//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DB_PATH` - SQLite database file (created if missing)
//! - `PORT` - Listen port
//! - `SESSION_SECRET` - Session cookie signing secret (min 64 bytes)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `BASE_URL` - Public origin for Stripe redirects (default: `http://localhost:{PORT}`)
//! - `SECURE_COOKIE` - Force the `Secure` cookie flag (`true`/`1`)
//! - `APP_ENV` - `production` implies `SECURE_COOKIE`
//! - `PUBLIC_DIR` - Static asset directory
//! - `STRIPE_SECRET_KEY`, `STRIPE_WEBHOOK_SECRET` - read by `permit_payments`

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Signing keys shorter than this are rejected by the cookie crate
const MIN_SESSION_SECRET_BYTES: usize = 64;

pub(crate) const DEFAULT_PUBLIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/public");

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without trailing slash
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Mark session cookies `Secure`
    pub secure_cookie: bool,
    /// Static files served for unmatched paths
    pub public_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.into()));

        let db_path = require("DB_PATH")?;

        let port_raw = require("PORT")?;
        let port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".into(), e.to_string()))?;

        let host = match get("HOST") {
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .map_err(|e| ConfigError::InvalidEnvVar("HOST".into(), e.to_string()))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let base_url = get("BASE_URL")
            .map_or_else(|| format!("http://localhost:{port}"), |url| url.trim().to_owned())
            .trim_end_matches('/')
            .to_owned();

        let session_secret = SecretString::from(require("SESSION_SECRET")?);
        validate_secret("SESSION_SECRET", &session_secret)?;

        let production = get("APP_ENV").is_some_and(|env| env.eq_ignore_ascii_case("production"));
        let secure_cookie = production
            || get("SECURE_COOKIE").is_some_and(|flag| parse_flag(&flag))
            || base_url.starts_with("https://");

        let public_dir = get("PUBLIC_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR), PathBuf::from);

        Ok(Self {
            db_path,
            host,
            port,
            base_url,
            session_secret,
            secure_cookie,
            public_dir,
        })
    }

    /// Address to bind the listener to
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn validate_secret(name: &str, secret: &SecretString) -> Result<(), ConfigError> {
    let bytes = secret.expose_secret().as_bytes();

    if bytes.len() < MIN_SESSION_SECRET_BYTES {
        return Err(ConfigError::InsecureSecret(
            name.into(),
            format!("must be at least {MIN_SESSION_SECRET_BYTES} bytes"),
        ));
    }

    if bytes.iter().all(|b| *b == bytes[0]) {
        return Err(ConfigError::InsecureSecret(
            name.into(),
            "must not repeat a single character".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const SECRET: &str = "k3Jv9xQ2mW7pL4tR8nY1cB6hF0dS5gA2zX7vN3qE9wU4iO1pK8jM6lH2bT5rC0yG";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DB_PATH", "permits.db"),
            ("PORT", "8080"),
            ("SESSION_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(!config.secure_cookie);
    }

    #[test]
    fn test_missing_required_variable() {
        let result = AppConfig::from_lookup(lookup(&[("PORT", "8080"), ("SESSION_SECRET", SECRET)]));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(name)) if name == "DB_PATH"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = AppConfig::from_lookup(lookup(&[
            ("DB_PATH", "permits.db"),
            ("PORT", "8080"),
            ("SESSION_SECRET", "too-short"),
        ]));
        assert!(matches!(result, Err(ConfigError::InsecureSecret(..))));
    }

    #[test]
    fn test_invalid_port() {
        let result = AppConfig::from_lookup(lookup(&[
            ("DB_PATH", "permits.db"),
            ("PORT", "eighty"),
            ("SESSION_SECRET", SECRET),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(name, _)) if name == "PORT"));
    }

    #[test]
    fn test_production_forces_secure_cookie() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DB_PATH", "permits.db"),
            ("PORT", "8080"),
            ("SESSION_SECRET", SECRET),
            ("APP_ENV", "production"),
            ("BASE_URL", "http://permits.internal/"),
        ]))
        .unwrap();

        assert!(config.secure_cookie);
        assert_eq!(config.base_url, "http://permits.internal");
    }
}
