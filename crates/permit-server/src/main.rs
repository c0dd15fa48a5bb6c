//! permit-renewal HTTP Server
//!
//! Axum-based server for member registration, renewal pricing and Stripe
//! hosted checkout.

mod config;
mod db;
mod error;
mod middleware;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use permit_core::{CredentialStore, PaymentGateway};
use permit_payments::StripeClient;

use crate::config::AppConfig;
use crate::db::SqliteCredentialStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment first so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Database and schema
    let pool = db::create_pool(&config.db_path).await?;
    db::run_migrations(&pool).await?;

    let session_store = SqliteStore::new(pool.clone());
    session_store.migrate().await?;

    tracing::info!("✓ Database ready at {}", config.db_path);

    // Initialize payments
    let stripe = match StripeClient::from_env(&config.base_url) {
        Ok(client) => {
            tracing::info!("✓ Stripe configured");
            if client.webhook_secret().is_none() {
                tracing::warn!("⚠ STRIPE_WEBHOOK_SECRET not set - renewals will not be recorded");
            }
            Some(client)
        }
        Err(e) => {
            tracing::warn!("⚠ Stripe not configured - payments disabled ({e})");
            tracing::warn!("  Set STRIPE_SECRET_KEY and STRIPE_WEBHOOK_SECRET in .env");
            None
        }
    };

    let webhook_secret = stripe
        .as_ref()
        .and_then(|client| client.webhook_secret().cloned());
    let gateway = stripe.map(|client| Arc::new(client) as Arc<dyn PaymentGateway>);

    // Build application state
    let store: Arc<dyn CredentialStore> = Arc::new(SqliteCredentialStore::new(pool));
    let state = AppState::new(store, gateway, webhook_secret);

    // Build router
    let app = middleware::with_session_layer(
        routes::router(state, &config.public_dir),
        session_store,
        &config,
    )?
    .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 permit-server running on http://{}", addr);
    tracing::info!("   public URL {}", config.base_url);
    tracing::info!("══════════════════════════════════════════════════");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
