//! Application State

use std::sync::Arc;

use secrecy::SecretString;

use permit_core::{CredentialStore, PaymentGateway, RenewalWorkflow};
use permit_payments::WebhookHandler;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// User records (SQLite in production)
    pub store: Arc<dyn CredentialStore>,

    /// Pricing and checkout orchestration
    pub workflow: Arc<RenewalWorkflow>,

    /// Stripe event intake
    pub webhooks: Arc<WebhookHandler>,

    /// Webhook signing secret (optional - webhooks refused if None)
    pub webhook_secret: Option<SecretString>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        gateway: Option<Arc<dyn PaymentGateway>>,
        webhook_secret: Option<SecretString>,
    ) -> Self {
        Self {
            workflow: Arc::new(RenewalWorkflow::new(store.clone(), gateway)),
            webhooks: Arc::new(WebhookHandler::new(store.clone())),
            store,
            webhook_secret,
        }
    }
}
