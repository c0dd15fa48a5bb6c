//! Stripe Webhook Handling
//!
//! Marks a member renewed once Stripe confirms the hosted checkout was paid.

use std::sync::Arc;

use stripe::{CheckoutSession, Event, EventObject, EventType, Webhook};

use permit_core::CredentialStore;

use crate::error::{PaymentError, Result};

/// Parsed webhook event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookEvent {
    /// Checkout paid; `marked` is false when no member matched the email
    CheckoutCompleted {
        session_id: String,
        customer_email: Option<String>,
        marked: bool,
    },

    /// Hosted page abandoned until Stripe expired it
    CheckoutExpired { session_id: String },

    /// Unhandled event type
    Other { event_type: String },
}

/// Webhook handler
pub struct WebhookHandler {
    store: Arc<dyn CredentialStore>,
}

impl WebhookHandler {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Verify webhook signature and parse event
    pub fn parse_event(&self, payload: &str, signature: &str, secret: &str) -> Result<Event> {
        Webhook::construct_event(payload, signature, secret)
            .map_err(|e| PaymentError::WebhookSignature(e.to_string()))
    }

    /// Process a webhook event
    pub async fn handle(&self, event: Event) -> Result<WebhookEvent> {
        tracing::info!(event_type = ?event.type_, "Processing Stripe webhook");

        match event.type_ {
            EventType::CheckoutSessionCompleted => {
                let session = checkout_session(&event)?;
                let customer_email = payer_email(session);

                let marked = match &customer_email {
                    Some(email) => self.record_completion(email).await?,
                    None => {
                        tracing::warn!(
                            session_id = %session.id,
                            "Completed checkout carried no email"
                        );
                        false
                    }
                };

                Ok(WebhookEvent::CheckoutCompleted {
                    session_id: session.id.to_string(),
                    customer_email,
                    marked,
                })
            }

            EventType::CheckoutSessionExpired => {
                let session = checkout_session(&event)?;
                tracing::info!(session_id = %session.id, "Checkout session expired");

                Ok(WebhookEvent::CheckoutExpired {
                    session_id: session.id.to_string(),
                })
            }

            _ => {
                let event_type = format!("{:?}", event.type_);
                tracing::debug!(event_type = %event_type, "Unhandled webhook event");
                Ok(WebhookEvent::Other { event_type })
            }
        }
    }

    /// Flag the member with this email as renewed
    pub async fn record_completion(&self, email: &str) -> Result<bool> {
        let marked = self.store.mark_renewed(email).await?;

        if marked {
            tracing::info!(email = %email, "Marked permit renewed");
        } else {
            tracing::warn!(email = %email, "Payment completed for unknown member");
        }

        Ok(marked)
    }
}

fn checkout_session(event: &Event) -> Result<&CheckoutSession> {
    match &event.data.object {
        EventObject::CheckoutSession(session) => Ok(session),
        _ => Err(PaymentError::WebhookParse(
            "Invalid checkout session data".into(),
        )),
    }
}

/// Prefer the email we prefilled, falling back to what the payer typed
fn payer_email(session: &CheckoutSession) -> Option<String> {
    session.customer_email.clone().or_else(|| {
        session
            .customer_details
            .as_ref()
            .and_then(|details| details.email.clone())
    })
}
