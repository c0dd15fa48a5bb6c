//! # permit-payments
//!
//! Stripe integration for permit renewals.
//!
//! ## Stripe Checkout (Hosted)
//!
//! **Flow:** Checkout page → Redirect to Stripe's hosted page → Redirect back
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────┐     ┌──────────────────────┐
//! │  /checkout   │────▶│  Stripe Hosted  │────▶│  /payment-success    │
//! │  (pay btn)   │     │  Checkout Page  │     │  /payment-cancelled  │
//! └──────────────┘     └─────────────────┘     └──────────────────────┘
//!                               │
//!                               ▼ checkout.session.completed
//!                      ┌─────────────────┐
//!                      │ /webhook/stripe │──▶ mark member renewed
//!                      └─────────────────┘
//! ```
//!
//! The site never sees card details. [`StripeClient`] implements
//! [`permit_core::PaymentGateway`] and returns only the session id; the
//! browser redirects itself to the hosted page.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use permit_payments::StripeClient;
//! use permit_core::{build_payment_intent, PaymentGateway};
//!
//! let client = StripeClient::new("sk_test_xxx", "https://permits.example.com");
//! let request = build_payment_intent("4000", "user@example.com", "Ada", "Lovelace")?;
//! let session = client.create_session(&request).await?;
//!
//! // Send session.id to the browser
//! ```

mod checkout;
mod error;
mod webhook;

pub use checkout::{StripeClient, classify_error_type};
pub use error::{PaymentError, Result};
pub use webhook::{WebhookEvent, WebhookHandler};
