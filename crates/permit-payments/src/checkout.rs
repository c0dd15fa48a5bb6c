//! Stripe Checkout Integration
//!
//! Implements the "Stripe Checkout (Hosted)" approach: one card payment for
//! one renewal, paid on Stripe's page.

use async_trait::async_trait;
use secrecy::SecretString;
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionMode, Client,
    CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData,
    CreateCheckoutSessionPaymentMethodTypes, Currency, ErrorType, StripeError,
};

use permit_core::intent::LINE_ITEM_NAME;
use permit_core::{GatewayError, HostedSession, PaymentGateway, PaymentIntentRequest};

use crate::error::{PaymentError, Result};

/// Renewal fees are charged in pounds sterling
const CURRENCY: Currency = Currency::GBP;

/// Stripe client wrapper
pub struct StripeClient {
    client: Client,
    base_url: String,
    webhook_secret: Option<SecretString>,
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// `base_url` is the public origin that Stripe redirects back to.
    pub fn new(secret_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(secret_key),
            base_url: base_url.trim_end_matches('/').to_owned(),
            webhook_secret: None,
        }
    }

    /// Attach the signing secret used to verify webhook deliveries
    #[must_use]
    pub fn with_webhook_secret(mut self, secret: &str) -> Self {
        self.webhook_secret = Some(SecretString::from(secret.to_owned()));
        self
    }

    /// Create from environment variables.
    ///
    /// `STRIPE_SECRET_KEY` is required; `STRIPE_WEBHOOK_SECRET` is optional
    /// and webhook deliveries are refused without it.
    pub fn from_env(base_url: &str) -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;

        let client = Self::new(&secret_key, base_url);

        Ok(match std::env::var("STRIPE_WEBHOOK_SECRET") {
            Ok(secret) if !secret.is_empty() => client.with_webhook_secret(&secret),
            _ => client,
        })
    }

    /// Get the webhook secret
    pub const fn webhook_secret(&self) -> Option<&SecretString> {
        self.webhook_secret.as_ref()
    }

    /// Redirect after payment; Stripe fills in the session id placeholder
    pub fn success_url(&self) -> String {
        format!(
            "{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
            self.base_url
        )
    }

    /// Redirect when the payer abandons the hosted page
    pub fn cancel_url(&self) -> String {
        format!("{}/payment-cancelled", self.base_url)
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_session(
        &self,
        request: &PaymentIntentRequest,
    ) -> std::result::Result<HostedSession, GatewayError> {
        let success_url = self.success_url();
        let cancel_url = self.cancel_url();

        let mut params = CreateCheckoutSession::new();
        params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
        params.customer_email = Some(request.email());
        params.success_url = Some(&success_url);
        params.cancel_url = Some(&cancel_url);
        params.mode = Some(CheckoutSessionMode::Payment);

        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency: CURRENCY,
                unit_amount: Some(request.amount()),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: LINE_ITEM_NAME.to_owned(),
                    description: Some(request.description().to_owned()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(classify_stripe_error)?;

        Ok(HostedSession {
            id: session.id.to_string(),
        })
    }

    fn name(&self) -> &str {
        "Stripe"
    }
}

/// Map a Stripe API error type onto the gateway's closed error set
pub fn classify_error_type(error_type: &ErrorType, message: &str) -> GatewayError {
    let message = message.to_owned();
    match error_type {
        ErrorType::Card => GatewayError::Card(message),
        ErrorType::InvalidRequest => GatewayError::InvalidRequest(message),
        ErrorType::Api | ErrorType::Connection | ErrorType::RateLimit => {
            GatewayError::ProviderApi(message)
        }
        _ => GatewayError::Unknown(message),
    }
}

fn classify_stripe_error(err: StripeError) -> GatewayError {
    match err {
        StripeError::Stripe(request) => {
            let message = request
                .message
                .unwrap_or_else(|| format!("HTTP {}", request.http_status));
            classify_error_type(&request.error_type, &message)
        }
        // the request never got an answer from the API
        unanswered @ (StripeError::ClientError(_) | StripeError::Timeout) => {
            GatewayError::ProviderApi(unanswered.to_string())
        }
        other => GatewayError::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permit_core::build_payment_intent;

    #[test]
    fn test_redirect_urls() {
        let client = StripeClient::new("sk_test_123", "https://permits.example.com/");
        assert_eq!(
            client.success_url(),
            "https://permits.example.com/payment-success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(
            client.cancel_url(),
            "https://permits.example.com/payment-cancelled"
        );
    }

    #[test]
    fn test_error_classification() {
        assert_eq!(
            classify_error_type(&ErrorType::Card, "declined"),
            GatewayError::Card("declined".into())
        );
        assert_eq!(
            classify_error_type(&ErrorType::InvalidRequest, "bad param"),
            GatewayError::InvalidRequest("bad param".into())
        );
        assert_eq!(
            classify_error_type(&ErrorType::Api, "oops"),
            GatewayError::ProviderApi("oops".into())
        );
        assert_eq!(
            classify_error_type(&ErrorType::RateLimit, "slow down"),
            GatewayError::ProviderApi("slow down".into())
        );
        assert!(matches!(
            classify_error_type(&ErrorType::Authentication, "bad key"),
            GatewayError::Unknown(_)
        ));
    }

    #[test]
    fn test_transport_failures_are_retryable() {
        let refused = classify_stripe_error(StripeError::ClientError("connection refused".into()));
        assert!(matches!(refused, GatewayError::ProviderApi(_)));
        assert!(refused.is_retryable());

        let timeout = classify_stripe_error(StripeError::Timeout);
        assert!(matches!(timeout, GatewayError::ProviderApi(_)));
        assert!(timeout.is_retryable());

        assert!(matches!(
            classify_stripe_error(StripeError::UnsupportedVersion),
            GatewayError::Unknown(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_retryable() {
        let client = StripeClient {
            client: Client::from_url("http://127.0.0.1:9/", "sk_test_123"),
            base_url: "http://localhost:3000".into(),
            webhook_secret: None,
        };
        let request = build_payment_intent("4000", "ada@example.com", "Ada", "Lovelace").unwrap();

        let err = client.create_session(&request).await.unwrap_err();

        assert!(matches!(err, GatewayError::ProviderApi(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_webhook_secret_optional() {
        let client = StripeClient::new("sk_test_123", "http://localhost:3000");
        assert!(client.webhook_secret().is_none());
        assert!(client.with_webhook_secret("whsec_abc").webhook_secret().is_some());
    }
}
