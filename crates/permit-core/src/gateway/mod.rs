//! Payment Intent Gateway
//!
//! Abstraction over the hosted-checkout provider. The Stripe implementation
//! lives in `permit-payments`; [`MockPaymentGateway`] serves tests and local
//! demos.

mod mock;

pub use mock::MockPaymentGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intent::PaymentIntentRequest;

/// Opaque handle to a pending hosted checkout session.
///
/// The id is the only provider data relayed to the browser.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedSession {
    pub id: String,
}

/// Classified provider failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Payment-method problem; the user may retry
    #[error("Card error: {0}")]
    Card(String),

    /// Malformed request; a caller bug, not user-fixable
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream outage or connectivity failure
    #[error("Provider API error: {0}")]
    ProviderApi(String),

    /// Anything else
    #[error("Unknown gateway error: {0}")]
    Unknown(String),
}

impl GatewayError {
    /// Transient failures worth a retry after a delay
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderApi(_))
    }

    /// Get user-friendly message
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Card(_) => "There was an issue with the payment method.",
            Self::InvalidRequest(_) => "Invalid request to the payment provider.",
            Self::ProviderApi(_) => "The payment provider is unavailable. Please try again shortly.",
            Self::Unknown(_) => "Error creating payment session.",
        }
    }
}

/// Hosted checkout provider (Strategy pattern)
///
/// Implementations never retry: every successful call creates a new billable
/// session upstream.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session for one renewal
    async fn create_session(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<HostedSession, GatewayError>;

    /// Provider name
    fn name(&self) -> &str;
}
