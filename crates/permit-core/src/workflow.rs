//! Renewal Workflow
//!
//! Bridges an authenticated session to the members and checkout view models,
//! and validated checkout input to the payment gateway.
//!
//! ```text
//! login ──▶ enter_members_area ──▶ prepare_checkout ──▶ start_payment
//!              │ caches fee            │ requires fee        │ gateway
//!              ▼                       ▼                     ▼
//!          MembersView            CheckoutView          HostedSession
//! ```

use std::sync::Arc;

use crate::error::{RenewalError, Result};
use crate::gateway::{HostedSession, PaymentGateway};
use crate::intent::build_payment_intent;
use crate::pricing::Fee;
use crate::sanitize::{SafeText, sanitize};
use crate::session::{SessionIdentity, SessionState};
use crate::store::CredentialStore;

/// Identity fields ready for a template
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayUser {
    pub email: SafeText,
    pub first_name: SafeText,
    pub last_name: SafeText,
    pub permit_type: SafeText,
}

impl DisplayUser {
    fn from_identity(identity: &SessionIdentity) -> Self {
        Self {
            email: sanitize(&identity.email),
            first_name: sanitize(&identity.first_name),
            last_name: sanitize(&identity.last_name),
            permit_type: sanitize(&identity.permit_type),
        }
    }
}

/// Members page view model
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MembersView {
    pub user: DisplayUser,
    pub fee: Fee,
    /// Whether to offer the payment option at all
    pub payable: bool,
    /// Records flagged renewed, system wide
    pub renewed_count: u64,
}

impl MembersView {
    /// Fee in major units, e.g. `"100.00"`
    pub fn price(&self) -> String {
        self.fee.to_string()
    }

    pub fn renewed_count_text(&self) -> SafeText {
        sanitize(&self.renewed_count.to_string())
    }
}

/// Checkout page view model
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutView {
    pub user: DisplayUser,
    pub fee: Fee,
    /// Fee in major units, e.g. `"100.00"`
    pub price: String,
    pub payable: bool,
    pub renewed_count: SafeText,
}

/// Renewal workflow with injected store and gateway
pub struct RenewalWorkflow {
    store: Arc<dyn CredentialStore>,
    gateway: Option<Arc<dyn PaymentGateway>>,
}

impl RenewalWorkflow {
    /// Create a workflow. A `None` gateway disables [`Self::start_payment`].
    pub fn new(
        store: Arc<dyn CredentialStore>,
        gateway: Option<Arc<dyn PaymentGateway>>,
    ) -> Self {
        Self { store, gateway }
    }

    pub fn payments_enabled(&self) -> bool {
        self.gateway.is_some()
    }

    /// Build the members view and cache the renewal fee in `session`.
    ///
    /// The permit label is read from the store, not from the session, so a
    /// changed record is priced as it stands now.
    ///
    /// # Errors
    ///
    /// - [`RenewalError::NotAuthenticated`] if the session has no identity
    /// - [`RenewalError::UserNotFound`] if the record has been removed
    /// - [`RenewalError::Store`] on backend failure
    pub async fn enter_members_area(&self, session: &mut SessionState) -> Result<MembersView> {
        let email = session
            .identity()
            .map(|identity| identity.email.clone())
            .ok_or(RenewalError::NotAuthenticated)?;

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or_else(|| RenewalError::UserNotFound(email.clone()))?;

        let quote = user.quote();
        session.record_renewal_price(&user.permit_type, quote.fee);

        let renewed_count = self.store.count_renewed().await?;

        tracing::debug!(
            email = %email,
            permit = ?quote.permit,
            fee = quote.fee.minor_units(),
            "Resolved renewal price"
        );

        Ok(MembersView {
            user: DisplayUser::from_identity(&user.identity()),
            fee: quote.fee,
            payable: quote.payable,
            renewed_count,
        })
    }

    /// Build the checkout view from the fee cached by the members page.
    ///
    /// # Errors
    ///
    /// - [`RenewalError::NotAuthenticated`] if the session has no identity
    /// - [`RenewalError::MissingPrice`] if the members page was not visited
    ///   in this session
    /// - [`RenewalError::Store`] on backend failure
    pub async fn prepare_checkout(&self, session: &SessionState) -> Result<CheckoutView> {
        let identity = session.identity().ok_or(RenewalError::NotAuthenticated)?;
        let fee = session.renewal_price().ok_or(RenewalError::MissingPrice)?;

        let renewed_count = self.store.count_renewed().await?;

        Ok(CheckoutView {
            user: DisplayUser::from_identity(identity),
            fee,
            price: fee.to_string(),
            payable: fee.is_payable(),
            renewed_count: sanitize(&renewed_count.to_string()),
        })
    }

    /// Validate checkout input and open a hosted checkout session.
    ///
    /// Not idempotent: each call creates a new pending session upstream.
    ///
    /// # Errors
    ///
    /// - [`RenewalError::Validation`] for a bad amount or email
    /// - [`RenewalError::PaymentsUnavailable`] when no gateway is configured
    /// - [`RenewalError::Gateway`] when the provider fails
    pub async fn start_payment(
        &self,
        raw_amount: &str,
        raw_email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<HostedSession> {
        let request = build_payment_intent(raw_amount, raw_email, first_name, last_name)?;
        let gateway = self
            .gateway
            .as_ref()
            .ok_or(RenewalError::PaymentsUnavailable)?;

        let session = gateway.create_session(&request).await.inspect_err(|e| {
            tracing::error!(
                gateway = gateway.name(),
                email = %request.email(),
                amount = request.amount(),
                error = %e,
                "Failed to create checkout session"
            );
        })?;

        tracing::info!(
            gateway = gateway.name(),
            session_id = %session.id,
            amount = request.amount(),
            "Created checkout session"
        );

        Ok(session)
    }
}
