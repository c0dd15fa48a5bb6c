//! # permit-core
//!
//! Renewal pricing, member session state and the payment-intent workflow for
//! the permit renewal site.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      RenewalWorkflow                          │
//! │  ┌──────────────┐  ┌───────────────┐  ┌──────────────────┐   │
//! │  │   Pricing    │  │ SessionState  │  │  PaymentGateway  │   │
//! │  │   Resolver   │──│ (typed, per   │──│   (Strategy)     │   │
//! │  └──────────────┘  │  browser)     │  └──────────────────┘   │
//! │                    └───────────────┘                          │
//! │                  ┌────────────────────┐                       │
//! │                  │  CredentialStore   │                       │
//! │                  └────────────────────┘                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store and gateway are trait objects handed to the workflow at
//! construction, so the SQLite store and the Stripe client can be swapped for
//! [`MemoryCredentialStore`] and [`MockPaymentGateway`] in tests.

pub mod error;
pub mod gateway;
pub mod intent;
pub mod pricing;
pub mod sanitize;
pub mod session;
pub mod store;
pub mod user;
pub mod workflow;

pub use error::{RenewalError, Result, StoreError, ValidationError};
pub use gateway::{GatewayError, HostedSession, MockPaymentGateway, PaymentGateway};
pub use intent::{PaymentIntentRequest, build_payment_intent, is_valid_email};
pub use pricing::{Fee, PermitType, Quote, resolve_price};
pub use sanitize::{SafeText, sanitize};
pub use session::{SESSION_KEY, SessionIdentity, SessionState};
pub use store::{CredentialStore, MemoryCredentialStore};
pub use user::{NewUser, User, UserId};
pub use workflow::{CheckoutView, DisplayUser, MembersView, RenewalWorkflow};
