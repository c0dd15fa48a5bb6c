//! Error Types

use thiserror::Error;

use crate::gateway::GatewayError;

/// Result type alias for workflow operations
pub type Result<T> = std::result::Result<T, RenewalError>;

/// Credential store failures
#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique constraint violated (email already registered)
    #[error("Record already exists: {0}")]
    Conflict(String),

    /// Backend failure (connection, query, corrupt row)
    #[error("Storage error: {0}")]
    Backend(String),
}

/// Rejected payment-intent input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Amount is not a positive integer number of minor units
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    /// Email does not have a `local@domain.tld` shape
    #[error("Invalid email address: {0:?}")]
    InvalidEmail(String),
}

impl ValidationError {
    /// Get user-friendly message
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "Invalid amount.",
            Self::InvalidEmail(_) => "Invalid or missing email address.",
        }
    }
}

/// Renewal workflow errors
#[derive(Error, Debug)]
pub enum RenewalError {
    /// Session carries no authenticated identity
    #[error("Session is not authenticated")]
    NotAuthenticated,

    /// The authenticated identity no longer has a record
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Checkout reached without a members-page visit in this session
    #[error("Renewal price missing from session")]
    MissingPrice,

    /// Payment gateway is not configured
    #[error("Payments are not configured")]
    PaymentsUnavailable,

    /// Payment-intent input rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Payment provider rejected or failed the request
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Credential store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl RenewalError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Gateway(err) => err.is_retryable(),
            Self::Store(StoreError::Backend(_)) => true,
            _ => false,
        }
    }

    /// Get user-friendly message
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "Please log in to continue.",
            Self::UserNotFound(_) => "User not found.",
            Self::MissingPrice => "Error: Renewal price not available.",
            Self::PaymentsUnavailable => "Payments are currently unavailable.",
            Self::Validation(err) => err.user_message(),
            Self::Gateway(err) => err.user_message(),
            Self::Store(_) => "An error occurred processing your request.",
        }
    }
}
