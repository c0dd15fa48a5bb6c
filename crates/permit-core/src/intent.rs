//! Payment Intent Requests
//!
//! Validation and construction of the outbound checkout request. Building a
//! request never touches the network; see [`crate::gateway`] for that.

use serde::Serialize;

use crate::error::ValidationError;

/// Product name shown on the hosted checkout page
pub const LINE_ITEM_NAME: &str = "Permit Renewal";

/// A validated request for one hosted checkout session
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaymentIntentRequest {
    amount: i64,
    email: String,
    description: String,
}

impl PaymentIntentRequest {
    /// Amount in minor units, always > 0
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    /// Payer email for the provider receipt
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Line-item description, e.g. `"Ada Lovelace Permit Renewal"`
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Validate raw checkout input and build the request.
///
/// `raw_amount` must be a positive integer count of minor units. Names are
/// passed through to the description unchanged.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidAmount`] or
/// [`ValidationError::InvalidEmail`]; the amount is checked first.
pub fn build_payment_intent(
    raw_amount: &str,
    raw_email: &str,
    first_name: &str,
    last_name: &str,
) -> Result<PaymentIntentRequest, ValidationError> {
    let amount = parse_amount(raw_amount)?;

    if !is_valid_email(raw_email) {
        return Err(ValidationError::InvalidEmail(raw_email.to_owned()));
    }

    Ok(PaymentIntentRequest {
        amount,
        email: raw_email.to_owned(),
        description: format!("{first_name} {last_name} {LINE_ITEM_NAME}"),
    })
}

fn parse_amount(raw: &str) -> Result<i64, ValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err(ValidationError::InvalidAmount(raw.to_owned())),
    }
}

/// Basic address shape: `local@domain.tld`, exactly one `@`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // at least one dot with something on both sides
    domain
        .rsplit_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
