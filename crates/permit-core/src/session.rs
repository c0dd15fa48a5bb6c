//! Member Session State
//!
//! Typed contents of the server-side session. The HTTP layer stores one
//! [`SessionState`] under [`SESSION_KEY`]; nothing else is written to the
//! session.

use serde::{Deserialize, Serialize};

use crate::pricing::Fee;

/// Session key holding the serialized [`SessionState`]
pub const SESSION_KEY: &str = "member";

/// Identity captured at login
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub permit_type: String,
}

/// Per-browser session state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    identity: Option<SessionIdentity>,
    /// Fee cached by the last members-page view
    renewal_price: Option<Fee>,
}

impl SessionState {
    /// Anonymous session
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for a freshly verified login. No renewal price is carried over.
    pub const fn authenticated(identity: SessionIdentity) -> Self {
        Self {
            identity: Some(identity),
            renewal_price: None,
        }
    }

    pub const fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Fee from the last members-page view, if one happened in this session
    pub const fn renewal_price(&self) -> Option<Fee> {
        self.renewal_price
    }

    /// Only the renewal workflow writes the cached fee.
    ///
    /// The identity's permit label is refreshed alongside so the two never
    /// disagree.
    pub(crate) fn record_renewal_price(&mut self, permit_type: &str, fee: Fee) {
        if let Some(identity) = self.identity.as_mut() {
            identity.permit_type = permit_type.to_owned();
        }
        self.renewal_price = Some(fee);
    }
}
