//! User Records

use serde::{Deserialize, Serialize};

use crate::pricing::{PermitType, Quote, resolve_price};
use crate::session::SessionIdentity;

/// Surrogate key assigned by the store on insert
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored member record
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Natural login key, unique and case-sensitive as stored
    pub email: String,
    /// PHC-format password hash
    pub password_hash: String,
    /// Permit label as registered; may be outside the known categories
    pub permit_type: String,
    pub renewed: bool,
}

impl User {
    /// Known permit category, if the stored label is one
    pub fn permit(&self) -> Option<PermitType> {
        PermitType::from_label(&self.permit_type)
    }

    pub fn quote(&self) -> Quote {
        resolve_price(&self.permit_type)
    }

    /// Identity captured into the session after login
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            permit_type: self.permit_type.clone(),
        }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("permit_type", &self.permit_type)
            .field("renewed", &self.renewed)
            .finish()
    }
}

/// Insert payload for a new registration
#[derive(Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub permit_type: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("permit_type", &self.permit_type)
            .finish()
    }
}
