//! Credential Store
//!
//! Durable user records. Each operation maps to a single atomic statement in
//! the SQL implementation, so no operation needs a transaction.

mod memory;

pub use memory::MemoryCredentialStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::user::{NewUser, User, UserId};

/// Credential storage trait
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a record by its exact email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new record.
    ///
    /// Fails with [`StoreError::Conflict`] when the email is taken, leaving
    /// the store unchanged.
    async fn insert(&self, user: NewUser) -> Result<UserId, StoreError>;

    /// Number of records with `renewed = true`
    async fn count_renewed(&self) -> Result<u64, StoreError>;

    /// Flag a record as renewed. Returns `false` if no record has that email.
    async fn mark_renewed(&self, email: &str) -> Result<bool, StoreError>;

    /// Check the backend is reachable
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
