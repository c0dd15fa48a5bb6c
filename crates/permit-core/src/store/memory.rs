//! In-memory credential store (for development/testing)

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::CredentialStore;
use crate::error::StoreError;
use crate::user::{NewUser, User, UserId};

#[derive(Default)]
struct Inner {
    by_email: HashMap<String, User>,
    next_id: i64,
}

/// Credential store backed by a `HashMap` keyed on email
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a record, as an administrator deleting an account would
    pub async fn remove(&self, email: &str) -> Option<User> {
        self.inner.write().await.by_email.remove(email)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_email.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.by_email.get(email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserId, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.by_email.contains_key(&user.email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }

        inner.next_id += 1;
        let id = UserId::new(inner.next_id);
        inner.by_email.insert(
            user.email.clone(),
            User {
                id,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                password_hash: user.password_hash,
                permit_type: user.permit_type,
                renewed: false,
            },
        );

        Ok(id)
    }

    async fn count_renewed(&self) -> Result<u64, StoreError> {
        let inner = self.inner.read().await;
        let count = inner.by_email.values().filter(|user| user.renewed).count();
        Ok(count as u64)
    }

    async fn mark_renewed(&self, email: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.by_email.get_mut(email).is_some_and(|user| {
            user.renewed = true;
            true
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, first_name: &str) -> NewUser {
        NewUser {
            first_name: first_name.into(),
            last_name: "Tester".into(),
            email: email.into(),
            password_hash: "hash".into(),
            permit_type: "Local Adult".into(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_without_mutation() {
        let store = MemoryCredentialStore::new();

        let id = store.insert(new_user("a@b.com", "First")).await.unwrap();
        let second = store.insert(new_user("a@b.com", "Second")).await;

        assert!(matches!(second, Err(StoreError::Conflict(_))));
        assert_eq!(store.len().await, 1);

        let stored = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.first_name, "First");
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let store = MemoryCredentialStore::new();
        store.insert(new_user("Ada@Example.com", "Ada")).await.unwrap();

        assert!(store.find_by_email("ada@example.com").await.unwrap().is_none());
        assert!(store.find_by_email("Ada@Example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_renewed_count() {
        let store = MemoryCredentialStore::new();
        store.insert(new_user("a@b.com", "A")).await.unwrap();
        store.insert(new_user("c@d.com", "C")).await.unwrap();

        assert_eq!(store.count_renewed().await.unwrap(), 0);
        assert!(store.mark_renewed("a@b.com").await.unwrap());
        assert_eq!(store.count_renewed().await.unwrap(), 1);

        assert!(!store.mark_renewed("missing@b.com").await.unwrap());
        assert_eq!(store.count_renewed().await.unwrap(), 1);
    }
}
