use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::UserStore;
use crate::error::DatabaseError;

/// Process-local user store with the same uniqueness contract as the
/// Postgres store. Used when no database is configured, and in tests.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, String>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn users(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.users().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users().is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_hash(&self, identity: &str) -> Result<Option<String>, DatabaseError> {
        Ok(self.users().get(identity).cloned())
    }

    async fn insert(&self, identity: &str, password_hash: &str) -> Result<(), DatabaseError> {
        match self.users().entry(identity.to_string()) {
            Entry::Occupied(_) => Err(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(password_hash.to_string());
                Ok(())
            }
        }
    }

    async fn update_hash(
        &self,
        identity: &str,
        password_hash: &str,
    ) -> Result<(), DatabaseError> {
        match self.users().get_mut(identity) {
            Some(stored) => {
                *stored = password_hash.to_string();
                Ok(())
            }
            None => Err(DatabaseError::QueryExecution(
                "password update matched no user".to_string(),
            )),
        }
    }

    async fn exists(&self, identity: &str) -> Result<bool, DatabaseError> {
        Ok(self.users().contains_key(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryUserStore::new();
        store.insert("a@b.com", "hash-1").await.unwrap();

        assert_eq!(store.find_hash("a@b.com").await.unwrap().as_deref(), Some("hash-1"));
        assert!(store.exists("a@b.com").await.unwrap());
        assert_eq!(store.find_hash("x@y.com").await.unwrap(), None);
        assert!(!store.exists("x@y.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let store = InMemoryUserStore::new();
        store.insert("a@b.com", "hash-1").await.unwrap();

        let result = store.insert("a@b.com", "hash-2").await;
        assert!(matches!(result, Err(DatabaseError::UniqueConstraintViolation(_))));
        assert_eq!(store.find_hash("a@b.com").await.unwrap().as_deref(), Some("hash-1"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_hash() {
        let store = InMemoryUserStore::new();
        store.insert("a@b.com", "hash-1").await.unwrap();
        store.update_hash("a@b.com", "hash-2").await.unwrap();

        assert_eq!(store.find_hash("a@b.com").await.unwrap().as_deref(), Some("hash-2"));
        assert!(store.update_hash("x@y.com", "hash").await.is_err());
    }
}
