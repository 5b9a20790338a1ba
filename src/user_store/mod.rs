/// User store
///
/// Narrow interface to the persisted user records (identity + password
/// hash). Lookups return `Ok(None)` for an absent identity so callers never
/// confuse "not registered" with "query failed".

use async_trait::async_trait;

use crate::error::DatabaseError;

mod memory;
mod postgres;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Stored password hash for `identity`, if registered.
    async fn find_hash(&self, identity: &str) -> Result<Option<String>, DatabaseError>;

    /// Register a new identity.
    ///
    /// # Errors
    /// `DatabaseError::UniqueConstraintViolation` if the identity exists
    async fn insert(&self, identity: &str, password_hash: &str) -> Result<(), DatabaseError>;

    /// Replace the stored hash. Last write wins.
    async fn update_hash(&self, identity: &str, password_hash: &str)
        -> Result<(), DatabaseError>;

    async fn exists(&self, identity: &str) -> Result<bool, DatabaseError>;
}
