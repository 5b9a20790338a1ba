/// Password Hashing and Verification
///
/// bcrypt with a fixed cost. Hashing is CPU-bound by design, so the async
/// helpers run it on the blocking pool rather than on a request worker.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, ValidationError};

/// bcrypt only reads the first 72 bytes of input
const MAX_SECRET_LENGTH: usize = 72;

#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    cost: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl CredentialHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a secret with a fresh salt.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if bcrypt fails
    pub fn hash(&self, secret: &str) -> Result<String, AppError> {
        hash(secret, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Async wrapper over [`CredentialHasher::hash`] on the blocking pool.
    pub async fn hash_blocking(&self, secret: &str) -> Result<String, AppError> {
        let hasher = *self;
        let secret = secret.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
    }
}

/// Check a secret against a stored hash.
///
/// A malformed hash counts as a mismatch.
pub fn matches(stored_hash: &str, secret: &str) -> bool {
    verify(secret, stored_hash).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored password hash could not be parsed");
        false
    })
}

/// Async wrapper over [`matches`] on the blocking pool.
pub async fn matches_blocking(stored_hash: &str, secret: &str) -> Result<bool, AppError> {
    let stored_hash = stored_hash.to_string();
    let secret = secret.to_string();
    tokio::task::spawn_blocking(move || matches(&stored_hash, &secret))
        .await
        .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))
}

/// Reject secrets that are empty or that bcrypt would silently truncate.
pub fn validate_secret(field: &str, secret: &str) -> Result<(), ValidationError> {
    if secret.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }

    if secret.len() > MAX_SECRET_LENGTH {
        return Err(ValidationError::TooLong(field.to_string(), MAX_SECRET_LENGTH));
    }

    Ok(())
}
