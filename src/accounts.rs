/// Account operations: signup and login.
///
/// Both end by minting a bearer token through the shared codec. Login does
/// not reveal whether the identity or the secret was wrong.

use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::auth::{matches_blocking, validate_secret, CredentialHasher, TokenCodec};
use crate::error::{AppError, AuthError, ValidationError};
use crate::user_store::UserStore;
use crate::validators::is_valid_email;

/// Compared against when the identity is unknown, so login does the same
/// bcrypt work either way.
const TIMING_SECRET: &str = "keyward-unknown-identity";

pub struct AccountService {
    codec: Arc<TokenCodec>,
    store: Arc<dyn UserStore>,
    hasher: CredentialHasher,
    dummy_hash: OnceCell<String>,
}

impl AccountService {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn UserStore>, hasher: CredentialHasher) -> Self {
        Self {
            codec,
            store,
            hasher,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Register `identity` and return a bearer token for it.
    ///
    /// # Errors
    /// - `Validation` for a malformed email or unusable secret
    /// - `Database(UniqueConstraintViolation)` if already registered
    pub async fn signup(&self, identity: &str, secret: &str) -> Result<String, AppError> {
        let identity = is_valid_email(identity)?;
        validate_secret("password", secret)?;

        let password_hash = self.hasher.hash_blocking(secret).await?;
        self.store.insert(&identity, &password_hash).await?;

        tracing::info!(identity = %identity, "User registered");
        self.codec.issue(&identity)
    }

    /// Check credentials and return a bearer token.
    pub async fn login(&self, identity: &str, secret: &str) -> Result<String, AppError> {
        let identity = identity.trim();
        if identity.is_empty() || secret.is_empty() {
            return Err(ValidationError::EmptyField("email or password".to_string()).into());
        }

        let stored_hash = match self.store.find_hash(identity).await? {
            Some(hash) => hash,
            None => {
                matches_blocking(self.dummy_hash().await?, secret).await?;
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !matches_blocking(&stored_hash, secret).await? {
            return Err(AuthError::InvalidCredentials.into());
        }

        tracing::info!(identity = %identity, "User logged in");
        self.codec.issue(identity)
    }

    /// Hash at the configured cost, computed on first use.
    async fn dummy_hash(&self) -> Result<&str, AppError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| self.hasher.hash_blocking(TIMING_SECRET))
            .await?;
        Ok(hash.as_str())
    }

    pub fn token_expiry_seconds(&self) -> i64 {
        self.codec.expiry_seconds()
    }
}
