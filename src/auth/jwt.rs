/// Token Codec
///
/// Issues and verifies HS256-signed bearer tokens. The signing keys are
/// derived once from the configured secret and never rotated at runtime.
///
/// Every verification failure (bad structure, bad signature, foreign
/// algorithm, wrong issuer or purpose, expiry) collapses into
/// `AuthError::InvalidToken`; the reason is only logged at debug level.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    purpose: String,
    expiry_seconds: i64,
}

impl TokenCodec {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            purpose: config.purpose.clone(),
            expiry_seconds: config.token_expiry_seconds,
        }
    }

    /// Lifetime of issued tokens, in seconds.
    pub fn expiry_seconds(&self) -> i64 {
        self.expiry_seconds
    }

    /// Issue a token for `identity` valid from now.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if signing fails
    pub fn issue(&self, identity: &str) -> Result<String, AppError> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(&self, identity: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims::new(
            identity,
            &self.issuer,
            &self.purpose,
            now,
            self.expiry_seconds,
        );

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as of `now`.
    ///
    /// Signature comparison is delegated to `jsonwebtoken`, which compares
    /// HMAC tags in constant time. Only `SIGNING_ALGORITHM` is accepted.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // expiry is checked below against the caller's clock
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AuthError::InvalidToken
            })?;

        if claims.purpose != self.purpose {
            tracing::debug!("Token rejected: purpose mismatch");
            return Err(AuthError::InvalidToken);
        }

        if claims.is_expired_at(now) {
            tracing::debug!("Token rejected: expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }

    /// Read-only probe: is this token currently valid?
    pub fn is_valid(&self, token: &str) -> bool {
        self.verify(token).is_ok()
    }
}
