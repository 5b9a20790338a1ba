/// Bearer token claims
///
/// Payload of a signed bearer token: who the token speaks for, who minted it,
/// what it may be used for, and its validity window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by bearer tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject identity (the user's email)
    pub sub: String,
    /// Issuer tag, fixed per deployment
    pub iss: String,
    /// Purpose tag; tokens minted for another purpose are rejected
    pub purpose: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims valid from `now` for `expiry_seconds`.
    pub fn new(
        identity: &str,
        issuer: &str,
        purpose: &str,
        now: DateTime<Utc>,
        expiry_seconds: i64,
    ) -> Self {
        let iat = now.timestamp();
        Self {
            sub: identity.to_string(),
            iss: issuer.to_string(),
            purpose: purpose.to_string(),
            iat,
            exp: iat + expiry_seconds,
        }
    }

    pub fn identity(&self) -> &str {
        &self.sub
    }

    /// `exp` must be strictly in the future.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}
