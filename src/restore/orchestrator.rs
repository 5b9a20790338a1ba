/// Restore Orchestrator
///
/// Drives the two disjoint password-restore paths:
///
/// - `Authenticated`: caller holds a bearer token and proves the current
///   secret; the hash is replaced in place.
/// - `RequestCode` / `RedeemCode`: no token. A one-time code is issued to the
///   identity's mailbox, then redeemed together with the current secret.
///
/// The transport layer classifies each request into a `RestoreRequest`
/// before it reaches this module.

use std::sync::Arc;

use crate::auth::{matches_blocking, validate_secret, CredentialHasher, TokenCodec};
use crate::email_client::MailSender;
use crate::error::{AppError, AuthError, ErrorContext, ValidationError};
use crate::user_store::UserStore;

use super::code::generate_restore_code;
use super::session_table::RestoreSessionTable;

pub const RESTORE_MAIL_SUBJECT: &str = "Restore account";

#[derive(Debug, Clone)]
pub enum RestoreRequest {
    /// Bearer-authenticated change of the caller's own secret
    Authenticated {
        token: String,
        old_secret: String,
        new_secret: String,
    },
    /// Ask for a one-time code to be mailed to `identity`
    RequestCode { identity: String },
    /// Redeem a previously mailed code
    RedeemCode {
        identity: String,
        code: String,
        old_secret: String,
        new_secret: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A restore code was issued; delivery happens in the background
    CodeIssued,
    /// The stored secret was replaced
    PasswordChanged,
}

pub struct RestoreOrchestrator {
    codec: Arc<TokenCodec>,
    store: Arc<dyn UserStore>,
    mailer: Arc<dyn MailSender>,
    sessions: Arc<RestoreSessionTable>,
    hasher: CredentialHasher,
    code_length: usize,
}

impl RestoreOrchestrator {
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<dyn UserStore>,
        mailer: Arc<dyn MailSender>,
        sessions: Arc<RestoreSessionTable>,
        hasher: CredentialHasher,
        code_length: usize,
    ) -> Self {
        Self {
            codec,
            store,
            mailer,
            sessions,
            hasher,
            code_length,
        }
    }

    pub async fn restore(&self, request: RestoreRequest) -> Result<RestoreOutcome, AppError> {
        match request {
            RestoreRequest::Authenticated {
                token,
                old_secret,
                new_secret,
            } => self.restore_authenticated(&token, &old_secret, &new_secret).await,
            RestoreRequest::RequestCode { identity } => self.request_code(&identity).await,
            RestoreRequest::RedeemCode {
                identity,
                code,
                old_secret,
                new_secret,
            } => {
                self.redeem_code(&identity, &code, &old_secret, &new_secret)
                    .await
            }
        }
    }

    async fn restore_authenticated(
        &self,
        token: &str,
        old_secret: &str,
        new_secret: &str,
    ) -> Result<RestoreOutcome, AppError> {
        let claims = self.codec.verify(token)?;
        validate_secret("old_password", old_secret)?;
        validate_secret("new_password", new_secret)?;

        self.change_secret(claims.identity(), old_secret, new_secret)
            .await?;

        tracing::info!(identity = %claims.identity(), "Password changed with bearer token");
        Ok(RestoreOutcome::PasswordChanged)
    }

    async fn request_code(&self, identity: &str) -> Result<RestoreOutcome, AppError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(ValidationError::EmptyField("email".to_string()).into());
        }

        if !self.store.exists(identity).await? {
            return Err(ValidationError::UnknownIdentity.into());
        }

        let code = generate_restore_code(self.code_length);
        self.sessions.put(code.clone(), identity);
        tracing::info!(identity = %identity, "Restore code issued");

        self.dispatch_code(identity.to_string(), code);
        Ok(RestoreOutcome::CodeIssued)
    }

    /// Hand the code to the mail sender without waiting for delivery.
    fn dispatch_code(&self, identity: String, code: String) {
        let mailer = Arc::clone(&self.mailer);
        let body = format!(
            "Your password restore code is: {}\nIt expires in {} minutes.",
            code,
            self.sessions.ttl().num_minutes()
        );

        tokio::spawn(async move {
            if let Err(e) = mailer.send(&identity, RESTORE_MAIL_SUBJECT, &body).await {
                ErrorContext::new("restore_code_delivery")
                    .with_identity(identity)
                    .log_error(&AppError::Email(e));
            }
        });
    }

    async fn redeem_code(
        &self,
        identity: &str,
        code: &str,
        old_secret: &str,
        new_secret: &str,
    ) -> Result<RestoreOutcome, AppError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(ValidationError::EmptyField("email".to_string()).into());
        }
        validate_secret("old_password", old_secret)?;
        validate_secret("new_password", new_secret)?;

        // absent, expired and foreign codes are indistinguishable to callers
        match self.sessions.get(code) {
            Some(record) if record.identity == identity => {}
            _ => return Err(ValidationError::InvalidCode.into()),
        }

        // a wrong old secret leaves the code live until it expires
        self.verify_secret(identity, old_secret).await?;

        // only one redeem can take the code; the loser sees an invalid code
        let record = self
            .sessions
            .claim(code, identity)
            .ok_or(ValidationError::InvalidCode)?;

        if let Err(e) = self.replace_secret(identity, new_secret).await {
            if !self.sessions.reinstate(record) {
                tracing::warn!(identity = %identity, "Restore code superseded during failed redeem");
            }
            return Err(e);
        }

        tracing::info!(identity = %identity, "Password changed with restore code");
        Ok(RestoreOutcome::PasswordChanged)
    }

    /// Verify `old_secret` against the stored hash, then persist a hash of
    /// `new_secret`. No session lock is held here.
    async fn change_secret(
        &self,
        identity: &str,
        old_secret: &str,
        new_secret: &str,
    ) -> Result<(), AppError> {
        self.verify_secret(identity, old_secret).await?;
        self.replace_secret(identity, new_secret).await
    }

    async fn verify_secret(&self, identity: &str, secret: &str) -> Result<(), AppError> {
        let stored_hash = self
            .store
            .find_hash(identity)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !matches_blocking(&stored_hash, secret).await? {
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(())
    }

    async fn replace_secret(&self, identity: &str, new_secret: &str) -> Result<(), AppError> {
        let new_hash = self.hasher.hash_blocking(new_secret).await?;
        self.store.update_hash(identity, &new_hash).await?;
        Ok(())
    }

    /// Read-only probe: is `token` currently a valid bearer token?
    pub fn token_valid(&self, token: &str) -> bool {
        self.codec.is_valid(token)
    }

    /// Read-only probe: is `code` live and bound to `identity`?
    pub fn code_valid(&self, identity: &str, code: &str) -> bool {
        self.sessions
            .get(code)
            .map_or(false, |record| record.identity == identity.trim())
    }
}
