use async_trait::async_trait;
use serde::Serialize;

use crate::configuration::EmailSettings;
use crate::error::EmailError;
use crate::validators::is_valid_email;

/// Outbound mail delivery. Callers in the restore flow treat delivery as
/// fire-and-forget; failures are only logged.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;
}

/// Client for an HTTP email API.
#[derive(Clone)]
pub struct EmailClient {
    http_client: reqwest::Client,
    base_url: String,
    sender: SenderEmail,
}

#[derive(Clone, Debug)]
pub struct SenderEmail(String);

impl SenderEmail {
    pub fn parse(s: String) -> Result<Self, EmailError> {
        let email = is_valid_email(&s).map_err(|e| EmailError::InvalidRecipient(e.to_string()))?;
        Ok(Self(email))
    }

    pub fn inner(&self) -> &str {
        &self.0
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "Subject")]
    subject: &'a str,
    #[serde(rename = "TextBody")]
    text_body: &'a str,
}

impl EmailClient {
    pub fn new(base_url: String, sender: SenderEmail, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            base_url,
            sender,
        }
    }

    pub fn from_settings(settings: &EmailSettings) -> Result<Self, EmailError> {
        let sender = SenderEmail::parse(settings.sender.clone())?;
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| EmailError::ServiceUnavailable(e.to_string()))?;

        Ok(Self::new(settings.base_url.clone(), sender, http_client))
    }
}

#[async_trait]
impl MailSender for EmailClient {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        let url = format!("{}/email", self.base_url.trim_end_matches('/'));
        let request = SendEmailRequest {
            from: self.sender.inner(),
            to,
            subject,
            text_body: body,
        };

        self.http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| EmailError::ServiceUnavailable(e.to_string()))?;

        Ok(())
    }
}

/// Local sender that logs instead of delivering. The body is not logged
/// since it carries restore codes.
#[derive(Clone, Debug, Default)]
pub struct LogMailSender;

#[async_trait]
impl MailSender for LogMailSender {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), EmailError> {
        tracing::info!(to = %to, subject = %subject, "Email delivery stub");
        Ok(())
    }
}
