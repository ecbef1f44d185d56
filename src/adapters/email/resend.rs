//! Resend implementation of the mailer port.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{EmailMessage, Mailer};

const RESEND_BASE_URL: &str = "https://api.resend.com";

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Transactional mail delivery through the Resend API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: SecretString,
    from: String,
    base_url: String,
}

impl ResendMailer {
    /// `from` is the full header value, e.g. `Launchkit <noreply@launchkit.dev>`.
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: SecretString::new(api_key.into()),
            from: from.into(),
            base_url: RESEND_BASE_URL.to_string(),
        }
    }

    /// Point at a different endpoint (tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError> {
        let url = format!("{}/emails", self.base_url);
        let body = SendRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html_body,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::MailError, format!("mail request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(%status, %detail, "Resend delivery failed");
            return Err(DomainError::new(
                ErrorCode::MailError,
                format!("mail provider answered {}", status),
            ));
        }

        Ok(())
    }
}
