//! Mailer port - outbound transactional email.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// A transactional email ready for delivery.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Port for sending transactional email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError>;
}
