//! Outbound email (Resend) and customer-app link settings.

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key (`re_...`).
    pub resend_api_key: String,

    #[serde(default = "defaults::from_email")]
    pub from_email: String,

    #[serde(default = "defaults::from_name")]
    pub from_name: String,

    /// Origin of the customer SPA; password-reset links and checkout
    /// redirects are built against it.
    pub app_base_url: String,
}

mod defaults {
    pub fn from_email() -> String {
        "noreply@launchkit.dev".to_string()
    }
    pub fn from_name() -> String {
        "Launchkit".to_string()
    }
}

impl EmailConfig {
    /// Full From header value, e.g. `Launchkit <noreply@launchkit.dev>`.
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.resend_api_key.is_empty() {
            return Err(ValidationError::missing("EMAIL__RESEND_API_KEY"));
        }
        if !self.resend_api_key.starts_with("re_") {
            return Err(ValidationError::new(
                "EMAIL__RESEND_API_KEY",
                "must start with re_",
            ));
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::new(
                "EMAIL__FROM_EMAIL",
                "must be an email address",
            ));
        }
        if self.app_base_url.is_empty() {
            return Err(ValidationError::missing("EMAIL__APP_BASE_URL"));
        }
        if !self.app_base_url.starts_with("http://") && !self.app_base_url.starts_with("https://") {
            return Err(ValidationError::new(
                "EMAIL__APP_BASE_URL",
                "must be an http(s) URL",
            ));
        }
        Ok(())
    }
}
