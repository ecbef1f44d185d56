//! Authentication settings: JWT signing and the auth cookie.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum JWT secret length accepted in production.
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing secret for access tokens.
    pub jwt_secret: SecretString,

    /// Access token lifetime in days.
    #[serde(default = "defaults::token_ttl_days")]
    pub token_ttl_days: u64,

    /// Name of the HTTP-only auth cookie.
    #[serde(default = "defaults::cookie_name")]
    pub cookie_name: String,

    /// OAuth client id for Google sign-in; absent disables the endpoint.
    #[serde(default)]
    pub google_client_id: Option<String>,
}

mod defaults {
    pub fn token_ttl_days() -> u64 {
        30
    }
    pub fn cookie_name() -> String {
        "lk_token".to_string()
    }
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_days * 24 * 60 * 60)
    }

    /// Production requires a signing secret of at least 32 bytes; any
    /// non-empty secret is accepted in development.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.jwt_secret.expose_secret().is_empty() {
            return Err(ValidationError::missing("AUTH__JWT_SECRET"));
        }
        if *environment == Environment::Production
            && self.jwt_secret.expose_secret().len() < MIN_SECRET_LEN
        {
            return Err(ValidationError::new(
                "AUTH__JWT_SECRET",
                "must be at least 32 bytes in production",
            ));
        }
        if self.cookie_name.is_empty() {
            return Err(ValidationError::missing("AUTH__COOKIE_NAME"));
        }
        if self.token_ttl_days == 0 || self.token_ttl_days > 365 {
            return Err(ValidationError::new(
                "AUTH__TOKEN_TTL_DAYS",
                "must be between 1 and 365",
            ));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::new(String::new()),
            token_ttl_days: defaults::token_ttl_days(),
            cookie_name: defaults::cookie_name(),
            google_client_id: None,
        }
    }
}
