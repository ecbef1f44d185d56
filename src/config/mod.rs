//! Typed application configuration.
//!
//! Settings come from the environment (plus an optional `.env` file in
//! development), prefixed `LAUNCHKIT` and nested with double underscores:
//! `LAUNCHKIT__SERVER__PORT=8080` lands in `server.port`. Loading only
//! deserializes; call [`AppConfig::validate`] before using the values.

mod auth;
mod database;
mod email;
mod error;
mod payment;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root of all configuration sections.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub payment: PaymentConfig,
    pub email: EmailConfig,
}

impl AppConfig {
    /// Reads configuration from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        // A .env file is a development convenience; absence is fine.
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LAUNCHKIT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Checks every section's semantic rules (URL shapes, key prefixes,
    /// pool bounds, production-only requirements).
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.payment.validate()?;
        self.email.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
