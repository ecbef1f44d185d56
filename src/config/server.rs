//! Server binding, environment, and request-handling settings.

use std::net::{IpAddr, SocketAddr};

use serde::Deserialize;

use super::error::ValidationError;

/// Deployment flavor of the running process.
///
/// Development relaxes cookie security and exposes error details;
/// staging and production only differ in how they appear in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address; must parse as an IP.
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// Tracing filter applied when `RUST_LOG` is not set.
    pub log_level: String,
    /// Budget for a whole request, in seconds.
    pub request_timeout_secs: u64,
    /// Comma-separated origins allowed to send credentialed requests.
    pub cors_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: Environment::Development,
            log_level: "info,launchkit=debug,sqlx=warn".to_string(),
            request_timeout_secs: 30,
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    /// The address the listener binds.
    ///
    /// `validate` has already checked that `host` parses.
    pub fn socket_addr(&self) -> SocketAddr {
        let ip: IpAddr = self.host.parse().expect("host is validated at startup");
        SocketAddr::new(ip, self.port)
    }

    /// CORS origins, split on commas and trimmed.
    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .map(|raw| raw.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_default()
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.parse::<IpAddr>().is_err() {
            return Err(ValidationError::new(
                "SERVER__HOST",
                "must be an IP address",
            ));
        }
        if self.port == 0 {
            return Err(ValidationError::new("SERVER__PORT", "must not be zero"));
        }
        if !(1..=300).contains(&self.request_timeout_secs) {
            return Err(ValidationError::new(
                "SERVER__REQUEST_TIMEOUT_SECS",
                "must be between 1 and 300",
            ));
        }
        Ok(())
    }
}
