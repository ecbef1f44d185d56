//! IdentityVerifier port - third-party identity (social login) verification.

use async_trait::async_trait;

use crate::domain::account::AuthError;

/// Identity asserted by a third-party provider after token verification.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Provider name as stored on the link (e.g. "google").
    pub provider: &'static str,
    /// Provider-issued stable subject id.
    pub subject: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Port for verifying provider-issued identity tokens.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify an ID token with the upstream provider.
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedIdentity, AuthError>;
}
