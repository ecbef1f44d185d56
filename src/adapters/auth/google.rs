//! Google ID-token verification.
//!
//! Verifies the ID token the client obtained from Google Sign-In by asking
//! Google's tokeninfo endpoint, then checks that the token was minted for
//! our OAuth client and that Google has verified the email.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::account::AuthError;
use crate::ports::{IdentityVerifier, VerifiedIdentity};

const TOKENINFO_BASE_URL: &str = "https://oauth2.googleapis.com";

/// Claims returned by the tokeninfo endpoint (subset we care about).
#[derive(Debug, Deserialize)]
struct TokenInfo {
    sub: String,
    email: String,
    /// Google reports this as the string "true"/"false".
    email_verified: Option<String>,
    aud: String,
    name: Option<String>,
}

/// Verifier backed by Google's tokeninfo endpoint.
pub struct GoogleIdentityVerifier {
    client: reqwest::Client,
    client_id: Option<String>,
    base_url: String,
}

impl GoogleIdentityVerifier {
    pub fn new(client_id: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id,
            base_url: TOKENINFO_BASE_URL.to_string(),
        }
    }

    /// Point at a different endpoint (tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn check_claims(&self, info: TokenInfo) -> Result<VerifiedIdentity, AuthError> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| AuthError::IdentityProvider("Google login is not configured".into()))?;

        if info.aud != client_id {
            return Err(AuthError::IdentityProvider(
                "token audience does not match the configured client".into(),
            ));
        }
        if info.email_verified.as_deref() != Some("true") {
            return Err(AuthError::IdentityProvider(
                "email address is not verified with Google".into(),
            ));
        }

        Ok(VerifiedIdentity {
            provider: "google",
            subject: info.sub,
            email: info.email,
            display_name: info.name,
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedIdentity, AuthError> {
        // Fail fast before the network round trip when unconfigured.
        if self.client_id.is_none() {
            return Err(AuthError::IdentityProvider(
                "Google login is not configured".into(),
            ));
        }

        let url = format!("{}/tokeninfo", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| AuthError::IdentityProvider(format!("tokeninfo request failed: {}", e)))?;

        if !response.status().is_success() {
            // Google answers 400 for expired/garbage tokens.
            return Err(AuthError::IdentityProvider("token rejected by Google".into()));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| AuthError::IdentityProvider(format!("invalid tokeninfo response: {}", e)))?;

        self.check_claims(info)
    }
}
