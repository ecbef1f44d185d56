//! Canned identity verifier.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::account::AuthError;
use crate::ports::{IdentityVerifier, VerifiedIdentity};

/// Maps preset ID tokens to identities; anything else is rejected.
#[derive(Default)]
pub struct StaticIdentityVerifier {
    identities: HashMap<String, VerifiedIdentity>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, token: impl Into<String>, identity: VerifiedIdentity) -> Self {
        self.identities.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedIdentity, AuthError> {
        self.identities
            .get(id_token)
            .cloned()
            .ok_or_else(|| AuthError::IdentityProvider("token rejected".into()))
    }
}
