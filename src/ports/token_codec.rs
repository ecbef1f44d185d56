//! TokenCodec port - issuing and verifying bearer credentials.

use crate::domain::account::AuthError;
use crate::domain::foundation::AccountId;

/// Verified claims extracted from a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub account_id: AccountId,
    pub email: String,
}

/// Port for the bearer credential codec.
pub trait TokenCodec: Send + Sync {
    /// Issue a signed credential for an account.
    fn issue(&self, account_id: AccountId, email: &str) -> Result<String, AuthError>;

    /// Verify signature and expiry, returning the embedded identity.
    ///
    /// Fails with `TokenExpired` on expiry and `MalformedToken` on any
    /// structural or signature problem.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}
