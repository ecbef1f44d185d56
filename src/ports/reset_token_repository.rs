//! ResetTokenRepository port - single-use password reset tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::account::PasswordResetToken;
use crate::domain::foundation::{AccountId, DomainError, ResetTokenId};

/// Port for reset-token storage.
#[async_trait]
pub trait ResetTokenRepository: Send + Sync {
    /// Store a freshly issued token (digest only, never the secret).
    async fn create(
        &self,
        account_id: AccountId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordResetToken, DomainError>;

    /// Look a token up by the digest of its secret.
    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>, DomainError>;

    /// Consume the token and set the account's new password hash in one
    /// transaction. Returns `false` when the token was already consumed by
    /// a concurrent request (the guarded UPDATE touched zero rows), in
    /// which case the password is left unchanged.
    async fn consume_and_reset_password(
        &self,
        token_id: ResetTokenId,
        account_id: AccountId,
        new_password_hash: &str,
    ) -> Result<bool, DomainError>;
}
