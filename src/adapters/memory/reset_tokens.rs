//! In-memory reset-token repository.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::account::PasswordResetToken;
use crate::domain::foundation::{AccountId, DomainError, ResetTokenId};
use crate::ports::{AccountRepository, ResetTokenRepository};

use super::MemoryAccountRepository;

/// Holds the account store so consuming a token can swap the password
/// hash in the same logical step, like the Postgres transaction does.
pub struct MemoryResetTokenRepository {
    accounts: Arc<MemoryAccountRepository>,
    tokens: Mutex<Vec<PasswordResetToken>>,
}

impl MemoryResetTokenRepository {
    pub fn new(accounts: Arc<MemoryAccountRepository>) -> Self {
        Self {
            accounts,
            tokens: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ResetTokenRepository for MemoryResetTokenRepository {
    async fn create(
        &self,
        account_id: AccountId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordResetToken, DomainError> {
        let token = PasswordResetToken {
            id: ResetTokenId::generate(),
            account_id,
            token_hash: token_hash.to_string(),
            expires_at,
            used: false,
            used_at: None,
            created_at: Utc::now(),
        };
        self.tokens.lock().unwrap().push(token.clone());
        Ok(token)
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>, DomainError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn consume_and_reset_password(
        &self,
        token_id: ResetTokenId,
        account_id: AccountId,
        new_password_hash: &str,
    ) -> Result<bool, DomainError> {
        {
            let mut tokens = self.tokens.lock().unwrap();
            let Some(token) = tokens.iter_mut().find(|t| t.id == token_id) else {
                return Ok(false);
            };
            if token.used {
                return Ok(false);
            }
            token.used = true;
            token.used_at = Some(Utc::now());
        }

        self.accounts
            .update_password_hash(account_id, new_password_hash)
            .await?;
        Ok(true)
    }
}
