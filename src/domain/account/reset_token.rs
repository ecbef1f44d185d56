//! Password reset tokens.
//!
//! Only a one-way digest of the secret is ever stored; the raw token lives
//! in the emailed link and nowhere else. Tokens are single-use: once
//! consumed they never authorize a second reset, regardless of expiry.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::foundation::{AccountId, ResetTokenId};

use super::errors::AuthError;

/// Lifetime of a freshly issued reset token.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Number of random bytes in the raw secret (hex-encoded for the link).
const SECRET_BYTES: usize = 32;

/// Stored reset token row.
#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub id: ResetTokenId,
    pub account_id: AccountId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Checks that the token may still be redeemed at `now`.
    ///
    /// Used tokens are rejected before expiry is even considered.
    pub fn ensure_redeemable(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        if self.used {
            return Err(AuthError::InvalidResetToken);
        }
        if now >= self.expires_at {
            return Err(AuthError::InvalidResetToken);
        }
        Ok(())
    }
}

/// A freshly generated secret plus the digest to store.
#[derive(Debug, Clone)]
pub struct ResetSecret {
    /// Hex-encoded raw token; goes into the emailed link.
    pub raw: String,
    /// SHA-256 digest of the raw token; goes into the database.
    pub hash: String,
    /// Expiry computed from issue time.
    pub expires_at: DateTime<Utc>,
}

/// Generates a new reset secret with a random 32-byte token.
pub fn generate_secret(now: DateTime<Utc>) -> ResetSecret {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    let raw = hex::encode(bytes);
    ResetSecret {
        hash: hash_secret(&raw),
        raw,
        expires_at: now + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
    }
}

/// Digest of a raw token, as stored and looked up.
pub fn hash_secret(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(used: bool, expires_in_minutes: i64) -> PasswordResetToken {
        let now = Utc::now();
        PasswordResetToken {
            id: ResetTokenId::generate(),
            account_id: AccountId::generate(),
            token_hash: hash_secret("raw"),
            expires_at: now + Duration::minutes(expires_in_minutes),
            used,
            used_at: used.then(|| now),
            created_at: now,
        }
    }

    #[test]
    fn fresh_token_is_redeemable() {
        assert!(token(false, 30).ensure_redeemable(Utc::now()).is_ok());
    }

    #[test]
    fn used_token_is_rejected_even_before_expiry() {
        let t = token(true, 30);
        assert_eq!(
            t.ensure_redeemable(Utc::now()),
            Err(AuthError::InvalidResetToken)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let t = token(false, -1);
        assert_eq!(
            t.ensure_redeemable(Utc::now()),
            Err(AuthError::InvalidResetToken)
        );
    }

    #[test]
    fn generate_secret_produces_distinct_tokens() {
        let now = Utc::now();
        let a = generate_secret(now);
        let b = generate_secret(now);
        assert_ne!(a.raw, b.raw);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn hash_is_stable_and_not_the_raw_value() {
        let now = Utc::now();
        let secret = generate_secret(now);
        assert_eq!(hash_secret(&secret.raw), secret.hash);
        assert_ne!(secret.raw, secret.hash);
        // 32 bytes of SHA-256, hex-encoded
        assert_eq!(secret.hash.len(), 64);
    }

    #[test]
    fn expiry_is_one_hour_out() {
        let now = Utc::now();
        let secret = generate_secret(now);
        assert_eq!(secret.expires_at, now + Duration::minutes(60));
    }
}
