//! PostgreSQL implementation of the reset-token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::account::PasswordResetToken;
use crate::domain::foundation::{AccountId, DomainError, ResetTokenId};
use crate::ports::ResetTokenRepository;

use super::db_error;

pub struct PostgresResetTokenRepository {
    pool: PgPool,
}

impl PostgresResetTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ResetTokenRow {
    id: Uuid,
    account_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    used: bool,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<ResetTokenRow> for PasswordResetToken {
    fn from(row: ResetTokenRow) -> Self {
        PasswordResetToken {
            id: ResetTokenId::from_uuid(row.id),
            account_id: AccountId::from_uuid(row.account_id),
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            used: row.used,
            used_at: row.used_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ResetTokenRepository for PostgresResetTokenRepository {
    async fn create(
        &self,
        account_id: AccountId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordResetToken, DomainError> {
        let row = sqlx::query_as::<_, ResetTokenRow>(
            r#"
            INSERT INTO password_reset_tokens (id, account_id, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id.as_uuid())
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("failed to store reset token", e))?;

        Ok(row.into())
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>, DomainError> {
        let row = sqlx::query_as::<_, ResetTokenRow>(
            "SELECT * FROM password_reset_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("failed to load reset token", e))?;

        Ok(row.map(Into::into))
    }

    async fn consume_and_reset_password(
        &self,
        token_id: ResetTokenId,
        account_id: AccountId,
        new_password_hash: &str,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("failed to open transaction", e))?;

        // The guarded UPDATE is the single-use gate: of two concurrent
        // redemptions, exactly one sees used = false.
        let claimed = sqlx::query(
            r#"
            UPDATE password_reset_tokens
            SET used = true, used_at = now()
            WHERE id = $1 AND used = false
            "#,
        )
        .bind(token_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("failed to consume reset token", e))?;

        if claimed.rows_affected() == 0 {
            // Already consumed; leave the password untouched.
            return Ok(false);
        }

        sqlx::query("UPDATE accounts SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(account_id.as_uuid())
            .bind(new_password_hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("failed to set new password", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("failed to commit password reset", e))?;

        Ok(true)
    }
}
