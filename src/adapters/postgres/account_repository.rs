//! PostgreSQL implementation of the account repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::account::{Account, NewAccount, Role};
use crate::domain::foundation::{AccountId, DomainError, ErrorCode};
use crate::ports::{AccountPage, AccountRepository};

use super::{db_error, violated_constraint};

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
    display_name: Option<String>,
    role: String,
    is_active: bool,
    stripe_customer_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = DomainError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("invalid role value '{}'", row.role),
            )
        })?;

        Ok(Account {
            id: AccountId::from_uuid(row.id),
            email: row.email,
            password_hash: row.password_hash,
            display_name: row.display_name,
            role,
            is_active: row.is_active,
            stripe_customer_id: row.stripe_customer_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, DomainError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, email, password_hash, display_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.display_name)
        .bind(account.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violated_constraint(&e) == Some("accounts_email_key") {
                return DomainError::new(ErrorCode::UserExists, "Email is already registered");
            }
            db_error("failed to create account", e)
        })?;

        row.try_into()
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DomainError> {
        sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("failed to load account", e))?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("failed to load account by email", e))?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn find_by_provider(
        &self,
        provider: &str,
        provider_subject: &str,
    ) -> Result<Option<Account>, DomainError> {
        sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT a.* FROM accounts a
            JOIN provider_links pl ON pl.account_id = a.id
            WHERE pl.provider = $1 AND pl.provider_subject = $2
            "#,
        )
        .bind(provider)
        .bind(provider_subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("failed to load account by provider", e))?
        .map(TryInto::try_into)
        .transpose()
    }

    async fn link_provider(
        &self,
        account_id: AccountId,
        provider: &str,
        provider_subject: &str,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO provider_links (id, account_id, provider, provider_subject)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id.as_uuid())
        .bind(provider)
        .bind(provider_subject)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if matches!(
                violated_constraint(&e),
                Some("provider_links_provider_subject_key")
                    | Some("provider_links_account_provider_key")
            ) {
                return DomainError::new(
                    ErrorCode::ProviderLinkExists,
                    "Identity is already linked",
                );
            }
            db_error("failed to link provider", e)
        })?;

        Ok(())
    }

    async fn update_password_hash(
        &self,
        account_id: AccountId,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE accounts SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(account_id.as_uuid())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("failed to update password", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                "Account not found",
            ));
        }
        Ok(())
    }

    async fn set_role(&self, account_id: AccountId, role: Role) -> Result<(), DomainError> {
        let result =
            sqlx::query("UPDATE accounts SET role = $2, updated_at = now() WHERE id = $1")
                .bind(account_id.as_uuid())
                .bind(role.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("failed to update role", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                "Account not found",
            ));
        }
        Ok(())
    }

    async fn set_active(&self, account_id: AccountId, is_active: bool) -> Result<(), DomainError> {
        let result =
            sqlx::query("UPDATE accounts SET is_active = $2, updated_at = now() WHERE id = $1")
                .bind(account_id.as_uuid())
                .bind(is_active)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("failed to update status", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                "Account not found",
            ));
        }
        Ok(())
    }

    async fn set_stripe_customer_id(
        &self,
        account_id: AccountId,
        customer_id: &str,
    ) -> Result<(), DomainError> {
        // First writer wins: a concurrent provisioning race keeps whichever
        // customer id landed first, and the partial unique index backstops
        // the same id being attached to two accounts.
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET stripe_customer_id = COALESCE(stripe_customer_id, $2), updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(customer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("failed to persist billing customer", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                "Account not found",
            ));
        }
        Ok(())
    }

    async fn list(&self, page: AccountPage) -> Result<(Vec<Account>, u64), DomainError> {
        let pattern = page.search.as_ref().map(|s| format!("%{}%", s));
        let offset = i64::from(page.page.saturating_sub(1)) * i64::from(page.limit);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM accounts
            WHERE $1::text IS NULL OR email ILIKE $1 OR display_name ILIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("failed to count accounts", e))?;

        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT * FROM accounts
            WHERE $1::text IS NULL OR email ILIKE $1 OR display_name ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(i64::from(page.limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("failed to list accounts", e))?;

        let accounts = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((accounts, total as u64))
    }
}
