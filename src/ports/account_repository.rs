//! AccountRepository port - persistent storage for accounts.
//!
//! Email uniqueness and provider-link uniqueness are enforced by database
//! constraints, not application code; implementations translate constraint
//! violations into the matching error codes.

use async_trait::async_trait;

use crate::domain::account::{Account, NewAccount, Role};
use crate::domain::foundation::{AccountId, DomainError};

/// Filter and paging for the admin user listing.
#[derive(Debug, Clone)]
pub struct AccountPage {
    /// 1-based page number.
    pub page: u32,
    /// Page size, 1..=100.
    pub limit: u32,
    /// Case-insensitive substring over email and display name.
    pub search: Option<String>,
}

/// Port for account storage.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// Fails with `ErrorCode::UserExists` when the email is already taken.
    async fn create(&self, account: NewAccount) -> Result<Account, DomainError>;

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DomainError>;

    /// Lookup by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Lookup through a provider link (provider, provider-issued subject).
    async fn find_by_provider(
        &self,
        provider: &str,
        provider_subject: &str,
    ) -> Result<Option<Account>, DomainError>;

    /// Attach a third-party identity to an existing account.
    ///
    /// Fails with `ErrorCode::ProviderLinkExists` when either uniqueness
    /// rule (per provider-subject, per account-provider) is violated.
    async fn link_provider(
        &self,
        account_id: AccountId,
        provider: &str,
        provider_subject: &str,
    ) -> Result<(), DomainError>;

    async fn update_password_hash(
        &self,
        account_id: AccountId,
        password_hash: &str,
    ) -> Result<(), DomainError>;

    async fn set_role(&self, account_id: AccountId, role: Role) -> Result<(), DomainError>;

    async fn set_active(&self, account_id: AccountId, is_active: bool) -> Result<(), DomainError>;

    /// Persist the billing-customer reference. Best-effort check-then-set;
    /// the column's unique constraint backstops concurrent writers.
    async fn set_stripe_customer_id(
        &self,
        account_id: AccountId,
        customer_id: &str,
    ) -> Result<(), DomainError>;

    /// Page through accounts for the admin listing.
    ///
    /// Returns the page of accounts plus the total row count.
    async fn list(&self, page: AccountPage) -> Result<(Vec<Account>, u64), DomainError>;
}
