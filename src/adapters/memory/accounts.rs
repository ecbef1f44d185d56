//! In-memory account repository.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::account::{Account, NewAccount, ProviderLink, Role};
use crate::domain::foundation::{AccountId, DomainError, ErrorCode};
use crate::ports::{AccountPage, AccountRepository};

#[derive(Default)]
struct Inner {
    accounts: Vec<Account>,
    links: Vec<ProviderLink>,
}

/// Mutex-backed account store enforcing the same uniqueness rules as the
/// database constraints.
#[derive(Default)]
pub struct MemoryAccountRepository {
    inner: Mutex<Inner>,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup by billing-customer reference (used by the memory ledger).
    pub fn find_by_stripe_customer(&self, customer_id: &str) -> Option<Account> {
        self.inner
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.stripe_customer_id.as_deref() == Some(customer_id))
            .cloned()
    }

    fn not_found() -> DomainError {
        DomainError::new(ErrorCode::AccountNotFound, "Account not found")
    }

    fn update<F>(&self, id: AccountId, apply: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut Account),
    {
        let mut inner = self.inner.lock().unwrap();
        let account = inner
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(Self::not_found)?;
        apply(account);
        account.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.accounts.iter().any(|a| a.email == account.email) {
            return Err(DomainError::new(
                ErrorCode::UserExists,
                "Email is already registered",
            ));
        }

        let now = Utc::now();
        let created = Account {
            id: AccountId::generate(),
            email: account.email,
            password_hash: account.password_hash,
            display_name: account.display_name,
            role: account.role,
            is_active: true,
            stripe_customer_id: None,
            created_at: now,
            updated_at: now,
        };
        inner.accounts.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DomainError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_by_provider(
        &self,
        provider: &str,
        provider_subject: &str,
    ) -> Result<Option<Account>, DomainError> {
        let inner = self.inner.lock().unwrap();
        let account_id = inner
            .links
            .iter()
            .find(|l| l.provider == provider && l.provider_subject == provider_subject)
            .map(|l| l.account_id);
        Ok(account_id.and_then(|id| inner.accounts.iter().find(|a| a.id == id).cloned()))
    }

    async fn link_provider(
        &self,
        account_id: AccountId,
        provider: &str,
        provider_subject: &str,
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let duplicate = inner.links.iter().any(|l| {
            (l.provider == provider && l.provider_subject == provider_subject)
                || (l.account_id == account_id && l.provider == provider)
        });
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::ProviderLinkExists,
                "Identity is already linked",
            ));
        }
        inner.links.push(ProviderLink {
            account_id,
            provider: provider.to_string(),
            provider_subject: provider_subject.to_string(),
        });
        Ok(())
    }

    async fn update_password_hash(
        &self,
        account_id: AccountId,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        self.update(account_id, |a| {
            a.password_hash = Some(password_hash.to_string());
        })
    }

    async fn set_role(&self, account_id: AccountId, role: Role) -> Result<(), DomainError> {
        self.update(account_id, |a| a.role = role)
    }

    async fn set_active(&self, account_id: AccountId, is_active: bool) -> Result<(), DomainError> {
        self.update(account_id, |a| a.is_active = is_active)
    }

    async fn set_stripe_customer_id(
        &self,
        account_id: AccountId,
        customer_id: &str,
    ) -> Result<(), DomainError> {
        // First writer wins, mirroring the COALESCE in the Postgres adapter.
        self.update(account_id, |a| {
            if a.stripe_customer_id.is_none() {
                a.stripe_customer_id = Some(customer_id.to_string());
            }
        })
    }

    async fn list(&self, page: AccountPage) -> Result<(Vec<Account>, u64), DomainError> {
        let inner = self.inner.lock().unwrap();
        let needle = page.search.as_ref().map(|s| s.to_lowercase());
        let mut matching: Vec<Account> = inner
            .accounts
            .iter()
            .filter(|a| match &needle {
                Some(needle) => {
                    a.email.to_lowercase().contains(needle)
                        || a.display_name
                            .as_ref()
                            .is_some_and(|n| n.to_lowercase().contains(needle))
                }
                None => true,
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let offset = (page.page.saturating_sub(1) as usize) * page.limit as usize;
        let page_items = matching
            .into_iter()
            .skip(offset)
            .take(page.limit as usize)
            .collect();
        Ok((page_items, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password_hash: Some("hash".to_string()),
            display_name: None,
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = MemoryAccountRepository::new();
        repo.create(new_account("a@x.com")).await.unwrap();

        let err = repo.create(new_account("a@x.com")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserExists);
    }

    #[tokio::test]
    async fn provider_link_uniqueness_is_enforced_both_ways() {
        let repo = MemoryAccountRepository::new();
        let a = repo.create(new_account("a@x.com")).await.unwrap();
        let b = repo.create(new_account("b@x.com")).await.unwrap();

        repo.link_provider(a.id, "google", "sub-1").await.unwrap();
        // Same provider subject on another account
        assert!(repo.link_provider(b.id, "google", "sub-1").await.is_err());
        // Second link for the same provider on the same account
        assert!(repo.link_provider(a.id, "google", "sub-2").await.is_err());
    }

    #[tokio::test]
    async fn stripe_customer_id_keeps_first_writer() {
        let repo = MemoryAccountRepository::new();
        let a = repo.create(new_account("a@x.com")).await.unwrap();

        repo.set_stripe_customer_id(a.id, "cus_1").await.unwrap();
        repo.set_stripe_customer_id(a.id, "cus_2").await.unwrap();

        let reloaded = repo.find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(reloaded.stripe_customer_id.as_deref(), Some("cus_1"));
    }

    #[tokio::test]
    async fn list_searches_email_and_display_name() {
        let repo = MemoryAccountRepository::new();
        repo.create(NewAccount {
            display_name: Some("Alice Smith".to_string()),
            ..new_account("alice@x.com")
        })
        .await
        .unwrap();
        repo.create(new_account("bob@x.com")).await.unwrap();

        let (found, total) = repo
            .list(AccountPage {
                page: 1,
                limit: 10,
                search: Some("smith".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].email, "alice@x.com");
    }
}
