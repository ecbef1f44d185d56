//! In-memory webhook ledger.
//!
//! Mirrors the Postgres protocol: an event id claims an entry, a stamped
//! entry short-circuits, and the subscription mirror is keyed by the
//! external subscription id with last-write-wins semantics.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use async_trait::async_trait;

use crate::domain::billing::SubscriptionPatch;
use crate::domain::foundation::{AccountId, DomainError, ErrorCode};
use crate::ports::{LedgerEntry, LedgerOutcome, WebhookLedger};

use super::MemoryAccountRepository;

/// A subscription row as the memory ledger stores it.
#[derive(Debug, Clone)]
pub struct StoredSubscription {
    pub account_id: AccountId,
    pub patch: SubscriptionPatch,
}

#[derive(Default)]
struct Inner {
    /// event id -> processed_at
    events: HashMap<String, Option<DateTime<Utc>>>,
    /// external subscription id -> stored row
    subscriptions: HashMap<String, StoredSubscription>,
}

pub struct MemoryWebhookLedger {
    accounts: Arc<MemoryAccountRepository>,
    inner: Mutex<Inner>,
}

impl MemoryWebhookLedger {
    pub fn new(accounts: Arc<MemoryAccountRepository>) -> Self {
        Self {
            accounts,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// The stored subscription row, for test assertions.
    pub fn subscription(&self, stripe_subscription_id: &str) -> Option<StoredSubscription> {
        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .get(stripe_subscription_id)
            .cloned()
    }

    /// Number of recorded events, for test assertions.
    pub fn event_count(&self) -> usize {
        self.inner.lock().unwrap().events.len()
    }
}

#[async_trait]
impl WebhookLedger for MemoryWebhookLedger {
    async fn process(
        &self,
        entry: LedgerEntry,
        patch: Option<SubscriptionPatch>,
    ) -> Result<LedgerOutcome, DomainError> {
        // Resolve the owning account outside the ledger lock.
        let resolved = match &patch {
            Some(patch) => {
                let account = self
                    .accounts
                    .find_by_stripe_customer(&patch.stripe_customer_id)
                    .ok_or_else(|| {
                        DomainError::new(
                            ErrorCode::AccountNotFound,
                            format!(
                                "no account for billing customer {}",
                                patch.stripe_customer_id
                            ),
                        )
                    })?;
                Some(account.id)
            }
            None => None,
        };

        let mut inner = self.inner.lock().unwrap();
        if let Some(Some(_)) = inner.events.get(&entry.event_id) {
            return Ok(LedgerOutcome::AlreadyProcessed);
        }

        if let (Some(patch), Some(account_id)) = (patch, resolved) {
            inner.subscriptions.insert(
                patch.stripe_subscription_id.clone(),
                StoredSubscription { account_id, patch },
            );
        }
        inner.events.insert(entry.event_id, Some(Utc::now()));
        Ok(LedgerOutcome::Processed)
    }
}
