//! WebhookLedger port - transactional dedup ledger for provider events.
//!
//! Stripe delivers at-least-once; this port collapses redeliveries to
//! at-most-once side effects. Implementations run the whole protocol in a
//! single database transaction:
//!
//! 1. insert-or-ignore the event id into the ledger (claims it; the
//!    primary key arbitrates concurrent duplicate deliveries)
//! 2. if the row already exists with `processed_at` set, commit nothing -
//!    the event was fully handled before
//! 3. apply the subscription upsert, resolving the owning account from
//!    the billing-customer reference
//! 4. stamp the ledger row's `processed_at`
//!
//! A failed transaction leaves `processed_at` null, so a retried delivery
//! safely redoes the work.

use async_trait::async_trait;

use crate::domain::billing::SubscriptionPatch;
use crate::domain::foundation::DomainError;

/// The ledger row for one provider event.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    /// Provider-issued unique event id (evt_xxx).
    pub event_id: String,
    /// Provider event type string.
    pub event_type: String,
    /// Raw event payload, retained for debugging and audit.
    pub payload: serde_json::Value,
}

/// Result of running the idempotency protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// This call claimed the event and applied the transition.
    Processed,
    /// The event id was already fully processed; nothing was done.
    AlreadyProcessed,
}

/// Port for the webhook event ledger.
#[async_trait]
pub trait WebhookLedger: Send + Sync {
    /// Run the idempotency protocol for one event.
    ///
    /// `patch` is `None` for acknowledged-but-ignored event types; the
    /// event is still recorded and stamped so replays short-circuit.
    async fn process(
        &self,
        entry: LedgerEntry,
        patch: Option<SubscriptionPatch>,
    ) -> Result<LedgerOutcome, DomainError>;
}
