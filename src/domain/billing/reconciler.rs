//! Subscription webhook reconciler.
//!
//! Consumes provider events, deduplicates them, and applies idempotent
//! state transitions to the local subscription mirror. The *decision* of
//! what an event does is a pure function (`plan`) so every branch is
//! testable without I/O; the transaction that makes it stick lives behind
//! the [`WebhookLedger`] port.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::ports::{BillingProvider, LedgerEntry, LedgerOutcome, ProviderSubscription, WebhookLedger};

use super::stripe_event::{StripeEvent, StripeEventType, SubscriptionObject};
use super::subscription::{SubscriptionPatch, SubscriptionStatus};
use super::webhook_errors::WebhookError;
use super::stripe_event::InvoiceObject;

/// What a verified event asks the system to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilePlan {
    /// Upsert the subscription exactly as the payload describes it.
    Apply(SubscriptionPatch),
    /// The payload alone is not trusted: re-fetch the subscription from
    /// the provider, then upsert (optionally forcing `past_due`).
    RefetchThenApply {
        subscription_id: String,
        force_past_due: bool,
    },
    /// Acknowledge with no state change.
    Ignore(&'static str),
}

/// Result of processing one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A subscription transition was applied.
    Applied,
    /// The event id was already processed; nothing happened.
    AlreadyProcessed,
    /// The event type carries no subscription state; acknowledged only.
    Ignored,
}

/// Decides the transition for a verified event. Pure.
pub fn plan(event: &StripeEvent) -> Result<ReconcilePlan, WebhookError> {
    match event.parsed_type() {
        StripeEventType::SubscriptionCreated
        | StripeEventType::SubscriptionUpdated
        | StripeEventType::SubscriptionDeleted => {
            let object: SubscriptionObject = event
                .deserialize_object()
                .map_err(|e| WebhookError::ParseError(e.to_string()))?;
            Ok(ReconcilePlan::Apply(patch_from_object(&object)?))
        }
        StripeEventType::InvoicePaid => invoice_plan(event, false),
        StripeEventType::InvoicePaymentFailed => invoice_plan(event, true),
        StripeEventType::Unknown => Ok(ReconcilePlan::Ignore("unhandled event type")),
    }
}

fn invoice_plan(event: &StripeEvent, force_past_due: bool) -> Result<ReconcilePlan, WebhookError> {
    let invoice: InvoiceObject = event
        .deserialize_object()
        .map_err(|e| WebhookError::ParseError(e.to_string()))?;
    match invoice.subscription {
        Some(subscription_id) => Ok(ReconcilePlan::RefetchThenApply {
            subscription_id,
            force_past_due,
        }),
        // One-off invoices carry no subscription state
        None => Ok(ReconcilePlan::Ignore("invoice without subscription")),
    }
}

/// Builds the upsert from the payload of a `customer.subscription.*` event.
fn patch_from_object(object: &SubscriptionObject) -> Result<SubscriptionPatch, WebhookError> {
    let status = SubscriptionStatus::parse(&object.status)
        .ok_or_else(|| WebhookError::ParseError(format!("unknown status '{}'", object.status)))?;

    Ok(SubscriptionPatch {
        stripe_subscription_id: object.id.clone(),
        stripe_customer_id: object.customer.clone(),
        stripe_product_id: object.product_id(),
        stripe_price_id: object.price_id(),
        status,
        current_period_start: to_datetime(object.current_period_start),
        current_period_end: to_datetime(object.current_period_end),
        cancel_at_period_end: object.cancel_at_period_end,
    })
}

/// Builds the upsert from a freshly re-fetched provider subscription.
///
/// A failed invoice always demotes the subscription, whatever the provider
/// currently reports.
pub fn patch_from_provider(
    subscription: ProviderSubscription,
    force_past_due: bool,
) -> SubscriptionPatch {
    let status = if force_past_due {
        SubscriptionStatus::PastDue
    } else {
        subscription.status
    };

    SubscriptionPatch {
        stripe_subscription_id: subscription.id,
        stripe_customer_id: subscription.customer_id,
        stripe_product_id: subscription.product_id,
        stripe_price_id: subscription.price_id,
        status,
        current_period_start: to_datetime(subscription.current_period_start),
        current_period_end: to_datetime(subscription.current_period_end),
        cancel_at_period_end: subscription.cancel_at_period_end,
    }
}

fn to_datetime(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

/// Processes verified webhook events with at-most-once side effects.
pub struct SubscriptionReconciler {
    ledger: Arc<dyn WebhookLedger>,
    provider: Arc<dyn BillingProvider>,
}

impl SubscriptionReconciler {
    pub fn new(ledger: Arc<dyn WebhookLedger>, provider: Arc<dyn BillingProvider>) -> Self {
        Self { ledger, provider }
    }

    /// Plans the transition, re-fetching from the provider where the plan
    /// requires it, then runs the ledger's transactional protocol.
    ///
    /// The provider call happens before the transaction opens; the ledger
    /// either commits the whole transition or leaves the event unclaimed
    /// for redelivery.
    pub async fn process(&self, event: StripeEvent) -> Result<ReconcileOutcome, WebhookError> {
        let planned = plan(&event)?;

        let (patch, ignored) = match planned {
            ReconcilePlan::Apply(patch) => (Some(patch), false),
            ReconcilePlan::RefetchThenApply {
                subscription_id,
                force_past_due,
            } => {
                let subscription = self
                    .provider
                    .get_subscription(&subscription_id)
                    .await
                    .map_err(|e| WebhookError::Provider(e.to_string()))?
                    .ok_or(WebhookError::SubscriptionNotFound)?;
                (Some(patch_from_provider(subscription, force_past_due)), false)
            }
            ReconcilePlan::Ignore(reason) => {
                tracing::debug!(event_id = %event.id, event_type = %event.event_type, reason, "webhook event ignored");
                (None, true)
            }
        };

        let entry = LedgerEntry {
            event_id: event.id.clone(),
            event_type: event.event_type.clone(),
            payload: serde_json::to_value(&event)
                .map_err(|e| WebhookError::ParseError(e.to_string()))?,
        };

        match self
            .ledger
            .process(entry, patch)
            .await
            .map_err(|e| WebhookError::Database(e.to_string()))?
        {
            LedgerOutcome::Processed => {
                if ignored {
                    Ok(ReconcileOutcome::Ignored)
                } else {
                    Ok(ReconcileOutcome::Applied)
                }
            }
            LedgerOutcome::AlreadyProcessed => Ok(ReconcileOutcome::AlreadyProcessed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::stripe_event::StripeEventBuilder;
    use crate::domain::foundation::DomainError;
    use crate::ports::PaymentError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // ══════════════════════════════════════════════════════════════
    // Test Infrastructure
    // ══════════════════════════════════════════════════════════════

    /// Ledger double that records processed ids and applied patches.
    #[derive(Default)]
    struct RecordingLedger {
        processed: Mutex<HashMap<String, Option<SubscriptionPatch>>>,
    }

    impl RecordingLedger {
        fn applied_patch(&self, event_id: &str) -> Option<SubscriptionPatch> {
            self.processed
                .lock()
                .unwrap()
                .get(event_id)
                .cloned()
                .flatten()
        }
    }

    #[async_trait]
    impl WebhookLedger for RecordingLedger {
        async fn process(
            &self,
            entry: LedgerEntry,
            patch: Option<SubscriptionPatch>,
        ) -> Result<LedgerOutcome, DomainError> {
            let mut processed = self.processed.lock().unwrap();
            if processed.contains_key(&entry.event_id) {
                return Ok(LedgerOutcome::AlreadyProcessed);
            }
            processed.insert(entry.event_id, patch);
            Ok(LedgerOutcome::Processed)
        }
    }

    /// Provider double returning a canned subscription.
    struct StubProvider {
        subscription: Option<ProviderSubscription>,
    }

    #[async_trait]
    impl BillingProvider for StubProvider {
        async fn create_customer(
            &self,
            _email: &str,
            _name: Option<&str>,
            _account_id: crate::domain::foundation::AccountId,
        ) -> Result<crate::ports::BillingCustomer, PaymentError> {
            unimplemented!("not used by the reconciler")
        }

        async fn create_checkout_session(
            &self,
            _customer_id: &str,
            _price_id: &str,
            _success_url: &str,
            _cancel_url: &str,
        ) -> Result<crate::ports::CheckoutSession, PaymentError> {
            unimplemented!("not used by the reconciler")
        }

        async fn get_checkout_session(
            &self,
            _session_id: &str,
        ) -> Result<Option<crate::ports::CheckoutConfirmation>, PaymentError> {
            unimplemented!("not used by the reconciler")
        }

        async fn create_portal_session(
            &self,
            _customer_id: &str,
            _return_url: &str,
        ) -> Result<crate::ports::PortalSession, PaymentError> {
            unimplemented!("not used by the reconciler")
        }

        async fn get_subscription(
            &self,
            _subscription_id: &str,
        ) -> Result<Option<ProviderSubscription>, PaymentError> {
            Ok(self.subscription.clone())
        }

        async fn list_prices(
            &self,
        ) -> Result<Vec<crate::domain::billing::SubscriptionPrice>, PaymentError> {
            Ok(vec![])
        }
    }

    fn subscription_object(status: &str) -> serde_json::Value {
        json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": status,
            "cancel_at_period_end": false,
            "current_period_start": 1704067200,
            "current_period_end": 1706745600,
            "items": {"data": [{"price": {"id": "price_1", "product": "prod_1"}}]}
        })
    }

    fn provider_subscription(status: SubscriptionStatus) -> ProviderSubscription {
        ProviderSubscription {
            id: "sub_1".to_string(),
            customer_id: "cus_1".to_string(),
            status,
            product_id: Some("prod_1".to_string()),
            price_id: Some("price_1".to_string()),
            current_period_start: Some(1704067200),
            current_period_end: Some(1706745600),
            cancel_at_period_end: false,
        }
    }

    // ══════════════════════════════════════════════════════════════
    // plan() Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn subscription_updated_takes_status_verbatim() {
        let event = StripeEventBuilder::new()
            .event_type("customer.subscription.updated")
            .object(subscription_object("trialing"))
            .build();

        let planned = plan(&event).unwrap();

        match planned {
            ReconcilePlan::Apply(patch) => {
                assert_eq!(patch.status, SubscriptionStatus::Trialing);
                assert_eq!(patch.stripe_subscription_id, "sub_1");
                assert_eq!(patch.stripe_price_id, Some("price_1".to_string()));
                assert!(patch.current_period_end.is_some());
            }
            other => panic!("expected Apply, got {:?}", other),
        }
    }

    #[test]
    fn subscription_deleted_retains_reported_status() {
        let event = StripeEventBuilder::new()
            .event_type("customer.subscription.deleted")
            .object(subscription_object("canceled"))
            .build();

        match plan(&event).unwrap() {
            ReconcilePlan::Apply(patch) => {
                assert_eq!(patch.status, SubscriptionStatus::Canceled)
            }
            other => panic!("expected Apply, got {:?}", other),
        }
    }

    #[test]
    fn invoice_paid_requires_refetch() {
        let event = StripeEventBuilder::new()
            .event_type("invoice.paid")
            .object(json!({"id": "in_1", "customer": "cus_1", "subscription": "sub_1"}))
            .build();

        assert_eq!(
            plan(&event).unwrap(),
            ReconcilePlan::RefetchThenApply {
                subscription_id: "sub_1".to_string(),
                force_past_due: false,
            }
        );
    }

    #[test]
    fn invoice_payment_failed_forces_past_due() {
        let event = StripeEventBuilder::new()
            .event_type("invoice.payment_failed")
            .object(json!({"id": "in_1", "customer": "cus_1", "subscription": "sub_1"}))
            .build();

        assert_eq!(
            plan(&event).unwrap(),
            ReconcilePlan::RefetchThenApply {
                subscription_id: "sub_1".to_string(),
                force_past_due: true,
            }
        );
    }

    #[test]
    fn invoice_without_subscription_is_ignored() {
        let event = StripeEventBuilder::new()
            .event_type("invoice.paid")
            .object(json!({"id": "in_1", "customer": "cus_1"}))
            .build();

        assert!(matches!(plan(&event).unwrap(), ReconcilePlan::Ignore(_)));
    }

    #[test]
    fn unknown_event_types_are_ignored() {
        let event = StripeEventBuilder::new()
            .event_type("charge.refunded")
            .object(json!({"id": "ch_1"}))
            .build();

        assert!(matches!(plan(&event).unwrap(), ReconcilePlan::Ignore(_)));
    }

    #[test]
    fn unknown_status_fails_parse() {
        let event = StripeEventBuilder::new()
            .event_type("customer.subscription.updated")
            .object(subscription_object("resurrected"))
            .build();

        assert!(matches!(plan(&event), Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn patch_from_provider_can_force_past_due() {
        let patch = patch_from_provider(provider_subscription(SubscriptionStatus::Active), true);
        assert_eq!(patch.status, SubscriptionStatus::PastDue);

        let patch = patch_from_provider(provider_subscription(SubscriptionStatus::Active), false);
        assert_eq!(patch.status, SubscriptionStatus::Active);
    }

    // ══════════════════════════════════════════════════════════════
    // SubscriptionReconciler Tests
    // ══════════════════════════════════════════════════════════════

    fn reconciler(
        subscription: Option<ProviderSubscription>,
    ) -> (Arc<RecordingLedger>, SubscriptionReconciler) {
        let ledger = Arc::new(RecordingLedger::default());
        let provider = Arc::new(StubProvider { subscription });
        (
            ledger.clone(),
            SubscriptionReconciler::new(ledger, provider),
        )
    }

    #[tokio::test]
    async fn processes_subscription_update() {
        let (ledger, reconciler) = reconciler(None);
        let event = StripeEventBuilder::new()
            .id("evt_1")
            .event_type("customer.subscription.updated")
            .object(subscription_object("active"))
            .build();

        let outcome = reconciler.process(event).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Applied);
        let patch = ledger.applied_patch("evt_1").unwrap();
        assert_eq!(patch.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn replayed_event_id_is_skipped() {
        let (ledger, reconciler) = reconciler(None);
        let build = || {
            StripeEventBuilder::new()
                .id("evt_dup")
                .event_type("customer.subscription.updated")
                .object(subscription_object("active"))
                .build()
        };

        assert_eq!(
            reconciler.process(build()).await.unwrap(),
            ReconcileOutcome::Applied
        );
        assert_eq!(
            reconciler.process(build()).await.unwrap(),
            ReconcileOutcome::AlreadyProcessed
        );
        assert_eq!(ledger.processed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn payment_failed_refetches_and_forces_past_due() {
        let (ledger, reconciler) =
            reconciler(Some(provider_subscription(SubscriptionStatus::Active)));
        let event = StripeEventBuilder::new()
            .id("evt_fail")
            .event_type("invoice.payment_failed")
            .object(json!({"id": "in_1", "customer": "cus_1", "subscription": "sub_1"}))
            .build();

        reconciler.process(event).await.unwrap();

        let patch = ledger.applied_patch("evt_fail").unwrap();
        assert_eq!(patch.status, SubscriptionStatus::PastDue);
    }

    #[tokio::test]
    async fn invoice_paid_trusts_the_refetched_subscription() {
        let (ledger, reconciler) =
            reconciler(Some(provider_subscription(SubscriptionStatus::Trialing)));
        let event = StripeEventBuilder::new()
            .id("evt_paid")
            .event_type("invoice.paid")
            .object(json!({"id": "in_1", "customer": "cus_1", "subscription": "sub_1"}))
            .build();

        reconciler.process(event).await.unwrap();

        let patch = ledger.applied_patch("evt_paid").unwrap();
        assert_eq!(patch.status, SubscriptionStatus::Trialing);
    }

    #[tokio::test]
    async fn missing_upstream_subscription_is_retryable() {
        let (_ledger, reconciler) = reconciler(None);
        let event = StripeEventBuilder::new()
            .id("evt_gone")
            .event_type("invoice.paid")
            .object(json!({"id": "in_1", "customer": "cus_1", "subscription": "sub_gone"}))
            .build();

        let err = reconciler.process(event).await.unwrap_err();
        assert!(matches!(err, WebhookError::SubscriptionNotFound));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn unknown_events_are_recorded_and_acknowledged() {
        let (ledger, reconciler) = reconciler(None);
        let event = StripeEventBuilder::new()
            .id("evt_unknown")
            .event_type("payment_intent.succeeded")
            .object(json!({"id": "pi_1"}))
            .build();

        let outcome = reconciler.process(event).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Ignored);
        // Recorded in the ledger so a replay short-circuits
        assert!(ledger.processed.lock().unwrap().contains_key("evt_unknown"));
        assert!(ledger.applied_patch("evt_unknown").is_none());
    }
}
