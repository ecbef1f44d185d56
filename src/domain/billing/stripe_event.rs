//! Stripe event envelope and the payload shapes the reconciler reads.
//!
//! Serde skips everything else in Stripe's (much larger) payloads, so new
//! fields upstream never break parsing here.

use serde::{Deserialize, Serialize};

/// One event delivery, as posted to the webhook endpoint.
///
/// The raw `data.object` stays a [`serde_json::Value`] until the event
/// type is known; [`StripeEvent::deserialize_object`] then narrows it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Provider-issued unique id (`evt_...`), the dedup key.
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    /// Unix seconds at which Stripe created the event.
    pub created: i64,
    pub data: StripeEventData,
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// Narrows `data.object` to the payload type for this event.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }

    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::from_str(&self.event_type)
    }
}

/// The event types that drive subscription state, plus a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionDeleted,
    InvoicePaid,
    InvoicePaymentFailed,
    /// Anything else; acknowledged without state change.
    Unknown,
}

impl StripeEventType {
    const WIRE_NAMES: [(&'static str, StripeEventType); 5] = [
        ("customer.subscription.created", Self::SubscriptionCreated),
        ("customer.subscription.updated", Self::SubscriptionUpdated),
        ("customer.subscription.deleted", Self::SubscriptionDeleted),
        ("invoice.paid", Self::InvoicePaid),
        ("invoice.payment_failed", Self::InvoicePaymentFailed),
    ];

    pub fn from_str(raw: &str) -> Self {
        Self::WIRE_NAMES
            .iter()
            .find(|(name, _)| *name == raw)
            .map(|(_, parsed)| *parsed)
            .unwrap_or(Self::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        Self::WIRE_NAMES
            .iter()
            .find(|(_, variant)| variant == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }
}

/// Payload of `customer.subscription.*` events.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionObject {
    pub id: String,
    /// Billing customer (`cus_...`) resolving the owning account.
    pub customer: String,
    pub status: String,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub items: SubscriptionItems,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionItems {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItem {
    pub price: PriceRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceRef {
    pub id: String,
    pub product: String,
}

impl SubscriptionObject {
    // A subscription-mode checkout always yields exactly one line item,
    // so the first one is the subscription's price.

    pub fn price_id(&self) -> Option<String> {
        self.items.data.first().map(|item| item.price.id.clone())
    }

    pub fn product_id(&self) -> Option<String> {
        self.items.data.first().map(|item| item.price.product.clone())
    }
}

/// Payload of `invoice.*` events; only the subscription reference matters.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceObject {
    pub id: String,
    pub customer: Option<String>,
    /// Absent on one-off invoices.
    pub subscription: Option<String>,
}

/// Test fixture builder for event envelopes.
#[cfg(test)]
pub struct StripeEventBuilder {
    event: StripeEvent,
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self {
            event: StripeEvent {
                id: "evt_test_123".to_string(),
                event_type: "customer.subscription.updated".to_string(),
                created: chrono::Utc::now().timestamp(),
                data: StripeEventData {
                    object: serde_json::json!({}),
                },
                livemode: false,
            },
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.event.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.event.data.object = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        self.event
    }
}
