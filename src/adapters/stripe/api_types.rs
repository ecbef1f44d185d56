//! Deserialization targets for Stripe REST responses.
//!
//! Each struct captures just the fields the client reads off one
//! endpoint; serde drops the rest of Stripe's payloads.

use serde::Deserialize;

// /v1/customers

#[derive(Debug, Deserialize)]
pub(super) struct StripeCustomer {
    pub id: String,
}

// /v1/checkout/sessions

#[derive(Debug, Deserialize)]
pub(super) struct StripeCheckoutSession {
    pub id: String,
    /// Hosted-page URL; set on freshly created sessions, null once spent.
    pub url: Option<String>,
    /// open | complete | expired.
    pub status: Option<String>,
    /// paid | unpaid | no_payment_required.
    pub payment_status: Option<String>,
}

// /v1/billing_portal/sessions

#[derive(Debug, Deserialize)]
pub(super) struct StripePortalSession {
    pub url: String,
}

// /v1/subscriptions/{id}

#[derive(Debug, Deserialize)]
pub(super) struct StripeSubscription {
    pub id: String,
    pub customer: String,
    pub status: String,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub items: StripeSubscriptionItems,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct StripeSubscriptionItems {
    #[serde(default)]
    pub data: Vec<StripeSubscriptionItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StripeSubscriptionItem {
    pub price: StripePriceRef,
}

/// Price reference inside a subscription line item (not expanded).
#[derive(Debug, Deserialize)]
pub(super) struct StripePriceRef {
    pub id: String,
    pub product: String,
}

// /v1/prices?expand[]=data.product

/// Stripe's paginated list envelope.
#[derive(Debug, Deserialize)]
pub(super) struct StripeList<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StripePrice {
    pub id: String,
    pub active: bool,
    pub currency: String,
    /// Null for metered prices.
    pub unit_amount: Option<i64>,
    pub nickname: Option<String>,
    /// Null for one-time prices.
    pub recurring: Option<StripeRecurring>,
    /// Requires the `data.product` expansion; a bare product id here
    /// would fail to parse, which is intentional.
    pub product: StripeProduct,
}

#[derive(Debug, Deserialize)]
pub(super) struct StripeRecurring {
    /// day | week | month | year.
    pub interval: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct StripeProduct {
    pub id: String,
    pub name: String,
}
