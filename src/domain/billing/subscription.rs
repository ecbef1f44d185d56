//! Local subscription mirror and provider catalog types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::AccountId;

/// Subscription status, mirroring the provider's closed set verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Incomplete,
    IncompleteExpired,
    Trialing,
    Active,
    PastDue,
    Canceled,
    Unpaid,
    Paused,
}

impl SubscriptionStatus {
    /// Parse from the provider's wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "incomplete" => Some(Self::Incomplete),
            "incomplete_expired" => Some(Self::IncompleteExpired),
            "trialing" => Some(Self::Trialing),
            "active" => Some(Self::Active),
            "past_due" => Some(Self::PastDue),
            "canceled" => Some(Self::Canceled),
            "unpaid" => Some(Self::Unpaid),
            "paused" => Some(Self::Paused),
            _ => None,
        }
    }

    /// Storage/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete_expired",
            Self::Trialing => "trialing",
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Unpaid => "unpaid",
            Self::Paused => "paused",
        }
    }
}

/// Local mirror of a provider-side subscription object.
///
/// Rows are created and updated exclusively by the webhook reconciler;
/// deleted subscriptions are retained as history with status `canceled`.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub account_id: AccountId,
    pub stripe_subscription_id: String,
    pub stripe_product_id: Option<String>,
    pub stripe_price_id: Option<String>,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The upsert the reconciler applies, keyed by the external subscription id.
///
/// The owning account is resolved from `stripe_customer_id` at apply time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionPatch {
    pub stripe_subscription_id: String,
    pub stripe_customer_id: String,
    pub stripe_product_id: Option<String>,
    pub stripe_price_id: Option<String>,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
}

/// A priced offering mirrored from the provider's catalog.
///
/// Treated as a cache, not authoritative; refreshed from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPrice {
    pub price_id: String,
    pub product_id: String,
    pub product_name: String,
    pub price_name: Option<String>,
    pub unit_amount: i64,
    pub currency: String,
    pub interval: String,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip_covers_the_closed_set() {
        let all = [
            SubscriptionStatus::Incomplete,
            SubscriptionStatus::IncompleteExpired,
            SubscriptionStatus::Trialing,
            SubscriptionStatus::Active,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Canceled,
            SubscriptionStatus::Unpaid,
            SubscriptionStatus::Paused,
        ];
        for status in all {
            assert_eq!(SubscriptionStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn status_parse_rejects_values_outside_the_set() {
        assert_eq!(SubscriptionStatus::parse("ended"), None);
        assert_eq!(SubscriptionStatus::parse(""), None);
        assert_eq!(SubscriptionStatus::parse("ACTIVE"), None);
    }

    #[test]
    fn status_serde_uses_snake_case() {
        let json = serde_json::to_string(&SubscriptionStatus::PastDue).unwrap();
        assert_eq!(json, "\"past_due\"");
    }
}
