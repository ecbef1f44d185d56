//! Request/response shapes for the billing endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::billing::SubscriptionPrice;
use crate::ports::CheckoutConfirmation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub price_id: String,
    /// Overrides for the hosted-page redirects; defaults derive from the
    /// configured app base URL.
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmCheckoutQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionDto {
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutConfirmationDto {
    pub session_id: String,
    pub status: String,
    pub payment_status: Option<String>,
}

impl From<CheckoutConfirmation> for CheckoutConfirmationDto {
    fn from(confirmation: CheckoutConfirmation) -> Self {
        Self {
            session_id: confirmation.id,
            status: confirmation.status,
            payment_status: confirmation.payment_status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalSessionDto {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDto {
    pub price_id: String,
    pub product_id: String,
    pub product_name: String,
    pub price_name: Option<String>,
    pub unit_amount: i64,
    pub currency: String,
    pub interval: String,
}

impl From<SubscriptionPrice> for PlanDto {
    fn from(price: SubscriptionPrice) -> Self {
        Self {
            price_id: price.price_id,
            product_id: price.product_id,
            product_name: price.product_name,
            price_name: price.price_name,
            unit_amount: price.unit_amount,
            currency: price.currency,
            interval: price.interval,
        }
    }
}
