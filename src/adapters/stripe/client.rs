//! Stripe API client implementing the billing provider port.
//!
//! Uses form-encoded requests with basic auth, as the Stripe HTTP API
//! expects. The API key never leaves the `SecretString` except at the
//! moment the request is signed.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::billing::{SubscriptionPrice, SubscriptionStatus};
use crate::domain::foundation::AccountId;
use crate::ports::{
    BillingCustomer, BillingProvider, CheckoutConfirmation, CheckoutSession, PaymentError,
    PortalSession, ProviderSubscription,
};

use super::api_types::{
    StripeCheckoutSession, StripeCustomer, StripeList, StripePortalSession, StripePrice,
    StripeSubscription,
};

const STRIPE_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe client configuration.
#[derive(Clone)]
pub struct StripeClientConfig {
    api_key: SecretString,
    api_base_url: String,
}

impl StripeClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: STRIPE_API_BASE_URL.to_string(),
        }
    }

    /// Point at a different endpoint (tests, stripe-mock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Outbound Stripe API client.
pub struct StripeClient {
    config: StripeClientConfig,
    http_client: reqwest::Client,
}

impl StripeClient {
    pub fn new(config: StripeClientConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PaymentError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let detail = response.text().await.unwrap_or_default();
        tracing::error!(%status, %detail, "Stripe API call failed");
        Err(PaymentError::Provider(format!(
            "Stripe answered {}",
            status
        )))
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))
    }
}

fn subscription_from_wire(sub: StripeSubscription) -> Result<ProviderSubscription, PaymentError> {
    let status = SubscriptionStatus::parse(&sub.status).ok_or_else(|| {
        PaymentError::InvalidResponse(format!("unknown subscription status '{}'", sub.status))
    })?;
    let first_item = sub.items.data.first();

    Ok(ProviderSubscription {
        id: sub.id,
        customer_id: sub.customer,
        status,
        product_id: first_item.map(|i| i.price.product.clone()),
        price_id: first_item.map(|i| i.price.id.clone()),
        current_period_start: sub.current_period_start,
        current_period_end: sub.current_period_end,
        cancel_at_period_end: sub.cancel_at_period_end,
    })
}

/// Converts a catalog price; `None` for entries the plans page cannot
/// render (one-time prices, prices without an amount).
fn price_from_wire(price: StripePrice) -> Option<SubscriptionPrice> {
    let unit_amount = price.unit_amount?;
    let recurring = price.recurring?;

    Some(SubscriptionPrice {
        price_id: price.id,
        product_id: price.product.id,
        product_name: price.product.name,
        price_name: price.nickname,
        unit_amount,
        currency: price.currency,
        interval: recurring.interval,
        active: price.active,
    })
}

#[async_trait]
impl BillingProvider for StripeClient {
    async fn create_customer(
        &self,
        email: &str,
        name: Option<&str>,
        account_id: AccountId,
    ) -> Result<BillingCustomer, PaymentError> {
        let account_id = account_id.to_string();
        let mut params = vec![("email", email), ("metadata[account_id]", &account_id)];
        if let Some(name) = name {
            params.push(("name", name));
        }

        let response = self
            .http_client
            .post(self.url("/v1/customers"))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        let customer: StripeCustomer = Self::decode(Self::check_status(response).await?).await?;
        Ok(BillingCustomer { id: customer.id })
    }

    async fn create_checkout_session(
        &self,
        customer_id: &str,
        price_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let params = [
            ("mode", "subscription"),
            ("customer", customer_id),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
        ];

        let response = self
            .http_client
            .post(self.url("/v1/checkout/sessions"))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        let session: StripeCheckoutSession =
            Self::decode(Self::check_status(response).await?).await?;
        let url = session.url.ok_or_else(|| {
            PaymentError::InvalidResponse("checkout session has no hosted URL".into())
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn get_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<CheckoutConfirmation>, PaymentError> {
        let response = self
            .http_client
            .get(self.url(&format!("/v1/checkout/sessions/{}", session_id)))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let session: StripeCheckoutSession =
            Self::decode(Self::check_status(response).await?).await?;
        Ok(Some(CheckoutConfirmation {
            id: session.id,
            status: session.status.unwrap_or_else(|| "open".to_string()),
            payment_status: session.payment_status,
        }))
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentError> {
        let params = [("customer", customer_id), ("return_url", return_url)];

        let response = self
            .http_client
            .post(self.url("/v1/billing_portal/sessions"))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        let session: StripePortalSession =
            Self::decode(Self::check_status(response).await?).await?;
        Ok(PortalSession { url: session.url })
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProviderSubscription>, PaymentError> {
        let response = self
            .http_client
            .get(self.url(&format!("/v1/subscriptions/{}", subscription_id)))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let sub: StripeSubscription = Self::decode(Self::check_status(response).await?).await?;
        subscription_from_wire(sub).map(Some)
    }

    async fn list_prices(&self) -> Result<Vec<SubscriptionPrice>, PaymentError> {
        let response = self
            .http_client
            .get(self.url("/v1/prices"))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(&[
                ("active", "true"),
                ("type", "recurring"),
                ("limit", "100"),
                ("expand[]", "data.product"),
            ])
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        let list: StripeList<StripePrice> =
            Self::decode(Self::check_status(response).await?).await?;
        Ok(list.data.into_iter().filter_map(price_from_wire).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire_subscription(status: &str) -> StripeSubscription {
        serde_json::from_value(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": status,
            "cancel_at_period_end": true,
            "current_period_start": 1704067200,
            "current_period_end": 1706745600,
            "items": {"data": [{"price": {"id": "price_1", "product": "prod_1"}}]}
        }))
        .unwrap()
    }

    #[test]
    fn subscription_conversion_carries_line_item_refs() {
        let sub = subscription_from_wire(wire_subscription("active")).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.price_id.as_deref(), Some("price_1"));
        assert_eq!(sub.product_id.as_deref(), Some("prod_1"));
        assert!(sub.cancel_at_period_end);
    }

    #[test]
    fn subscription_conversion_rejects_unknown_status() {
        let err = subscription_from_wire(wire_subscription("resurrected")).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidResponse(_)));
    }

    #[test]
    fn subscription_without_items_has_no_price_refs() {
        let sub: StripeSubscription = serde_json::from_value(json!({
            "id": "sub_bare",
            "customer": "cus_1",
            "status": "canceled"
        }))
        .unwrap();
        let sub = subscription_from_wire(sub).unwrap();
        assert!(sub.price_id.is_none());
        assert!(sub.product_id.is_none());
    }

    #[test]
    fn price_conversion_maps_expanded_product() {
        let price: StripePrice = serde_json::from_value(json!({
            "id": "price_1",
            "active": true,
            "currency": "usd",
            "unit_amount": 1900,
            "nickname": "Pro monthly",
            "recurring": {"interval": "month"},
            "product": {"id": "prod_1", "name": "Pro"}
        }))
        .unwrap();

        let price = price_from_wire(price).unwrap();
        assert_eq!(price.price_id, "price_1");
        assert_eq!(price.product_name, "Pro");
        assert_eq!(price.unit_amount, 1900);
        assert_eq!(price.interval, "month");
    }

    #[test]
    fn price_conversion_skips_non_recurring_and_amountless() {
        let one_time: StripePrice = serde_json::from_value(json!({
            "id": "price_once",
            "active": true,
            "currency": "usd",
            "unit_amount": 500,
            "product": {"id": "prod_1", "name": "Pro"}
        }))
        .unwrap();
        assert!(price_from_wire(one_time).is_none());

        let metered: StripePrice = serde_json::from_value(json!({
            "id": "price_metered",
            "active": true,
            "currency": "usd",
            "unit_amount": null,
            "recurring": {"interval": "month"},
            "product": {"id": "prod_1", "name": "Pro"}
        }))
        .unwrap();
        assert!(price_from_wire(metered).is_none());
    }
}
